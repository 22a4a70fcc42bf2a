//! Grid substrate, cell-visiting iterators, ray casting, ICP scan
//! matching, and RANSAC model fitting.

mod grid;
mod icp;
mod iter;
mod ransac;
mod ray_cast;
mod shared_array;

pub use grid::{Grid, GridError};
pub use icp::{estimate_transform, FlannPointPairEstimator, Icp, PointPair, PointPairEstimator};
pub use iter::{CircleIter, ElementAccess, EllipseIter, GlobalIndex, LineIter, LocalIndex, RectIter};
pub use ransac::{ransac, Line2Model, RansacModel, RansacResult};
pub use ray_cast::Ray2d;
pub use shared_array::SharedArray2d;
