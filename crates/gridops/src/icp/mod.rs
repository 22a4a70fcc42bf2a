//! ICP (iterative closest point) scan-matching core.

mod estimate_transform;
#[allow(clippy::module_inception)]
mod icp;
mod kdtree;
mod point_pair_estimator;

pub use estimate_transform::estimate_transform;
pub use icp::Icp;
pub use kdtree::FlannPointPairEstimator;
pub use point_pair_estimator::{PointPair, PointPairEstimator};
