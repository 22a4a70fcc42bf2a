//! Occupancy and TSD grids, a Kalman filter core, and the concrete
//! pipelines that tie them to the dataflow engine.

pub mod image_io;
pub mod kalman;
mod normals;
pub mod occupancy;
pub mod pipelines;
pub mod tsd;

pub use normals::estimate_normals_from_ordered_points;
pub use occupancy::MappingError;
