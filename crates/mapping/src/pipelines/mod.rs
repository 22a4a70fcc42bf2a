//! Concrete pipeline wiring: the top-level pipelines assembled from the
//! stage building blocks elsewhere in this crate, each declaring its
//! boundary ports with a fixed, documented name.

mod convert_laser_scan_to_points;
mod localize_on_occupancy_grid;
mod simulate_laser_scan;
mod update_ego_object;
mod update_occupancy_grid;

pub use convert_laser_scan_to_points::ConvertLaserScanToPoints;
pub use localize_on_occupancy_grid::LocalizeOnOccupancyGrid;
pub use simulate_laser_scan::{Parameters as SimulateLaserScanParameters, SimulateLaserScan};
pub use update_ego_object::{SensorSample, UpdateEgoObject};
pub use update_occupancy_grid::UpdateOccupancyGrid;

/// Model placeholder for pipelines that carry no shared mutable state
/// across their stages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoData;
