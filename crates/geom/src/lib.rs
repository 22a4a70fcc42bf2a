//! Geometry and sensor-data value types shared across the workspace.

mod angle;
mod laser_scan;
mod point;
mod sensor_data;
mod transform;

pub use angle::{Angle, NormalisedAngle};
pub use laser_scan::LaserScan;
pub use point::{Point2, Point2d, Point2u, Rect2, Rect2d, Rect2u, Size2, Size2d, Size2u, Vector2};
pub use sensor_data::{EgoMotionSensorData, PoseSensorData};
pub use transform::{Pose2d, Rotation2d, Transform2d};
