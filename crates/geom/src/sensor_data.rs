//! Non-laser sensor measurement types.

use crate::angle::Angle;
use crate::transform::Pose2d;
use nalgebra::{Matrix2, Matrix3};

/// A pose measurement with a 3x3 covariance over `(x, y, yaw)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSensorData {
    pub time_stamp: f64,
    pub pose: Pose2d,
    pub covariance: Matrix3<f64>,
}

impl PoseSensorData {
    pub fn new(time_stamp: f64, pose: Pose2d, covariance: Matrix3<f64>) -> Self {
        Self {
            time_stamp,
            pose,
            covariance,
        }
    }
}

/// An ego-motion measurement: forward velocity and yaw rate, with a 2x2
/// covariance over `(velocity, yaw_rate)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EgoMotionSensorData {
    pub time_stamp: f64,
    pub velocity: f64,
    pub yaw_rate: Angle,
    pub covariance: Matrix2<f64>,
}

impl EgoMotionSensorData {
    pub fn new(time_stamp: f64, velocity: f64, yaw_rate: Angle, covariance: Matrix2<f64>) -> Self {
        Self {
            time_stamp,
            velocity,
            yaw_rate,
            covariance,
        }
    }
}
