//! Laser range-finder measurements.

use crate::angle::{Angle, NormalisedAngle};
use crate::transform::Pose2d;

/// An immutable laser-scan measurement.
///
/// `distances[i]` is finite, `NaN`, or `+inf`; `NaN`/`+inf` both denote
/// "no return" for that beam. `distances.len()` matches
/// `round((phi_max - phi_min) / phi_step) + 1`, tolerant of rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct LaserScan {
    pub distances: Vec<f64>,
    pub pose: Pose2d,
    pub phi_min: Angle,
    pub phi_max: Angle,
    pub phi_step: Angle,
    pub range: f64,
    pub divergence: Angle,
    pub time_stamp: f64,
    pub sensor_name: String,
}

impl LaserScan {
    pub fn new(
        distances: Vec<f64>,
        pose: Pose2d,
        phi_min: Angle,
        phi_step: Angle,
        range: f64,
        divergence: Angle,
        time_stamp: f64,
        sensor_name: impl Into<String>,
    ) -> Self {
        let phi_max = Angle::from_radian(
            phi_min.radian() + phi_step.radian() * (distances.len().max(1) - 1) as f64,
        );
        Self {
            distances,
            pose,
            phi_min,
            phi_max,
            phi_step,
            range,
            divergence,
            time_stamp,
            sensor_name: sensor_name.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// The angle of beam `i` in the sensor's own frame.
    pub fn beam_angle(&self, i: usize) -> NormalisedAngle {
        NormalisedAngle::from_radian(self.phi_min.radian() + i as f64 * self.phi_step.radian())
    }

    /// Per-beam point diameter: `2 * sin(divergence / 2) * distance[i]`.
    pub fn point_diameter(&self, i: usize) -> f64 {
        2.0 * (self.divergence.radian() / 2.0).sin() * self.distances[i]
    }

    pub fn point_diameters(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.point_diameter(i)).collect()
    }
}
