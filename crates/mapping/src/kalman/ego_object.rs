//! `EgoObject`: the vehicle's tracked kinematic state, exposed as a pose.

use geom::{NormalisedAngle, Point2d, Pose2d};

use super::ego_model::{EgoModel, EGO_ATTRIBUTES};
use super::filter::{FilterError, FilterModel, KalmanFilter};
use super::state_vector::KinematicStateVector;
use KinematicAttribute::*;

use super::attributes::KinematicAttribute;

/// Holds the ego Kalman filter's current state, covariance and timestamp;
/// projects the tracked attributes down to a [`Pose2d`].
pub struct EgoObject {
    filter: KalmanFilter<EgoModel, 12>,
}

impl EgoObject {
    pub fn initialize(x0: KinematicStateVector<12>, p0: nalgebra::SMatrix<f64, 12, 12>, t0: f64) -> Self {
        Self { filter: KalmanFilter::initialize(EgoModel, x0, p0, t0) }
    }

    pub fn at_origin(t0: f64) -> Self {
        Self::initialize(KinematicStateVector::zero(EGO_ATTRIBUTES), nalgebra::SMatrix::identity(), t0)
    }

    pub fn predict_to_time(&mut self, t: f64) -> Result<(), FilterError> {
        self.filter.predict_to_time(t)
    }

    pub fn update<const K: usize>(
        &mut self,
        t: f64,
        z: &nalgebra::SVector<f64, K>,
        r: &nalgebra::SMatrix<f64, K, K>,
        h: &nalgebra::SMatrix<f64, K, 12>,
        angle_rows: &[usize],
    ) -> Result<(), FilterError> {
        self.filter.update(t, z, r, h, angle_rows)
    }

    pub fn time(&self) -> f64 {
        self.filter.time()
    }

    pub fn state(&self) -> &KinematicStateVector<12> {
        self.filter.state()
    }

    pub fn covariance(&self) -> &nalgebra::SMatrix<f64, 12, 12> {
        self.filter.covariance()
    }

    pub fn pose(&self) -> Pose2d {
        let state = self.filter.state();
        Pose2d::new(
            Point2d::new(state.get(PosX), state.get(PosY)),
            NormalisedAngle::from_radian(state.get(Yaw)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_projects_position_and_yaw() {
        let mut state = KinematicStateVector::zero(EGO_ATTRIBUTES);
        state.set(PosX, 1.0);
        state.set(PosY, 2.0);
        state.set(Yaw, 0.5);
        let ego = EgoObject::initialize(state, nalgebra::SMatrix::identity(), 0.0);

        let pose = ego.pose();
        assert_eq!(pose.position(), Point2d::new(1.0, 2.0));
        assert!((pose.orientation().radian() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn predict_advances_time() {
        let mut ego = EgoObject::at_origin(0.0);
        ego.predict_to_time(2.0).unwrap();
        assert_eq!(ego.time(), 2.0);
    }
}
