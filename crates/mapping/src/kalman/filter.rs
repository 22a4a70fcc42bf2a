//! The generic Kalman filter core: predict/update over a kinematic state
//! vector of fixed attribute-pack size `N`.

use geom::NormalisedAngle;
use nalgebra::{SMatrix, SVector};

use super::state_vector::KinematicStateVector;

#[derive(thiserror::Error, Debug)]
pub enum FilterError {
    #[error("predict/update requested at time {requested} before current filter time {current}")]
    TemporalOrder { requested: f64, current: f64 },
    #[error("innovation covariance is singular and cannot be inverted")]
    Singular,
}

/// The process model a [`KalmanFilter`] predicts with. `predictionMatrix`
/// and `systemNoiseMatrix` are kept as two separate accessors rather than
/// folded into one "predict" call, so a model can be unit-tested against
/// either independently.
pub trait FilterModel<const N: usize> {
    fn prediction_matrix(&self, state: &KinematicStateVector<N>, dt: f64) -> SMatrix<f64, N, N>;
    fn system_noise_matrix(&self, dt: f64) -> SMatrix<f64, N, N>;
}

/// A Kalman filter over state dimension `N`, driven by model `M`.
pub struct KalmanFilter<M, const N: usize> {
    model: M,
    state: KinematicStateVector<N>,
    covariance: SMatrix<f64, N, N>,
    time: f64,
}

impl<M: FilterModel<N>, const N: usize> KalmanFilter<M, N> {
    pub fn initialize(model: M, x0: KinematicStateVector<N>, p0: SMatrix<f64, N, N>, t0: f64) -> Self {
        Self { model, state: x0, covariance: p0, time: t0 }
    }

    pub fn state(&self) -> &KinematicStateVector<N> {
        &self.state
    }

    pub fn covariance(&self) -> &SMatrix<f64, N, N> {
        &self.covariance
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Advance the filter to time `t`. A request at or after the current
    /// time predicts forward with `dt = t - time`; a request strictly
    /// before it is a `TemporalOrder` error.
    pub fn predict_to_time(&mut self, t: f64) -> Result<(), FilterError> {
        if t < self.time {
            return Err(FilterError::TemporalOrder { requested: t, current: self.time });
        }
        let dt = (t - self.time).max(0.0);
        let prediction = self.model.prediction_matrix(&self.state, dt);
        let noise = self.model.system_noise_matrix(dt);

        let predicted = prediction * self.state.as_vector();
        *self.state.as_vector_mut() = predicted;
        self.covariance = prediction * self.covariance * prediction.transpose() + noise;
        self.time = t;
        Ok(())
    }

    /// Predict to `t`, then fuse observation `z` (covariance `r`, observed
    /// through `h`) via the standard Kalman gain. `angle_rows` names the
    /// rows of `z`/`y` that hold angle attributes, whose innovation must
    /// be folded into `(-pi, pi]` before the gain is applied.
    pub fn update<const K: usize>(
        &mut self,
        t: f64,
        z: &SVector<f64, K>,
        r: &SMatrix<f64, K, K>,
        h: &SMatrix<f64, K, N>,
        angle_rows: &[usize],
    ) -> Result<(), FilterError> {
        self.predict_to_time(t)?;

        let x_hat = *self.state.as_vector();
        let p_hat = self.covariance;

        let mut innovation = z - h * x_hat;
        for &row in angle_rows {
            innovation[row] = NormalisedAngle::from_radian(innovation[row]).radian();
        }

        let innovation_covariance = h * p_hat * h.transpose() + r;
        let inverse = innovation_covariance.try_inverse().ok_or(FilterError::Singular)?;
        let gain = p_hat * h.transpose() * inverse;

        *self.state.as_vector_mut() = x_hat + gain * innovation;
        let identity = SMatrix::<f64, N, N>::identity();
        self.covariance = (identity - gain * h) * p_hat;
        Ok(())
    }

    pub fn process<const K: usize>(
        &mut self,
        t: f64,
        z: &SVector<f64, K>,
        r: &SMatrix<f64, K, K>,
        h: &SMatrix<f64, K, N>,
        angle_rows: &[usize],
    ) -> Result<(), FilterError> {
        self.update(t, z, r, h, angle_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kalman::attributes::{AttributePack, KinematicAttribute::*};

    /// A trivial constant-velocity model over `{PosX, Vel}`, used only to
    /// exercise the filter core in isolation from the concrete ego model.
    struct ConstantVelocity;

    impl FilterModel<2> for ConstantVelocity {
        fn prediction_matrix(&self, _state: &KinematicStateVector<2>, dt: f64) -> SMatrix<f64, 2, 2> {
            SMatrix::<f64, 2, 2>::new(1.0, dt, 0.0, 1.0)
        }

        fn system_noise_matrix(&self, dt: f64) -> SMatrix<f64, 2, 2> {
            SMatrix::<f64, 2, 2>::from_diagonal(&SVector::<f64, 2>::new(dt * 0.01, dt * 0.01))
        }
    }

    #[test]
    fn predict_to_past_time_is_an_error() {
        let pack = AttributePack::new([PosX, Vel]);
        let state = KinematicStateVector::zero(pack);
        let mut filter = KalmanFilter::initialize(ConstantVelocity, state, SMatrix::identity(), 1.0);
        assert!(matches!(filter.predict_to_time(0.0), Err(FilterError::TemporalOrder { .. })));
    }

    #[test]
    fn predict_advances_position_by_velocity_times_dt() {
        let pack = AttributePack::new([PosX, Vel]);
        let mut state = KinematicStateVector::zero(pack);
        state.set(Vel, 2.0);
        let mut filter = KalmanFilter::initialize(ConstantVelocity, state, SMatrix::identity(), 0.0);
        filter.predict_to_time(1.0).unwrap();
        assert!((filter.state().get(PosX) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn update_pulls_state_toward_observation() {
        let pack = AttributePack::new([PosX, Vel]);
        let state = KinematicStateVector::zero(pack);
        let mut filter = KalmanFilter::initialize(ConstantVelocity, state, SMatrix::identity(), 0.0);

        let h = SMatrix::<f64, 1, 2>::new(1.0, 0.0);
        let r = SMatrix::<f64, 1, 1>::new(0.01);
        let z = SVector::<f64, 1>::new(5.0);
        filter.update(0.0, &z, &r, &h, &[]).unwrap();

        assert!(filter.state().get(PosX) > 0.0);
        assert!(filter.state().get(PosX) <= 5.0);
    }
}
