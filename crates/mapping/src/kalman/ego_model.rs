//! The concrete ego-vehicle process model: a constant-acceleration,
//! constant-turn-rate kinematic model over twelve attributes.

use nalgebra::SMatrix;

use super::attributes::{AttributePack, KinematicAttribute};
use super::filter::FilterModel;
use super::state_vector::KinematicStateVector;
use KinematicAttribute::*;

pub const EGO_ATTRIBUTES: AttributePack<12> =
    AttributePack::new([PosX, PosY, VelX, VelY, AccX, AccY, Roll, Pitch, Yaw, RollRate, PitchRate, YawRate]);

/// Per-attribute system-noise variance at `dt = 1`; `systemNoiseMatrix`
/// scales this profile linearly in `dt`.
const NOISE_PROFILE: [f64; 12] = [
    0.01, 0.01, // pos x/y
    0.05, 0.05, // vel x/y
    0.2, 0.2, // acc x/y
    0.01, 0.01, 0.02, // roll, pitch, yaw
    0.05, 0.05, 0.05, // roll/pitch/yaw rate
];

/// `P = {POS_X, POS_Y, VEL_X, VEL_Y, ACC_X, ACC_Y, ROLL, PITCH, YAW,
/// ROLL_RATE, PITCH_RATE, YAW_RATE}`, in this order.
///
/// Position is predicted by rotating the (world-frame) velocity and
/// acceleration by the vehicle's current yaw before integrating; every
/// other attribute is a direct constant-derivative carry. The rotation
/// is nonlinear in `yaw`, so `predictionMatrix` bakes `cos(yaw)`/`sin(yaw)`
/// at the passed-in `state` into its coefficients rather than leaving
/// them as state-dependent terms — a linearisation, not an approximation
/// of a separately-evaluated nonlinear step.
pub struct EgoModel;

impl FilterModel<12> for EgoModel {
    fn prediction_matrix(&self, state: &KinematicStateVector<12>, dt: f64) -> SMatrix<f64, 12, 12> {
        let yaw = state.get(Yaw);
        let (s, c) = (yaw.sin(), yaw.cos());
        let mut m = SMatrix::<f64, 12, 12>::identity();

        // pos_x
        m[(0, 2)] = dt * c;
        m[(0, 3)] = -dt * s;
        m[(0, 4)] = 0.5 * dt * dt * c;
        m[(0, 5)] = -0.5 * dt * dt * s;
        // pos_y
        m[(1, 2)] = dt * s;
        m[(1, 3)] = dt * c;
        m[(1, 4)] = 0.5 * dt * dt * s;
        m[(1, 5)] = 0.5 * dt * dt * c;
        // vel_x, vel_y integrate acceleration
        m[(2, 4)] = dt;
        m[(3, 5)] = dt;
        // roll, pitch, yaw integrate their rates
        m[(6, 9)] = dt;
        m[(7, 10)] = dt;
        m[(8, 11)] = dt;

        m
    }

    fn system_noise_matrix(&self, dt: f64) -> SMatrix<f64, 12, 12> {
        let scaled = NOISE_PROFILE.map(|v| v * dt.max(0.0));
        let diagonal = nalgebra::SVector::<f64, 12>::from_column_slice(&scaled);
        SMatrix::<f64, 12, 12>::from_diagonal(&diagonal)
    }
}
