//! Observation matrices: map a sensor's attribute pack onto a state's.

use nalgebra::{SMatrix, SVector};

use super::attributes::{AttributePack, KinematicAttribute};
use super::state_vector::KinematicStateVector;

/// Builds `H ∈ R^{K×N}` with `H[i,j] = 1` iff `sensor[i] = state[j]`, `0`
/// otherwise. Valid whenever every sensor attribute is also directly
/// carried by the state pack (the common case — a GPS observing `POS_X`,
/// `POS_Y` against an ego state that also carries them).
pub fn direct_observation_matrix<const K: usize, const N: usize>(
    sensor: &AttributePack<K>,
    state: &AttributePack<N>,
) -> SMatrix<f64, K, N> {
    let mut h = SMatrix::<f64, K, N>::zeros();
    for (i, attribute) in sensor.attributes().iter().enumerate() {
        if let Some(j) = state.index_of(*attribute) {
            h[(i, j)] = 1.0;
        }
    }
    h
}

/// The nonlinear transform observing scalar speed `VEL = sqrt(VEL_X^2 +
/// VEL_Y^2)` out of a state that carries `VEL_X`/`VEL_Y` but not `VEL`
/// directly. Returns the predicted observation and its Jacobian row,
/// linearised at `state` — an `ObservationMatrix` only exists as a matrix
/// at this one linearisation point, per the richer sensor mappings
/// described for attribute packs that don't align component-for-component.
pub fn observe_speed<const N: usize>(
    state: &KinematicStateVector<N>,
    pack: &AttributePack<N>,
) -> Option<(SVector<f64, 1>, SMatrix<f64, 1, N>)> {
    let i = pack.index_of(KinematicAttribute::VelX)?;
    let j = pack.index_of(KinematicAttribute::VelY)?;

    let vx = state.as_vector()[i];
    let vy = state.as_vector()[j];
    let speed = (vx * vx + vy * vy).sqrt();

    let mut h = SMatrix::<f64, 1, N>::zeros();
    if speed > 1e-9 {
        h[(0, i)] = vx / speed;
        h[(0, j)] = vy / speed;
    }

    Some((SVector::<f64, 1>::new(speed), h))
}
