//! A kinematic state vector: a dense numeric vector whose components are
//! addressed by attribute rather than by raw index.

use nalgebra::SVector;

use super::attributes::{AttributePack, KinematicAttribute};

/// A state vector over attribute pack `P` of size `N`. Backed by a
/// `nalgebra::SVector<f64, N>` so prediction/observation matrices can be
/// multiplied against it directly; attribute-named accessors are a thin
/// lookup over the pack's index table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicStateVector<const N: usize> {
    pack: AttributePack<N>,
    values: SVector<f64, N>,
}

impl<const N: usize> KinematicStateVector<N> {
    pub fn zero(pack: AttributePack<N>) -> Self {
        Self { pack, values: SVector::zeros() }
    }

    pub fn from_vector(pack: AttributePack<N>, values: SVector<f64, N>) -> Self {
        Self { pack, values }
    }

    pub fn pack(&self) -> &AttributePack<N> {
        &self.pack
    }

    pub fn as_vector(&self) -> &SVector<f64, N> {
        &self.values
    }

    pub fn as_vector_mut(&mut self) -> &mut SVector<f64, N> {
        &mut self.values
    }

    /// Value of `attribute`, or `NaN` if this pack doesn't carry it.
    pub fn get(&self, attribute: KinematicAttribute) -> f64 {
        match self.pack.index_of(attribute) {
            Some(i) => self.values[i],
            None => f64::NAN,
        }
    }

    pub fn set(&mut self, attribute: KinematicAttribute, value: f64) {
        if let Some(i) = self.pack.index_of(attribute) {
            self.values[i] = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use KinematicAttribute::*;

    #[test]
    fn named_accessor_round_trips_through_dense_vector() {
        let pack = AttributePack::new([PosX, PosY, Yaw]);
        let mut state = KinematicStateVector::zero(pack);
        state.set(Yaw, 1.5);
        assert_eq!(state.as_vector()[2], 1.5);
        assert_eq!(state.get(Yaw), 1.5);
    }

    #[test]
    fn missing_attribute_reads_as_nan() {
        let pack = AttributePack::new([PosX, PosY]);
        let state = KinematicStateVector::zero(pack);
        assert!(state.get(Yaw).is_nan());
    }
}
