//! Radian angles, plain and normalised.

use std::f64::consts::PI;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// An angle in radians. Arithmetic is plain `f64` arithmetic; no folding
/// is applied. Use [`NormalisedAngle`] when a canonical representative is
/// required.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Angle(f64);

impl Angle {
    pub const fn from_radian(value: f64) -> Self {
        Self(value)
    }

    pub fn from_degree(value: f64) -> Self {
        Self(value.to_radians())
    }

    pub const fn radian(self) -> f64 {
        self.0
    }

    pub fn degree(self) -> f64 {
        self.0.to_degrees()
    }

    pub fn sin(self) -> f64 {
        self.0.sin()
    }

    pub fn cos(self) -> f64 {
        self.0.cos()
    }

    /// Fold into `(-pi, pi]`.
    pub fn normalised(self) -> NormalisedAngle {
        NormalisedAngle::from_radian(self.0)
    }
}

impl From<f64> for Angle {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<Angle> for f64 {
    fn from(value: Angle) -> Self {
        value.0
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, rhs: Angle) -> Angle {
        Angle(self.0 + rhs.0)
    }
}

impl Sub for Angle {
    type Output = Angle;
    fn sub(self, rhs: Angle) -> Angle {
        Angle(self.0 - rhs.0)
    }
}

impl AddAssign for Angle {
    fn add_assign(&mut self, rhs: Angle) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Angle {
    fn sub_assign(&mut self, rhs: Angle) {
        self.0 -= rhs.0;
    }
}

impl Neg for Angle {
    type Output = Angle;
    fn neg(self) -> Angle {
        Angle(-self.0)
    }
}

/// An angle folded into the canonical range `(-pi, pi]`.
///
/// Every constructor and arithmetic operation re-folds the result, so a
/// `NormalisedAngle` is always in range by construction.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct NormalisedAngle(f64);

impl NormalisedAngle {
    pub fn from_radian(value: f64) -> Self {
        Self(fold(value))
    }

    pub fn from_degree(value: f64) -> Self {
        Self::from_radian(value.to_radians())
    }

    pub const fn radian(self) -> f64 {
        self.0
    }

    pub fn degree(self) -> f64 {
        self.0.to_degrees()
    }

    pub fn sin(self) -> f64 {
        self.0.sin()
    }

    pub fn cos(self) -> f64 {
        self.0.cos()
    }

    pub fn as_angle(self) -> Angle {
        Angle(self.0)
    }
}

/// Fold `value` into `(-pi, pi]`.
fn fold(value: f64) -> f64 {
    let mut v = (value + PI) % (2.0 * PI);
    if v <= 0.0 {
        v += 2.0 * PI;
    }
    v - PI
}

impl From<f64> for NormalisedAngle {
    fn from(value: f64) -> Self {
        Self::from_radian(value)
    }
}

impl From<NormalisedAngle> for f64 {
    fn from(value: NormalisedAngle) -> Self {
        value.0
    }
}

impl From<Angle> for NormalisedAngle {
    fn from(value: Angle) -> Self {
        Self::from_radian(value.radian())
    }
}

impl Add for NormalisedAngle {
    type Output = NormalisedAngle;
    fn add(self, rhs: NormalisedAngle) -> NormalisedAngle {
        NormalisedAngle::from_radian(self.0 + rhs.0)
    }
}

impl Sub for NormalisedAngle {
    type Output = NormalisedAngle;
    fn sub(self, rhs: NormalisedAngle) -> NormalisedAngle {
        NormalisedAngle::from_radian(self.0 - rhs.0)
    }
}

impl Add<Angle> for NormalisedAngle {
    type Output = NormalisedAngle;
    fn add(self, rhs: Angle) -> NormalisedAngle {
        NormalisedAngle::from_radian(self.0 + rhs.radian())
    }
}

impl Neg for NormalisedAngle {
    type Output = NormalisedAngle;
    fn neg(self) -> NormalisedAngle {
        NormalisedAngle::from_radian(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_keeps_in_range_values_unchanged() {
        assert!((NormalisedAngle::from_radian(0.0).radian() - 0.0).abs() < 1e-12);
        assert!((NormalisedAngle::from_radian(PI).radian() - PI).abs() < 1e-12);
    }

    #[test]
    fn fold_wraps_negative_pi_to_positive_pi() {
        // (-pi, pi] excludes -pi itself.
        let folded = NormalisedAngle::from_radian(-PI);
        assert!((folded.radian() - PI).abs() < 1e-9);
    }

    #[test]
    fn fold_handles_large_multiples_of_two_pi() {
        let folded = NormalisedAngle::from_radian(3.0 * PI);
        assert!((folded.radian() - PI).abs() < 1e-9);

        let folded = NormalisedAngle::from_radian(-3.0 * PI);
        assert!((folded.radian() - PI).abs() < 1e-9);
    }

    #[test]
    fn addition_re_folds() {
        let a = NormalisedAngle::from_radian(3.0);
        let b = NormalisedAngle::from_radian(3.0);
        let sum = a + b;
        assert!(sum.radian() <= PI);
        assert!(sum.radian() > -PI);
    }

    #[test]
    fn degree_round_trip_is_lossless() {
        let a = NormalisedAngle::from_degree(45.0);
        assert!((a.degree() - 45.0).abs() < 1e-9);
    }
}
