//! Rigid 2-D transforms and poses.

use crate::angle::NormalisedAngle;
use crate::point::{Point2d, Vector2};

/// A 2-D rotation, stored as an angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation2d {
    phi: NormalisedAngle,
}

impl Rotation2d {
    pub fn new(phi: NormalisedAngle) -> Self {
        Self { phi }
    }

    pub fn phi(&self) -> NormalisedAngle {
        self.phi
    }

    pub fn identity() -> Self {
        Self::new(NormalisedAngle::from_radian(0.0))
    }

    pub fn inverse(&self) -> Self {
        Self::new(-self.phi)
    }

    pub fn apply_to_vector(&self, v: Vector2<f64>) -> Vector2<f64> {
        let (s, c) = (self.phi.sin(), self.phi.cos());
        Vector2::new(c * v.x - s * v.y, s * v.x + c * v.y)
    }

    pub fn apply_to_point(&self, p: Point2d) -> Point2d {
        let v = self.apply_to_vector(p.as_vector());
        Point2d::new(v.x, v.y)
    }

    /// Compose `self` then `other`: equivalent to `self * other` in the
    /// matrix sense, i.e. applying the composed rotation is the same as
    /// applying `self` then `other`.
    pub fn compose(&self, other: &Rotation2d) -> Rotation2d {
        Rotation2d::new(self.phi + other.phi)
    }
}

/// A rigid 2-D transform: a rotation followed by a translation.
///
/// `transform * p = rotation * p + translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2d {
    rotation: Rotation2d,
    translation: Vector2<f64>,
}

impl Transform2d {
    pub fn new(rotation: Rotation2d, translation: Vector2<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Rotation2d::identity(), Vector2::new(0.0, 0.0))
    }

    pub fn rotation(&self) -> Rotation2d {
        self.rotation
    }

    pub fn translation(&self) -> Vector2<f64> {
        self.translation
    }

    pub fn inverse(&self) -> Transform2d {
        let inv_rot = self.rotation.inverse();
        let inv_translation = inv_rot.apply_to_vector(self.translation) * -1.0;
        Transform2d::new(inv_rot, inv_translation)
    }

    pub fn apply_to_point(&self, p: Point2d) -> Point2d {
        self.rotation.apply_to_point(p) + self.translation
    }

    pub fn apply_to_vector(&self, v: Vector2<f64>) -> Vector2<f64> {
        self.rotation.apply_to_vector(v)
    }

    /// Compose two transforms: `(self * other) * p == self * (other * p)`.
    pub fn compose(&self, other: &Transform2d) -> Transform2d {
        let rotation = self.rotation.compose(&other.rotation);
        let translation = self.translation + self.rotation.apply_to_vector(other.translation);
        Transform2d::new(rotation, translation)
    }

    pub fn apply_to_pose(&self, pose: Pose2d) -> Pose2d {
        Pose2d::new(
            self.apply_to_point(pose.position),
            pose.orientation + self.rotation.phi(),
        )
    }
}

impl std::ops::Mul for Transform2d {
    type Output = Transform2d;
    fn mul(self, rhs: Transform2d) -> Transform2d {
        self.compose(&rhs)
    }
}

impl std::ops::Mul<Point2d> for Transform2d {
    type Output = Point2d;
    fn mul(self, rhs: Point2d) -> Point2d {
        self.apply_to_point(rhs)
    }
}

/// Position plus orientation in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2d {
    pub position: Point2d,
    pub orientation: NormalisedAngle,
}

impl Pose2d {
    pub fn new(position: Point2d, orientation: NormalisedAngle) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn position(&self) -> Point2d {
        self.position
    }

    pub fn orientation(&self) -> NormalisedAngle {
        self.orientation
    }

    pub fn set_position(&mut self, position: Point2d) {
        self.position = position;
    }

    pub fn set_orientation(&mut self, orientation: NormalisedAngle) {
        self.orientation = orientation;
    }

    /// The transform that carries the identity frame to this pose.
    pub fn as_transform(&self) -> Transform2d {
        Transform2d::new(Rotation2d::new(self.orientation), self.position.as_vector())
    }
}

impl Default for Pose2d {
    fn default() -> Self {
        Self::new(Point2d::new(0.0, 0.0), NormalisedAngle::from_radian(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn assert_point_close(a: Point2d, b: Point2d, eps: f64) {
        assert!((a.x - b.x).abs() < eps, "{a:?} vs {b:?}");
        assert!((a.y - b.y).abs() < eps, "{a:?} vs {b:?}");
    }

    #[test]
    fn inverse_composes_to_identity() {
        let t = Transform2d::new(
            Rotation2d::new(NormalisedAngle::from_degree(37.0)),
            Vector2::new(1.5, -2.0),
        );
        let identity = t * t.inverse();
        assert_point_close(identity * Point2d::new(3.0, -4.0), Point2d::new(3.0, -4.0), 1e-9);
    }

    #[test]
    fn composition_is_associative_on_points() {
        let t1 = Transform2d::new(
            Rotation2d::new(NormalisedAngle::from_degree(20.0)),
            Vector2::new(1.0, 0.0),
        );
        let t2 = Transform2d::new(
            Rotation2d::new(NormalisedAngle::from_degree(-50.0)),
            Vector2::new(0.0, 2.0),
        );
        let p = Point2d::new(5.0, -1.0);

        let lhs = (t1 * t2) * p;
        let rhs = t1 * (t2 * p);
        assert_point_close(lhs, rhs, 1e-9);
    }

    #[test]
    fn rotation_then_translation_order() {
        let t = Transform2d::new(
            Rotation2d::new(NormalisedAngle::from_degree(90.0)),
            Vector2::new(1.0, 0.0),
        );
        // Rotating (1,0) by 90 degrees gives (0,1), then translate by (1,0).
        let result = t * Point2d::new(1.0, 0.0);
        assert_point_close(result, Point2d::new(1.0, 1.0), 1e-9);
    }

    #[test]
    fn pose_orientation_adds_under_transform() {
        let pose = Pose2d::new(Point2d::new(0.0, 0.0), NormalisedAngle::from_radian(0.0));
        let t = Transform2d::new(Rotation2d::new(NormalisedAngle::from_radian(PI / 2.0)), Vector2::new(0.0, 0.0));
        let moved = t.apply_to_pose(pose);
        assert!((moved.orientation.radian() - PI / 2.0).abs() < 1e-9);
    }
}
