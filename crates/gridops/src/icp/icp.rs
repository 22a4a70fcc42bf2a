//! Iterative closest point: alternates point-pair search and rigid
//! transform estimation until the fit converges or a budget is spent.

use super::estimate_transform::estimate_transform;
use super::point_pair_estimator::PointPairEstimator;
use crate::grid::GridError;
use geom::{Point2d, Transform2d};

pub struct Icp<E> {
    estimator: E,
    pub max_iterations: usize,
    pub max_rms: f64,
    pub termination_rms: f64,
}

impl<E: PointPairEstimator> Icp<E> {
    pub fn new(estimator: E, max_iterations: usize, max_rms: f64, termination_rms: f64) -> Self {
        Self { estimator, max_iterations, max_rms, termination_rms }
    }

    /// Estimate the transform mapping `target` onto `origin`: the model is
    /// `origin`, and `target`'s points are iteratively moved to match it.
    /// Returns the accumulated transform, or `NumericalFailure` if the
    /// RMS error never drops below `max_rms`.
    pub fn estimate_transform(&mut self, origin: &[Point2d], target: &[Point2d]) -> Result<Transform2d, GridError> {
        self.estimator.set_model(origin);

        let mut moved: Vec<Point2d> = target.to_vec();
        let mut accumulated = Transform2d::identity();
        let mut previous_rms = f64::INFINITY;

        for _ in 0..self.max_iterations {
            let pairs = self.estimator.find_pairs(&moved);
            if pairs.is_empty() {
                return Err(GridError::NumericalFailure("no point pairs found".into()));
            }

            let mut distances: Vec<f64> = pairs.iter().map(|p| p.distance).collect();
            distances.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let median = distances[distances.len() / 2];
            let inclusion_threshold = (median * 2.0).max(previous_rms * 10.0);

            let (rms, iter_transform) = estimate_transform(origin, &moved, &pairs, inclusion_threshold);
            if rms < 0.0 {
                return Err(GridError::NumericalFailure("degenerate transform estimate".into()));
            }

            accumulated = accumulated.compose(&iter_transform);
            let inverse_iter = iter_transform.inverse();
            for p in moved.iter_mut() {
                *p = inverse_iter.apply_to_point(*p);
            }

            previous_rms = rms;
            if rms <= self.termination_rms {
                return Ok(accumulated);
            }
            if rms >= self.max_rms {
                return Err(GridError::NumericalFailure(format!("rms {rms} exceeded max_rms {}", self.max_rms)));
            }
        }

        Ok(accumulated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icp::kdtree::FlannPointPairEstimator;
    use geom::{NormalisedAngle, Rotation2d, Vector2};

    #[test]
    fn recovers_known_rigid_transform() {
        let origin: Vec<Point2d> = (1..=7)
            .map(|i| Point2d::new(i as f64, i as f64))
            .chain((1..=7).map(|i| Point2d::new(i as f64 + 0.5, i as f64 + 0.5)))
            .collect();

        // `to_recover` is the transform ICP should produce: "target -> origin".
        // So `target` is built by applying its inverse to `origin`.
        let to_recover = Transform2d::new(Rotation2d::new(NormalisedAngle::from_degree(30.0)), Vector2::new(0.5, 0.3));
        let target: Vec<Point2d> = origin.iter().map(|p| to_recover.inverse().apply_to_point(*p)).collect();

        let mut icp = Icp::new(FlannPointPairEstimator::new(0.0), 100, 10.0, 0.05);
        let estimated = icp.estimate_transform(&origin, &target).unwrap();

        let rotation_error_deg = (estimated.rotation().phi().degree() - to_recover.rotation().phi().degree()).abs();
        assert!(rotation_error_deg < 0.1, "rotation error {rotation_error_deg} deg");

        let translation_error = (estimated.translation() - to_recover.translation()).norm();
        assert!(translation_error < 0.01, "translation error {translation_error}");
    }
}
