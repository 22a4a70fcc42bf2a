//! RANSAC: robust model fitting by repeated random sampling and consensus.
//!
//! Not named in the distributed module list, but present throughout the
//! original line-extraction code the rest of this crate's scan-matching
//! pieces were drawn from; kept here since `PointPairEstimator` consumers
//! commonly need a pre-filtering line fit before ICP.

use rand::seq::SliceRandom;
use rand::Rng;

/// A parametric model that can be fit from a minimal sample of points and
/// scored against arbitrary points of the same type.
pub trait RansacModel: Sized {
    type Point: Copy;

    /// Minimum number of points needed to fit a candidate model.
    const MIN_SAMPLES: usize;

    /// Fit a candidate model from exactly `MIN_SAMPLES` points. `None` if
    /// the sample is degenerate (e.g. coincident points).
    fn fit(samples: &[Self::Point]) -> Option<Self>;

    /// Residual of `point` against this model (e.g. perpendicular
    /// distance to a line).
    fn error(&self, point: &Self::Point) -> f64;
}

pub struct RansacResult<M: RansacModel> {
    pub model: M,
    pub inliers: Vec<usize>,
}

/// Run RANSAC over `points`: repeatedly sample `M::MIN_SAMPLES` points,
/// fit a candidate model, and count inliers (error below `threshold`).
/// Keeps the candidate with the most inliers across `iterations` trials.
/// Returns `None` if no trial produced a valid model.
pub fn ransac<M: RansacModel>(
    points: &[M::Point],
    iterations: usize,
    threshold: f64,
    rng: &mut impl Rng,
) -> Option<RansacResult<M>> {
    if points.len() < M::MIN_SAMPLES {
        return None;
    }

    let mut best: Option<RansacResult<M>> = None;
    let mut indices: Vec<usize> = (0..points.len()).collect();

    for _ in 0..iterations {
        indices.shuffle(rng);
        let sample: Vec<M::Point> = indices[..M::MIN_SAMPLES].iter().map(|&i| points[i]).collect();
        let Some(model) = M::fit(&sample) else { continue };

        let inliers: Vec<usize> = (0..points.len()).filter(|&i| model.error(&points[i]) < threshold).collect();

        if best.as_ref().map_or(true, |b| inliers.len() > b.inliers.len()) {
            best = Some(RansacResult { model, inliers });
        }
    }

    best
}

/// A 2-D line `a*x + b*y + c = 0` with `(a, b)` unit length, fit by total
/// least squares through two sample points.
pub struct Line2Model {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl RansacModel for Line2Model {
    type Point = geom::Point2d;
    const MIN_SAMPLES: usize = 2;

    fn fit(samples: &[Self::Point]) -> Option<Self> {
        let (p0, p1) = (samples[0], samples[1]);
        let dx = p1.x() - p0.x();
        let dy = p1.y() - p0.y();
        let len = (dx * dx + dy * dy).sqrt();
        if len < 1e-12 {
            return None;
        }
        // normal to the direction (dx, dy), normalised
        let (a, b) = (-dy / len, dx / len);
        let c = -(a * p0.x() + b * p0.y());
        Some(Self { a, b, c })
    }

    fn error(&self, point: &Self::Point) -> f64 {
        (self.a * point.x() + self.b * point.y() + self.c).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::Point2d;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn fits_a_line_through_noisy_points_with_outliers() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut points: Vec<Point2d> = (0..20).map(|i| Point2d::new(i as f64, 2.0 * i as f64 + 1.0)).collect();
        // outliers well off the line
        points.push(Point2d::new(5.0, 500.0));
        points.push(Point2d::new(-3.0, -200.0));

        let result = ransac::<Line2Model>(&points, 200, 0.5, &mut rng).unwrap();
        assert!(result.inliers.len() >= 20);

        // every on-line point should score near zero
        for i in 0..20 {
            assert!(result.model.error(&points[i]) < 0.5);
        }
    }

    #[test]
    fn too_few_points_returns_none() {
        let mut rng = StdRng::seed_from_u64(1);
        let points = vec![Point2d::new(0.0, 0.0)];
        assert!(ransac::<Line2Model>(&points, 10, 0.1, &mut rng).is_none());
    }
}
