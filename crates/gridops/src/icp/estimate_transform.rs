//! Rigid 2-D transform least-squares from a set of point correspondences.

use super::point_pair_estimator::PointPair;
use geom::{Point2d, Transform2d, Vector2};

/// Estimate the rigid transform mapping `b` onto `a`, using only the
/// pairs whose distance is below `max_distance`.
///
/// Returns `(rms, transform)`; `rms` is `-1.0` if fewer than one pair
/// passes the distance filter or the accumulated denominator is
/// degenerate (coincident centroids).
pub fn estimate_transform(
    a: &[Point2d],
    b: &[Point2d],
    pairs: &[PointPair],
    max_distance: f64,
) -> (f64, Transform2d) {
    let kept: Vec<&PointPair> = pairs.iter().filter(|p| p.distance < max_distance).collect();
    if kept.is_empty() {
        return (-1.0, Transform2d::identity());
    }

    let n = kept.len() as f64;
    let centroid_a = kept.iter().fold(Vector2::new(0.0, 0.0), |acc, p| acc + a[p.model_index].as_vector()) / n;
    let centroid_b = kept.iter().fold(Vector2::new(0.0, 0.0), |acc, p| acc + b[p.query_index].as_vector()) / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for pair in &kept {
        let da = a[pair.model_index].as_vector() - centroid_a;
        let db = b[pair.query_index].as_vector() - centroid_b;
        numerator += da.y * db.x - da.x * db.y;
        denominator += da.x * db.x + da.y * db.y;
    }

    if numerator == 0.0 && denominator == 0.0 {
        return (-1.0, Transform2d::identity());
    }

    let phi = -numerator.atan2(denominator);
    let rotation = geom::Rotation2d::new(geom::NormalisedAngle::from_radian(phi));
    let translation = rotation.apply_to_vector(centroid_a) - centroid_b;
    let transform = Transform2d::new(rotation, translation);

    let rms = kept.iter().map(|p| p.distance).sum::<f64>() / n;
    (rms, transform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icp::point_pair_estimator::PointPair;

    #[test]
    fn recovers_a_pure_translation() {
        let a = vec![Point2d::new(1.0, 1.0), Point2d::new(2.0, 1.0), Point2d::new(1.0, 2.0)];
        let b: Vec<Point2d> = a.iter().map(|p| Point2d::new(p.x() - 0.5, p.y() + 0.3)).collect();
        let pairs: Vec<PointPair> = (0..3)
            .map(|i| PointPair { model_index: i, query_index: i, distance: 0.0 })
            .collect();

        let (rms, transform) = estimate_transform(&a, &b, &pairs, 10.0);
        assert!(rms < 1e-9);
        let p = transform.apply_to_point(b[0]);
        assert!((p.x() - a[0].x()).abs() < 1e-9);
        assert!((p.y() - a[0].y()).abs() < 1e-9);
    }

    #[test]
    fn no_pairs_under_threshold_is_degenerate() {
        let a = vec![Point2d::new(0.0, 0.0)];
        let b = vec![Point2d::new(0.0, 0.0)];
        let pairs = vec![PointPair { model_index: 0, query_index: 0, distance: 5.0 }];
        let (rms, _) = estimate_transform(&a, &b, &pairs, 1.0);
        assert_eq!(rms, -1.0);
    }
}
