//! Local-line-fit normal estimation over an ordered point sequence (e.g.
//! consecutive laser-scan beam endpoints).

use geom::{NormalisedAngle, Point2d};

/// Least-squares line `y = m*x + t` through `points`, fit about their
/// average. Returns `None` when the window is vertical (`sumX == 0`) or
/// too small to fit.
fn fit_line_through_window(points: &[Point2d]) -> Option<(f64, f64)> {
    if points.len() < 2 {
        return None;
    }
    let avg_x = points.iter().map(|p| p.x()).sum::<f64>() / points.len() as f64;
    let avg_y = points.iter().map(|p| p.y()).sum::<f64>() / points.len() as f64;

    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    for p in points {
        sum_xy += (p.x() - avg_x) * (p.y() - avg_y);
        sum_xx += (p.x() - avg_x) * (p.x() - avg_x);
    }

    if sum_xx == 0.0 {
        return None;
    }
    let m = sum_xy / sum_xx;
    let t = avg_y - m * avg_x;
    Some((m, t))
}

/// For each point, fits a line through the `window` points centred on it
/// (clamped at the ends of `points`) and returns the outward surface
/// normal perpendicular to that line, facing back toward `points[i]`'s
/// predecessor-to-successor direction. `None` if any window is
/// degenerate (too short, or vertical).
pub fn estimate_normals_from_ordered_points(points: &[Point2d], window: usize) -> Option<Vec<NormalisedAngle>> {
    if points.len() < 2 {
        return None;
    }
    let half = window / 2;
    let mut normals = Vec::with_capacity(points.len());

    for i in 0..points.len() {
        let start = i.saturating_sub(half);
        let end = (i + half + 1).min(points.len());
        let (m, _t) = fit_line_through_window(&points[start..end])?;

        // A line of slope m has direction (1, m); the normal is
        // perpendicular to it, oriented away from the scan origin.
        let normal_angle = NormalisedAngle::from_radian((-1.0_f64 / m).atan());
        let to_point = points[i].as_vector();
        let candidate = geom::Vector2::new(normal_angle.cos(), normal_angle.sin());
        let oriented = if candidate.dot(&to_point) > 0.0 {
            normal_angle + NormalisedAngle::from_radian(std::f64::consts::PI)
        } else {
            normal_angle
        };
        normals.push(oriented);
    }

    Some(normals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_horizontal_wall_yields_vertical_normals() {
        let points: Vec<Point2d> = (0..7).map(|i| Point2d::new(i as f64 * 0.1, 2.0)).collect();
        let normals = estimate_normals_from_ordered_points(&points, 5).unwrap();
        for n in normals {
            assert!((n.cos()).abs() < 0.05, "normal should be near-vertical: {n:?}");
        }
    }

    #[test]
    fn too_few_points_returns_none() {
        assert!(estimate_normals_from_ordered_points(&[Point2d::new(0.0, 0.0)], 5).is_none());
    }
}
