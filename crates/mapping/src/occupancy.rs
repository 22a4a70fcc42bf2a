//! Occupancy grid: per-cell probability of occupation, updated from laser
//! scans by ray casting, and reconstructible back into synthetic scans.

use geom::{Angle, LaserScan, NormalisedAngle, Point2d, Point2u, Pose2d, Vector2};
use gridops::{Grid, Ray2d};

/// Likelihood applied to every cell a ray passes through before its end.
const FREE_UPDATE: f64 = 0.35;
/// Default clearance subtracted from the measured distance before the
/// free-space update, so the occupied end-cell itself isn't also marked free.
const DEFAULT_DELTA: f64 = 0.125;

#[derive(thiserror::Error, Debug)]
pub enum MappingError {
    #[error(transparent)]
    Grid(#[from] gridops::GridError),
    #[error("io failure: {0}")]
    Io(#[from] image::ImageError),
}

/// `value` is `NaN` for "unknown", otherwise in `[0, 1]`; `0` is free,
/// `1` is occupied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupancyCell {
    pub value: f32,
}

impl OccupancyCell {
    pub fn unknown() -> Self {
        Self { value: f32::NAN }
    }

    pub fn is_unknown(&self) -> bool {
        self.value.is_nan()
    }
}

impl Default for OccupancyCell {
    fn default() -> Self {
        Self::unknown()
    }
}

fn apply_update(cell: &mut OccupancyCell, m: f64) {
    if cell.is_unknown() {
        cell.value = m as f32;
        return;
    }
    let v = cell.value as f64;
    let fused = (m * v) / (m * v + (1.0 - m) * (1.0 - v));
    cell.value = fused as f32;
}

/// Occupied-update likelihood for an end-cell hit at `beam_angle`,
/// optionally overridden by a known surface `normal`. Faces the ray
/// squarely (`normal` opposing `beam_angle`) to `m = 0.95`, grazing hits
/// fall off toward the `0.5` indifference point.
fn occupied_likelihood(beam_angle: NormalisedAngle, normal: Option<NormalisedAngle>) -> f64 {
    let orientation = normal.unwrap_or(beam_angle);
    let facing = (orientation.radian() - beam_angle.radian() - std::f64::consts::PI).cos().abs();
    0.5 + 0.45 * facing
}

fn round_up_to_odd(value: f64) -> u32 {
    let mut n = value.ceil().max(1.0) as i64;
    if n % 2 == 0 {
        n += 1;
    }
    n as u32
}

/// Register one laser scan into `grid`: free-space update along each
/// beam's traversed cells, occupied update on the end-cell footprint.
pub fn push_laser_scan(
    grid: &Grid<OccupancyCell>,
    scan: &LaserScan,
    ego_pose: Pose2d,
    normals: Option<&[NormalisedAngle]>,
) {
    push_laser_scan_with_delta(grid, scan, ego_pose, normals, DEFAULT_DELTA)
}

pub fn push_laser_scan_with_delta(
    grid: &Grid<OccupancyCell>,
    scan: &LaserScan,
    ego_pose: Pose2d,
    normals: Option<&[NormalisedAngle]>,
    delta: f64,
) {
    let origin = Point2d::new(
        scan.pose.position().x() + ego_pose.position().x(),
        scan.pose.position().y() + ego_pose.position().y(),
    );

    for i in 0..scan.len() {
        let beam_angle = NormalisedAngle::from_radian(
            scan.phi_min.radian()
                + i as f64 * scan.phi_step.radian()
                + scan.pose.orientation().radian()
                + ego_pose.orientation().radian(),
        );
        let direction = Vector2::new(beam_angle.cos(), beam_angle.sin());
        let distance = scan.distances[i];

        let (travel, mark_end) = if distance.is_finite() {
            ((distance - delta).max(0.0), true)
        } else {
            (scan.range, false)
        };

        cast_free_space(grid, origin, direction, travel);

        if mark_end {
            let normal = normals.and_then(|n| n.get(i)).copied();
            mark_occupied_footprint(grid, origin, direction, distance, scan.point_diameter(i), beam_angle, normal);
        }
    }
}

fn cast_free_space(grid: &Grid<OccupancyCell>, origin: Point2d, direction: Vector2<f64>, distance: f64) {
    if distance <= 0.0 {
        return;
    }
    let Ok(start) = grid.world_to_index(origin) else { return };
    let ray = Ray2d::new(
        (start.x(), start.y()),
        (grid.count().x(), grid.count().y()),
        grid.cell_size(),
        grid.origin(),
        origin,
        direction,
        distance,
    );
    for (cx, cy) in ray {
        let idx = Point2u::new(cx, cy);
        let mut cell = grid.get(idx);
        apply_update(&mut cell, FREE_UPDATE);
        grid.set(idx, cell);
    }
}

fn mark_occupied_footprint(
    grid: &Grid<OccupancyCell>,
    origin: Point2d,
    direction: Vector2<f64>,
    distance: f64,
    diameter: f64,
    beam_angle: NormalisedAngle,
    normal: Option<NormalisedAngle>,
) {
    let endpoint = Point2d::new(origin.x() + direction.x * distance, origin.y() + direction.y * distance);
    let perpendicular = Vector2::new(-direction.y, direction.x);
    let count = round_up_to_odd(diameter / grid.cell_size());
    let half = (count / 2) as i64;
    let m = occupied_likelihood(beam_angle, normal);

    for k in -half..=half {
        let offset = k as f64 * grid.cell_size();
        let p = Point2d::new(endpoint.x() + perpendicular.x * offset, endpoint.y() + perpendicular.y * offset);
        if let Ok(idx) = grid.world_to_index(p) {
            let mut cell = grid.get(idx);
            apply_update(&mut cell, m);
            grid.set(idx, cell);
        }
    }
}

fn cast_first_occupied(grid: &Grid<OccupancyCell>, origin: Point2d, direction: Vector2<f64>, max_range: f64) -> Option<f64> {
    let start = grid.world_to_index(origin).ok()?;
    let ray = Ray2d::new(
        (start.x(), start.y()),
        (grid.count().x(), grid.count().y()),
        grid.cell_size(),
        grid.origin(),
        origin,
        direction,
        max_range,
    );

    let mut running_max: Option<(f64, f32)> = None;
    for (cx, cy) in ray {
        let idx = Point2u::new(cx, cy);
        let cell = grid.get(idx);
        let world = grid.index_to_world(idx);
        let dist = origin.distance_to(&world);

        if cell.value >= 0.8 {
            return Some(dist);
        }
        if cell.value > 0.75 {
            match running_max {
                Some((_, prev_v)) if cell.value <= prev_v => return Some(running_max.unwrap().0),
                _ => running_max = Some((dist, cell.value)),
            }
        } else if let Some((prev_d, _)) = running_max {
            return Some(prev_d);
        }
    }
    running_max.map(|(d, _)| d)
}

/// Cast `n` synthetic beams across the occupancy grid from `sensor_pose`
/// (in `ego_pose`'s frame), returning the scan that would have produced
/// the currently-mapped surfaces.
#[allow(clippy::too_many_arguments)]
pub fn reconstruct_laser_scan(
    grid: &Grid<OccupancyCell>,
    ego_pose: Pose2d,
    sensor_pose: Pose2d,
    phi_min: Angle,
    phi_step: Angle,
    n: usize,
    range: f64,
    divergence: Angle,
    time_stamp: f64,
) -> LaserScan {
    let origin = Point2d::new(
        sensor_pose.position().x() + ego_pose.position().x(),
        sensor_pose.position().y() + ego_pose.position().y(),
    );

    let beam_width_at_range = 2.0 * (divergence.radian() / 2.0).sin() * range;
    let sub_rays = if beam_width_at_range <= 0.0 {
        1
    } else {
        (((beam_width_at_range / grid.cell_size()).ceil() as i64) + 2).max(1) as usize
    };

    let mut distances = Vec::with_capacity(n);
    for i in 0..n {
        let beam_angle = phi_min.radian()
            + i as f64 * phi_step.radian()
            + sensor_pose.orientation().radian()
            + ego_pose.orientation().radian();

        let mut hits = Vec::with_capacity(sub_rays);
        for k in 0..sub_rays {
            let offset = if sub_rays == 1 {
                0.0
            } else {
                -divergence.radian() / 2.0 + divergence.radian() * k as f64 / (sub_rays - 1) as f64
            };
            let angle = beam_angle + offset;
            let direction = Vector2::new(angle.cos(), angle.sin());
            if let Some(dist) = cast_first_occupied(grid, origin, direction, range) {
                hits.push(dist);
            }
        }

        let distance = if hits.is_empty() { f64::INFINITY } else { hits.iter().sum::<f64>() / hits.len() as f64 };
        distances.push(distance);
    }

    LaserScan::new(distances, sensor_pose, phi_min, phi_step, range, divergence, time_stamp, "reconstructed")
}

/// Finite-distance beam endpoints of `scan`, in world coordinates (beam
/// angles are in the sensor's own frame, rotated here by `scan.pose`'s
/// orientation).
pub fn reconstruct_points(scan: &LaserScan) -> Vec<Point2d> {
    reconstruct_points_with_ego_pose(scan, Pose2d::default())
}

/// As [`reconstruct_points`], but with `ego_pose` additionally composed
/// onto `scan.pose` before projecting beams — the scan was taken by a
/// sensor mounted at `scan.pose` on a vehicle at `ego_pose`.
pub fn reconstruct_points_with_ego_pose(scan: &LaserScan, ego_pose: Pose2d) -> Vec<Point2d> {
    let origin = Point2d::new(
        scan.pose.position().x() + ego_pose.position().x(),
        scan.pose.position().y() + ego_pose.position().y(),
    );
    let heading = scan.pose.orientation() + ego_pose.orientation();

    (0..scan.len())
        .filter(|&i| scan.distances[i].is_finite())
        .map(|i| {
            let angle = (scan.beam_angle(i) + heading).radian();
            let d = scan.distances[i];
            Point2d::new(origin.x() + d * angle.cos(), origin.y() + d * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::Size2u;

    fn flat_wall_scan(distance: f64) -> LaserScan {
        LaserScan::new(
            vec![distance; 5],
            Pose2d::default(),
            Angle::from_degree(-10.0),
            Angle::from_degree(5.0),
            10.0,
            Angle::from_degree(1.0),
            0.0,
            "test-lidar",
        )
    }

    #[test]
    fn push_then_reconstruct_recovers_approximate_distance() {
        let grid: Grid<OccupancyCell> = Grid::new(Size2u::new(200, 200), 0.05, Point2d::new(-5.0, -5.0), OccupancyCell::unknown());
        let scan = flat_wall_scan(3.0);
        push_laser_scan(&grid, &scan, Pose2d::default(), None);

        let reconstructed = reconstruct_laser_scan(
            &grid,
            Pose2d::default(),
            Pose2d::default(),
            scan.phi_min,
            scan.phi_step,
            scan.len(),
            scan.range,
            scan.divergence,
            0.0,
        );

        for i in 0..scan.len() {
            assert!(reconstructed.distances[i].is_finite(), "beam {i} should have reconstructed a hit");
            assert!((reconstructed.distances[i] - 3.0).abs() <= 0.05, "beam {i} error too large: {}", reconstructed.distances[i]);
        }
    }

    #[test]
    fn reconstruct_points_only_keeps_finite_beams() {
        let mut scan = flat_wall_scan(2.0);
        scan.distances[2] = f64::INFINITY;
        let points = reconstruct_points(&scan);
        assert_eq!(points.len(), 4);
    }

    #[test]
    fn untouched_cell_stays_unknown() {
        let grid: Grid<OccupancyCell> = Grid::new(Size2u::new(10, 10), 1.0, Point2d::new(0.0, 0.0), OccupancyCell::unknown());
        assert!(grid.get(Point2u::new(5, 5)).is_unknown());
    }
}
