//! Truncated signed-distance grid: a TSDF map built by fusing per-beam
//! signed distances, and its conversion back into an occupancy grid.

use geom::Point2d;
use gridops::Grid;

use crate::occupancy::OccupancyCell;

/// Maximum number of fused observations before a cell's weight saturates.
const MAX_WEIGHT: f64 = 200.0;

/// `tsd` is `NaN` for "unobserved", otherwise in `[-1, 1]`: negative is
/// in front of a surface, positive is behind it, `0` is on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TsdCell {
    pub tsd: f64,
    pub weight: f64,
}

impl TsdCell {
    pub fn unobserved() -> Self {
        Self { tsd: f64::NAN, weight: 0.0 }
    }

    pub fn is_unobserved(&self) -> bool {
        self.tsd.is_nan()
    }
}

impl Default for TsdCell {
    fn default() -> Self {
        Self::unobserved()
    }
}

/// Fuse one signed-distance observation (`measurement` minus the distance
/// from `sensor` to `cell_world`) into `cell`, truncating to
/// `max_truncation` and averaging against the cell's running weight.
pub fn update_cell(cell: &mut TsdCell, cell_world: Point2d, sensor: Point2d, measurement: f64, max_truncation: f64) {
    let sdf = measurement - cell_world.distance_to(&sensor);
    let tsdf = (sdf / max_truncation).clamp(-1.0, 1.0);

    cell.weight = (cell.weight + 1.0).min(MAX_WEIGHT);
    cell.tsd = if cell.is_unobserved() {
        tsdf
    } else {
        (cell.tsd * (cell.weight - 1.0) + tsdf) / cell.weight
    };
}

/// Fuse a single laser beam into every cell the beam's line of sight
/// touches within `max_truncation` of its reported distance, stopping at
/// the grid boundary.
pub fn push_beam(grid: &Grid<TsdCell>, sensor: Point2d, direction: geom::Vector2<f64>, distance: f64, max_truncation: f64) {
    if !distance.is_finite() {
        return;
    }
    let Ok(start) = grid.world_to_index(sensor) else { return };
    let travel = distance + max_truncation;
    let ray = gridops::Ray2d::new(
        (start.x(), start.y()),
        (grid.count().x(), grid.count().y()),
        grid.cell_size(),
        grid.origin(),
        sensor,
        direction,
        travel,
    );
    for (cx, cy) in ray {
        let idx = geom::Point2u::new(cx, cy);
        let world = grid.index_to_world(idx);
        if (world.distance_to(&sensor) - distance).abs() > max_truncation {
            continue;
        }
        let mut cell = grid.get(idx);
        update_cell(&mut cell, world, sensor, distance, max_truncation);
        grid.set(idx, cell);
    }
}

/// Converts a TSD cell to an occupancy value on the grid's own `100`/`0`
/// convention: `100` when the cell is behind a surface (`tsd > 0`),
/// otherwise `0`. This is a deliberately coarse two-level readout, distinct
/// from [`OccupancyCell`]'s own `[0, 1]` probability scale.
pub fn convert_to_occupancy_value(cell: TsdCell) -> u8 {
    if cell.is_unobserved() {
        return 0;
    }
    if cell.tsd > 0.0 {
        100
    } else {
        0
    }
}

pub fn convert_tsd_to_occupancy(tsd: &Grid<TsdCell>) -> Grid<OccupancyCell> {
    let mut occupancy = Grid::new(tsd.count(), tsd.cell_size(), tsd.origin(), OccupancyCell::unknown());
    for y in 0..tsd.count().y() {
        for x in 0..tsd.count().x() {
            let idx = geom::Point2u::new(x, y);
            let value = convert_to_occupancy_value(tsd.get(idx));
            occupancy.set(idx, OccupancyCell { value: value as f32 / 100.0 });
        }
    }
    occupancy
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::Size2u;

    #[test]
    fn update_cell_clamps_outside_truncation_band() {
        let mut cell = TsdCell::unobserved();
        update_cell(&mut cell, Point2d::new(0.0, 0.0), Point2d::new(-10.0, 0.0), 1.0, 0.5);
        assert_eq!(cell.tsd, -1.0);
    }

    #[test]
    fn update_cell_averages_across_observations() {
        let mut cell = TsdCell::unobserved();
        update_cell(&mut cell, Point2d::new(0.0, 0.0), Point2d::new(-0.5, 0.0), 1.0, 1.0);
        let first = cell.tsd;
        update_cell(&mut cell, Point2d::new(0.0, 0.0), Point2d::new(-0.5, 0.0), 1.0, 1.0);
        assert!((cell.tsd - first).abs() < 1e-9);
        assert_eq!(cell.weight, 2.0);
    }

    #[test]
    fn convert_tsd_to_occupancy_is_a_coarse_two_level_readout() {
        let grid: Grid<TsdCell> = Grid::new(Size2u::new(2, 1), 1.0, Point2d::new(0.0, 0.0), TsdCell::unobserved());
        grid.set(geom::Point2u::new(0, 0), TsdCell { tsd: 0.4, weight: 1.0 });
        grid.set(geom::Point2u::new(1, 0), TsdCell { tsd: -0.4, weight: 1.0 });

        let occupancy = convert_tsd_to_occupancy(&grid);
        assert_eq!(occupancy.get(geom::Point2u::new(0, 0)).value, 1.0);
        assert_eq!(occupancy.get(geom::Point2u::new(1, 0)).value, 0.0);
    }
}
