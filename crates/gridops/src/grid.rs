//! A metric 2-D grid: cells on an evenly spaced lattice, anchored in the
//! world by an origin pose and a cell size.

use crate::shared_array::SharedArray2d;
use geom::{Point2d, Point2u, Size2u};

#[derive(thiserror::Error, Debug)]
pub enum GridError {
    #[error("world point {x}, {y} lies outside the grid")]
    OutOfRange { x: f64, y: f64 },
    #[error("numerical failure: {0}")]
    NumericalFailure(String),
}

/// A grid of `Cell` values covering a rectangular patch of the plane.
///
/// `origin` is the world position of cell `(0, 0)`'s corner; `cell_size`
/// is the edge length of a (square) cell. Index `(x, y)` covers the
/// world square whose centre is `origin + ((x + 0.5) * cell_size, (y + 0.5) * cell_size)`.
#[derive(Clone)]
pub struct Grid<Cell> {
    data: SharedArray2d<Cell>,
    cell_size: f64,
    origin: Point2d,
}

impl<Cell: Copy> Grid<Cell> {
    pub fn new(count: Size2u, cell_size: f64, origin: Point2d, fill: Cell) -> Self {
        Self {
            data: SharedArray2d::filled(count, fill),
            cell_size,
            origin,
        }
    }

    pub fn count(&self) -> Size2u {
        self.data.size()
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn origin(&self) -> Point2d {
        self.origin
    }

    pub fn data(&self) -> &SharedArray2d<Cell> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut SharedArray2d<Cell> {
        &mut self.data
    }

    pub fn get(&self, idx: Point2u) -> Cell {
        self.data.get(idx.x(), idx.y())
    }

    pub fn set(&self, idx: Point2u, value: Cell) {
        self.data.set(idx.x(), idx.y(), value);
    }

    /// World position of the centre of cell `idx`.
    pub fn index_to_world(&self, idx: Point2u) -> Point2d {
        Point2d::new(
            self.origin.x() + (idx.x() as f64 + 0.5) * self.cell_size,
            self.origin.y() + (idx.y() as f64 + 0.5) * self.cell_size,
        )
    }

    /// The cell index containing world point `p`, or `OutOfRange` if `p`
    /// falls outside the grid's extent.
    pub fn world_to_index(&self, p: Point2d) -> Result<Point2u, GridError> {
        let fx = (p.x() - self.origin.x()) / self.cell_size;
        let fy = (p.y() - self.origin.y()) / self.cell_size;
        if fx < 0.0 || fy < 0.0 {
            return Err(GridError::OutOfRange { x: p.x(), y: p.y() });
        }
        let (ix, iy) = (fx.floor() as u32, fy.floor() as u32);
        if ix >= self.count().x() || iy >= self.count().y() {
            return Err(GridError::OutOfRange { x: p.x(), y: p.y() });
        }
        Ok(Point2u::new(ix, iy))
    }

    pub fn is_valid_index(&self, idx: Point2u) -> bool {
        idx.x() < self.count().x() && idx.y() < self.count().y()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_to_world_and_back_round_trips_at_cell_centres() {
        let grid: Grid<f32> = Grid::new(Size2u::new(10, 10), 0.5, Point2d::new(0.0, 0.0), 0.0);
        let idx = Point2u::new(3, 4);
        let world = grid.index_to_world(idx);
        let back = grid.world_to_index(world).unwrap();
        assert_eq!(back, idx);
    }

    #[test]
    fn world_to_index_out_of_range_is_an_error() {
        let grid: Grid<f32> = Grid::new(Size2u::new(4, 4), 1.0, Point2d::new(0.0, 0.0), 0.0);
        let result = grid.world_to_index(Point2d::new(100.0, 100.0));
        assert!(result.is_err());
    }

    #[test]
    fn get_set_round_trips() {
        let grid: Grid<f32> = Grid::new(Size2u::new(4, 4), 1.0, Point2d::new(0.0, 0.0), 0.0);
        grid.set(Point2u::new(2, 2), 9.5);
        assert_eq!(grid.get(Point2u::new(2, 2)), 9.5);
    }
}
