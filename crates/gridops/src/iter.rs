//! Cell-visiting iterators over a [`SharedArray2d`]: lines, and shapes
//! (rectangle, circle, ellipse) centred on an arbitrary, possibly
//! out-of-range, point.
//!
//! Every iterator clips silently to the array's extent: cells outside
//! the array are skipped rather than panicking or erroring, and a shape
//! centred entirely outside the array yields nothing.

use crate::shared_array::SharedArray2d;
use geom::NormalisedAngle;

/// Index into the backing array, `(x, y)`.
pub type GlobalIndex = (u32, u32);
/// Index relative to the shape's own centre (or, for a line, its start).
pub type LocalIndex = (i64, i64);

macro_rules! vec_iter {
    ($name:ident) => {
        pub struct $name<T> {
            items: std::vec::IntoIter<(GlobalIndex, LocalIndex, T)>,
        }

        impl<T> Iterator for $name<T> {
            type Item = (GlobalIndex, LocalIndex, T);
            fn next(&mut self) -> Option<Self::Item> {
                self.items.next()
            }
        }
    };
}

vec_iter!(LineIter);
vec_iter!(RectIter);
vec_iter!(CircleIter);
vec_iter!(EllipseIter);

impl<T: Copy> SharedArray2d<T> {
    /// Walk `count` cells starting at `start`, stepping by `stride` each
    /// time (e.g. `(1, 0)` for a row, `(0, 1)` for a column, `(2, 0)` for
    /// every second element of a row). Stops early if a step would leave
    /// the array.
    pub fn line(&self, start: GlobalIndex, stride: (i64, i64), count: u32) -> LineIter<T> {
        let mut items = Vec::new();
        let (mut gx, mut gy) = (start.0 as i64, start.1 as i64);
        for step in 0..count as i64 {
            if gx < 0 || gy < 0 || gx as u32 >= self.size().x() || gy as u32 >= self.size().y() {
                break;
            }
            items.push(((gx as u32, gy as u32), (step, 0), self.get(gx as u32, gy as u32)));
            gx += stride.0;
            gy += stride.1;
        }
        LineIter { items: items.into_iter() }
    }

    pub fn row(&self, y: u32) -> LineIter<T> {
        self.line((0, y), (1, 0), self.size().x())
    }

    pub fn col(&self, x: u32) -> LineIter<T> {
        self.line((x, 0), (0, 1), self.size().y())
    }

    /// Start building a shape iterator centred on `(cx, cy)`, which may
    /// lie outside the array.
    pub fn at(&self, cx: i64, cy: i64) -> ElementAccess<'_, T> {
        ElementAccess { array: self, center: (cx, cy) }
    }
}

pub struct ElementAccess<'a, T> {
    array: &'a SharedArray2d<T>,
    center: (i64, i64),
}

impl<'a, T: Copy> ElementAccess<'a, T> {
    /// A rectangle of the given size, centred on this accessor's point.
    /// `size` is rounded down to find the centre-to-edge offset, matching
    /// the half-extent-from-centre convention used throughout gridops.
    pub fn rectangle(&self, size: geom::Size2u) -> RectIter<T> {
        let half = (size.x() as i64 / 2, size.y() as i64 / 2);
        let top_left = (self.center.0 - half.0, self.center.1 - half.1);
        let mut items = Vec::new();
        for ly in 0..size.y() as i64 {
            for lx in 0..size.x() as i64 {
                let gx = top_left.0 + lx;
                let gy = top_left.1 + ly;
                if self.in_range(gx, gy) {
                    items.push(((gx as u32, gy as u32), (lx, ly), self.array.get(gx as u32, gy as u32)));
                }
            }
        }
        RectIter { items: items.into_iter() }
    }

    /// All cells whose centre lies within `radius` of this accessor's
    /// point: `(lx - r)^2 + (ly - r)^2 <= r^2` over the bounding square of
    /// side `2r + 1`.
    pub fn circle(&self, radius: f64) -> CircleIter<T> {
        let r = radius.ceil() as i64;
        let side = (2 * r + 1).max(0) as u32;
        let mut items = Vec::new();
        for (g, l, v) in self.rectangle(geom::Size2u::new(side, side)) {
            let dx = l.0 as f64 - r as f64;
            let dy = l.1 as f64 - r as f64;
            if dx * dx + dy * dy <= radius * radius {
                items.push((g, (l.0 - r, l.1 - r), v));
            }
        }
        CircleIter { items: items.into_iter() }
    }

    /// All cells inside an ellipse with semi-axes `radii = (a, b)`,
    /// rotated by `phi`: `((c*dx - s*dy)/a)^2 + ((s*dx + c*dy)/b)^2 < 1`
    /// with `s = sin(-phi)`, `c = cos(-phi)`.
    pub fn ellipse(&self, radii: (f64, f64), phi: NormalisedAngle) -> EllipseIter<T> {
        let (a, b) = radii;
        let r = a.max(b).ceil() as i64;
        let side = (2 * r + 1).max(0) as u32;
        let s = (-phi.radian()).sin();
        let c = (-phi.radian()).cos();
        let mut items = Vec::new();
        for (g, l, v) in self.rectangle(geom::Size2u::new(side, side)) {
            let dx = l.0 as f64 - r as f64;
            let dy = l.1 as f64 - r as f64;
            let u = (c * dx - s * dy) / a;
            let w = (s * dx + c * dy) / b;
            if u * u + w * w < 1.0 {
                items.push((g, (l.0 - r, l.1 - r), v));
            }
        }
        EllipseIter { items: items.into_iter() }
    }

    fn in_range(&self, gx: i64, gy: i64) -> bool {
        gx >= 0 && gy >= 0 && (gx as u32) < self.array.size().x() && (gy as u32) < self.array.size().y()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::Size2u;

    fn indexed_array(w: u32, h: u32) -> SharedArray2d<u32> {
        let arr = SharedArray2d::filled(Size2u::new(w, h), 0u32);
        for y in 0..h {
            for x in 0..w {
                arr.set(x, y, y * w + x);
            }
        }
        arr
    }

    #[test]
    fn row_visits_every_column_in_order() {
        let arr = indexed_array(4, 3);
        let values: Vec<u32> = arr.row(1).map(|(_, _, v)| v).collect();
        assert_eq!(values, vec![4, 5, 6, 7]);
    }

    #[test]
    fn rectangle_fully_inside_visits_exactly_w_times_h_cells() {
        let arr = indexed_array(10, 10);
        let cells: Vec<_> = arr.at(5, 5).rectangle(Size2u::new(3, 3)).collect();
        assert_eq!(cells.len(), 9);
    }

    #[test]
    fn rectangle_clipped_at_edge_visits_only_in_bounds_cells() {
        let arr = indexed_array(10, 10);
        // Centred at (0, 0) with a 3x3 window: half the window falls
        // outside on both axes, leaving only the bottom-right quadrant.
        let cells: Vec<_> = arr.at(0, 0).rectangle(Size2u::new(3, 3)).collect();
        assert_eq!(cells.len(), 4);
        for (g, _, _) in &cells {
            assert!(g.0 < 10 && g.1 < 10);
        }
    }

    #[test]
    fn rectangle_centred_entirely_outside_yields_nothing() {
        let arr = indexed_array(10, 10);
        let cells: Vec<_> = arr.at(1000, 1000).rectangle(Size2u::new(9, 9)).collect();
        assert!(cells.is_empty());
    }

    #[test]
    fn circle_excludes_corners_of_bounding_square() {
        let arr = indexed_array(21, 21);
        let cells: Vec<_> = arr.at(10, 10).circle(5.0).collect();
        // Corner of the bounding square is farther than radius 5 from
        // the centre and must not be visited.
        assert!(!cells.iter().any(|(_, l, _)| l == &(-5, -5)));
        assert!(cells.iter().any(|(_, l, _)| l == &(0, 0)));
    }

    #[test]
    fn ellipse_axis_aligned_matches_circle_when_radii_equal() {
        let arr = indexed_array(21, 21);
        let circle: Vec<_> = arr.at(10, 10).circle(4.0).map(|(g, _, _)| g).collect();
        let ellipse: Vec<_> = arr
            .at(10, 10)
            .ellipse((4.0, 4.0), NormalisedAngle::from_radian(0.0))
            .map(|(g, _, _)| g)
            .collect();
        let mut circle_sorted = circle.clone();
        let mut ellipse_sorted = ellipse.clone();
        circle_sorted.sort();
        ellipse_sorted.sort();
        assert_eq!(circle_sorted, ellipse_sorted);
    }
}
