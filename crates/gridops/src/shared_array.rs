//! Copy-on-write 2-D array storage with region-of-interest views.

use geom::{Point2u, Rect2u, Size2u};
use std::cell::RefCell;
use std::rc::Rc;

struct Backing<T> {
    data: Vec<T>,
    cols: u32,
}

/// A 2-D array of `T` that either owns its storage or shares it with
/// other `SharedArray2d` instances (e.g. as a region-of-interest view).
///
/// Cloning is a shallow alias (cheap `Rc` bump): a copy shares storage with
/// its original. [`SharedArray2d::resize`] detaches first if the storage is
/// currently shared, so other aliases keep seeing their original content.
/// Ordinary cell reads/writes go straight through the shared backing and
/// are *not* detached — concurrent writers through aliases are the
/// caller's problem; the type is meant for single-owner mutation.
pub struct SharedArray2d<T> {
    backing: Rc<RefCell<Backing<T>>>,
    origin: Point2u,
    size: Size2u,
}

impl<T> Clone for SharedArray2d<T> {
    fn clone(&self) -> Self {
        Self {
            backing: Rc::clone(&self.backing),
            origin: self.origin,
            size: self.size,
        }
    }
}

impl<T: Copy> SharedArray2d<T> {
    pub fn empty() -> Self {
        Self {
            backing: Rc::new(RefCell::new(Backing {
                data: Vec::new(),
                cols: 0,
            })),
            origin: Point2u::new(0, 0),
            size: Size2u::new(0, 0),
        }
    }

    pub fn filled(size: Size2u, fill: T) -> Self {
        let data = vec![fill; size.x() as usize * size.y() as usize];
        Self {
            backing: Rc::new(RefCell::new(Backing {
                data,
                cols: size.x(),
            })),
            origin: Point2u::new(0, 0),
            size,
        }
    }

    pub fn size(&self) -> Size2u {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size.x() == 0 || self.size.y() == 0
    }

    /// A region-of-interest view into `parent`. If `roi` does not fit
    /// entirely inside `parent`'s extent, logs an error and returns an
    /// empty array instead of panicking.
    pub fn roi(parent: &Self, roi: Rect2u) -> Self {
        if !roi.fits_inside(parent.size) {
            tracing::error!(
                roi = ?roi,
                parent_size = ?parent.size,
                "ROI rectangle does not fit inside parent array, returning empty array"
            );
            return Self::empty();
        }
        Self {
            backing: Rc::clone(&parent.backing),
            origin: Point2u::new(
                parent.origin.x() + roi.origin.x(),
                parent.origin.y() + roi.origin.y(),
            ),
            size: roi.size,
        }
    }

    /// A deep copy of this view's visible content into fresh, tightly
    /// packed storage (no longer sharing with `self`).
    pub fn create_copy(&self) -> Self {
        let mut data = Vec::with_capacity(self.size.x() as usize * self.size.y() as usize);
        for y in 0..self.size.y() {
            for x in 0..self.size.x() {
                data.push(self.get(x, y));
            }
        }
        Self {
            backing: Rc::new(RefCell::new(Backing {
                data,
                cols: self.size.x(),
            })),
            origin: Point2u::new(0, 0),
            size: self.size,
        }
    }

    fn stride(&self) -> u32 {
        self.backing.borrow().cols
    }

    fn flat_index(&self, x: u32, y: u32) -> usize {
        let stride = self.stride();
        ((self.origin.y() + y) * stride + (self.origin.x() + x)) as usize
    }

    pub fn get(&self, x: u32, y: u32) -> T {
        self.backing.borrow().data[self.flat_index(x, y)]
    }

    pub fn set(&self, x: u32, y: u32, value: T) {
        let idx = self.flat_index(x, y);
        self.backing.borrow_mut().data[idx] = value;
    }

    /// Resize this array's logical extent, replacing every cell with
    /// `fill`. If the backing storage is shared (any other
    /// `SharedArray2d` alias, including ROI views, is still alive), a
    /// fresh buffer is allocated first; the old buffer keeps serving the
    /// other aliases unchanged.
    pub fn resize(&mut self, size: Size2u, fill: T) {
        if Rc::strong_count(&self.backing) > 1 {
            *self = Self::filled(size, fill);
            return;
        }
        {
            let mut backing = self.backing.borrow_mut();
            backing.data = vec![fill; size.x() as usize * size.y() as usize];
            backing.cols = size.x();
        }
        self.origin = Point2u::new(0, 0);
        self.size = size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_on_shared_array_detaches_and_preserves_other_alias() {
        let mut a = SharedArray2d::filled(Size2u::new(2, 2), 1u32);
        let b = a.clone();

        a.resize(Size2u::new(3, 3), 9u32);

        assert_eq!(a.size(), Size2u::new(3, 3));
        assert_eq!(a.get(0, 0), 9);

        // `b` must still see the original 2x2 content, untouched.
        assert_eq!(b.size(), Size2u::new(2, 2));
        assert_eq!(b.get(0, 0), 1);
        assert_eq!(b.get(1, 1), 1);
    }

    #[test]
    fn roi_out_of_range_yields_empty_array() {
        let parent = SharedArray2d::filled(Size2u::new(4, 4), 0u32);
        let bad_roi = Rect2u::new(geom::Point2u::new(2, 2), Size2u::new(4, 4));
        let view = SharedArray2d::roi(&parent, bad_roi);
        assert!(view.is_empty());
    }

    #[test]
    fn roi_view_shares_storage_with_parent() {
        let parent = SharedArray2d::filled(Size2u::new(4, 4), 0u32);
        let roi = Rect2u::new(geom::Point2u::new(1, 1), Size2u::new(2, 2));
        let view = SharedArray2d::roi(&parent, roi);
        view.set(0, 0, 7);
        assert_eq!(parent.get(1, 1), 7);
    }

    #[test]
    fn create_copy_detaches_from_parent() {
        let parent = SharedArray2d::filled(Size2u::new(2, 2), 5u32);
        let copy = parent.create_copy();
        copy.set(0, 0, 1);
        assert_eq!(parent.get(0, 0), 5);
    }
}
