//! Plain value types: points, vectors, sizes and axis-aligned rectangles.

use nalgebra::Vector2 as NaVector2;
use serde::{Deserialize, Serialize};

/// A 2-D vector over scalar `T`. Thin wrapper over `nalgebra::Vector2` so
/// that grid/transform code can lean on nalgebra's linear algebra while
/// still exposing the plain `x()`/`y()` accessors the rest of the
/// workspace expects.
pub type Vector2<T> = NaVector2<T>;

/// A 2-D point over scalar `T`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2<T> {
    pub x: T,
    pub y: T,
}

pub type Point2d = Point2<f64>;
pub type Point2u = Point2<u32>;

impl<T: Copy> Point2<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> T {
        self.x
    }

    pub fn y(&self) -> T {
        self.y
    }
}

impl Point2d {
    pub fn as_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn distance_to(&self, other: &Point2d) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl<T: std::ops::Add<Output = T> + Copy> std::ops::Add<Vector2<T>> for Point2<T> {
    type Output = Point2<T>;
    fn add(self, rhs: Vector2<T>) -> Point2<T> {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T: std::ops::Sub<Output = T> + Copy> std::ops::Sub for Point2<T> {
    type Output = Vector2<T>;
    fn sub(self, rhs: Point2<T>) -> Vector2<T> {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A 2-D extent (width/height) over scalar `T`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size2<T> {
    pub x: T,
    pub y: T,
}

pub type Size2u = Size2<u32>;
pub type Size2d = Size2<f64>;

impl<T: Copy> Size2<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> T {
        self.x
    }

    pub fn y(&self) -> T {
        self.y
    }
}

/// An axis-aligned rectangle: an origin plus a size, both over scalar `T`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect2<T> {
    pub origin: Point2<T>,
    pub size: Size2<T>,
}

pub type Rect2u = Rect2<u32>;
pub type Rect2d = Rect2<f64>;

impl<T: Copy> Rect2<T> {
    pub const fn new(origin: Point2<T>, size: Size2<T>) -> Self {
        Self { origin, size }
    }
}

impl Rect2u {
    pub fn x_max(&self) -> u32 {
        self.origin.x + self.size.x
    }

    pub fn y_max(&self) -> u32 {
        self.origin.y + self.size.y
    }

    /// True iff `self` lies entirely inside a parent array of the given
    /// size (origin + size <= parent size, per dimension).
    pub fn fits_inside(&self, parent: Size2u) -> bool {
        self.x_max() <= parent.x && self.y_max() <= parent.y
    }
}
