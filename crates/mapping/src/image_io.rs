//! The `Image` collaborator: a thin `rows/cols/pixel` abstraction over the
//! `image` crate's buffers, plus the occupancy-grid PNG round-trip built
//! on its `GRAY` colour space.

use geom::{Point2d, Point2u, Size2u};
use gridops::Grid;
use image::{GrayImage, Luma};

use crate::occupancy::{MappingError, OccupancyCell};

/// Colour spaces an [`Image`] can hold. Only [`ColorSpace::Gray`] is
/// exercised by the occupancy-grid round-trip; the rest exist so the
/// trait surface matches what a caller outside this workspace expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Gray,
    Bgr,
    Rgb,
    Hsv,
    BitMask,
}

/// One pixel's channel values, tagged by the [`ColorSpace`] they were read
/// under. Channels beyond a space's arity are left at `0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pixel {
    pub space: ColorSpace,
    pub channels: [u8; 3],
}

impl Pixel {
    pub fn gray(value: u8) -> Self {
        Self { space: ColorSpace::Gray, channels: [value, 0, 0] }
    }
}

/// `rows()`/`cols()`/`pixel(row, col)` plus colour-space conversion and
/// (re)allocation, mirroring the collaborator this crate is handed at its
/// boundary. Implementors need only support the spaces they actually
/// store; converting into an unsupported space is free to panic, the same
/// way an out-of-bounds `pixel` read would.
pub trait Image {
    fn rows(&self) -> u32;
    fn cols(&self) -> u32;
    fn space(&self) -> ColorSpace;
    fn pixel(&self, row: u32, col: u32) -> Pixel;
    fn set_pixel(&mut self, row: u32, col: u32, pixel: Pixel);

    /// Convert to `space`, allocating a fresh buffer. Only identity
    /// conversion (`space == ColorSpace::Gray`) is implemented; the other
    /// colour-space arithmetic is outside this workspace's scope.
    fn transform_to(&self, space: ColorSpace) -> Gray8Image {
        assert_eq!(space, ColorSpace::Gray, "only GRAY is a supported conversion target");
        let mut out = Gray8Image::zeros(self.rows(), self.cols());
        for row in 0..self.rows() {
            for col in 0..self.cols() {
                out.set_pixel(row, col, self.pixel(row, col));
            }
        }
        out
    }
}

/// An 8-bit single-channel image, the only colour space this workspace's
/// occupancy-grid round-trip needs.
pub struct Gray8Image {
    buffer: GrayImage,
}

impl Gray8Image {
    pub fn zeros(rows: u32, cols: u32) -> Self {
        Self { buffer: GrayImage::new(cols, rows) }
    }

    pub fn resize(&mut self, rows: u32, cols: u32) {
        self.buffer = GrayImage::new(cols, rows);
    }

    fn from_buffer(buffer: GrayImage) -> Self {
        Self { buffer }
    }
}

impl Image for Gray8Image {
    fn rows(&self) -> u32 {
        self.buffer.height()
    }

    fn cols(&self) -> u32 {
        self.buffer.width()
    }

    fn space(&self) -> ColorSpace {
        ColorSpace::Gray
    }

    fn pixel(&self, row: u32, col: u32) -> Pixel {
        Pixel::gray(self.buffer.get_pixel(col, row).0[0])
    }

    fn set_pixel(&mut self, row: u32, col: u32, pixel: Pixel) {
        self.buffer.put_pixel(col, row, Luma([pixel.channels[0]]));
    }
}

/// `value` → pixel: `200` for unknown, `255` for near-free (`≤ 0.1`),
/// otherwise `(100 - round(value * 100)) * 2`, darker where more occupied.
fn value_to_pixel(value: f32) -> u8 {
    if value.is_nan() {
        return 200;
    }
    if value <= 0.1 {
        return 255;
    }
    let scaled = (100.0 - (value as f64 * 100.0).round()) * 2.0;
    scaled.clamp(0.0, 255.0) as u8
}

/// Inverse of [`value_to_pixel`]: `255` → `0.1`, `< 100` → `(100 - px) / 100`,
/// anything else → unknown (`NaN`). Lossy for intermediate pixel values.
fn pixel_to_value(pixel: u8) -> f32 {
    if pixel == 255 {
        0.1
    } else if pixel < 100 {
        (100 - pixel as i32) as f32 / 100.0
    } else {
        f32::NAN
    }
}

pub fn grid_to_image(grid: &Grid<OccupancyCell>) -> Gray8Image {
    let (cols, rows) = (grid.count().x(), grid.count().y());
    let mut image = Gray8Image::zeros(rows, cols);
    for y in 0..rows {
        for x in 0..cols {
            let cell = grid.get(Point2u::new(x, y));
            image.set_pixel(y, x, Pixel::gray(value_to_pixel(cell.value)));
        }
    }
    image
}

pub fn image_to_grid(image: &impl Image, cell_size: f64, origin: Point2d) -> Grid<OccupancyCell> {
    let (cols, rows) = (image.cols(), image.rows());
    let grid = Grid::new(Size2u::new(cols, rows), cell_size, origin, OccupancyCell::unknown());
    for y in 0..rows {
        for x in 0..cols {
            let pixel = image.pixel(y, x).channels[0];
            grid.set(Point2u::new(x, y), OccupancyCell { value: pixel_to_value(pixel) });
        }
    }
    grid
}

pub fn save_to_file(grid: &Grid<OccupancyCell>, path: &std::path::Path) -> Result<(), MappingError> {
    grid_to_image(grid).buffer.save(path)?;
    Ok(())
}

/// Loads `path` as [`ColorSpace::Gray`]; this workspace only ever
/// round-trips gray occupancy grids.
pub fn load_from_file(path: &std::path::Path, cell_size: f64, origin: Point2d) -> Result<Grid<OccupancyCell>, MappingError> {
    let buffer = image::open(path)?.to_luma8();
    Ok(image_to_grid(&Gray8Image::from_buffer(buffer), cell_size, origin))
}
