// src/render/mod.rs
mod ascii_painter;
mod png_painter;

pub use self::ascii_painter::AsciiPainter;
pub use self::png_painter::PngPainter;

use crate::error::Result;
use crate::map::Grid;
use crate::utils::Rect;

/// Turns a finished grid into tiles of some kind. Painters only read the grid.
pub trait TilePainter {
    fn paint(&mut self, grid: &Grid, area: Rect) -> Result<()>;
}
