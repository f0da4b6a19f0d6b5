// src/render/png_painter.rs

use std::path::Path;

use image::{Rgb, RgbImage};
use log::info;

use crate::error::Result;
use crate::map::{Cell, Grid};
use crate::render::TilePainter;
use crate::utils::Rect;

const WALL_COLOR: [u8; 3] = [44, 62, 80];
const EMPTY_COLOR: [u8; 3] = [236, 240, 241];

/// Paints each cell as a `cell_size` square; tagged cells use their tag colour.
#[derive(Debug, Clone)]
pub struct PngPainter {
    cell_size: u32,
    image: RgbImage,
}

impl PngPainter {
    pub fn new(cell_size: u32) -> Self {
        PngPainter {
            cell_size: cell_size.max(1),
            image: RgbImage::new(0, 0),
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.image.save(path)?;
        info!("wrote {}x{} image to {}", self.image.width(), self.image.height(), path.display());
        Ok(())
    }

    fn color(cell: Cell) -> Rgb<u8> {
        match cell {
            Cell::Wall => Rgb(WALL_COLOR),
            Cell::Empty => Rgb(EMPTY_COLOR),
            Cell::Tagged(tag) => Rgb(tag.to_rgb()),
        }
    }
}

impl TilePainter for PngPainter {
    fn paint(&mut self, grid: &Grid, area: Rect) -> Result<()> {
        let size = self.cell_size;
        let width = area.width.max(0) as u32;
        let height = area.height.max(0) as u32;
        self.image = RgbImage::new(width * size, height * size);
        for pos in area.positions() {
            let color = Self::color(grid.cell_at(pos.x, pos.y));
            let px = (pos.x - area.x) as u32 * size;
            // image rows run top-down, grid rows bottom-up
            let py = (area.y_max() - 1 - pos.y) as u32 * size;
            for dy in 0..size {
                for dx in 0..size {
                    self.image.put_pixel(px + dx, py + dy, color);
                }
            }
        }
        Ok(())
    }
}
