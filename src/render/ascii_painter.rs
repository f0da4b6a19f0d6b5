// src/render/ascii_painter.rs

use crate::error::Result;
use crate::map::{Cell, Grid};
use crate::render::TilePainter;
use crate::utils::Rect;

/// Text rendering: `#` wall, `.` empty, `+` tagged. The top row comes first.
#[derive(Debug, Default, Clone)]
pub struct AsciiPainter {
    output: String,
}

impl AsciiPainter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.output
    }

    pub fn into_string(self) -> String {
        self.output
    }

    fn glyph(cell: Cell) -> char {
        match cell {
            Cell::Wall => '#',
            Cell::Empty => '.',
            Cell::Tagged(_) => '+',
        }
    }
}

impl TilePainter for AsciiPainter {
    fn paint(&mut self, grid: &Grid, area: Rect) -> Result<()> {
        self.output.clear();
        for y in (area.y..area.y_max()).rev() {
            self.output
                .extend((area.x..area.x_max()).map(|x| Self::glyph(grid.cell_at(x, y))));
            self.output.push('\n');
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::DisplayTag;

    #[test]
    fn test_rows_print_top_down() {
        let rows = ["####", "#..#", "#.##"];
        let grid = Grid::from_rows(&rows).unwrap();
        let mut painter = AsciiPainter::new();
        painter.paint(&grid, grid.rect()).unwrap();
        assert_eq!(painter.as_str(), "####\n#..#\n#.##\n");
    }

    #[test]
    fn test_tagged_cells_and_sub_area() {
        let mut grid = Grid::from_rows(&["####", "#..#", "####"]).unwrap();
        grid.set_cell(2, 1, Cell::Tagged(DisplayTag::ROOM_STARTER)).unwrap();
        let mut painter = AsciiPainter::new();
        painter.paint(&grid, Rect::new(1, 1, 2, 1)).unwrap();
        assert_eq!(painter.into_string(), ".+\n");
    }
}
