// src/map/grid.rs

use rand::Rng;

use crate::error::{LevelGenError, Result};
use crate::map::{Cell, CellKind};
use crate::utils::{Pos, Rect};

/// A fixed-size 2D cell array. Reads outside the grid see `Wall`; checked
/// writes outside the grid fail with [`LevelGenError::OutOfBounds`].
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>, // column-major: index = x * height + y
}

impl Grid {
    /// Create a grid with every cell `Empty`.
    /// Fails when either side is not positive or the cell count does not fit an `i32`.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        let count = match width.checked_mul(height) {
            Some(count) if width > 0 && height > 0 => count as usize,
            _ => return Err(LevelGenError::InvalidDimensions { width, height }),
        };
        Ok(Grid {
            width,
            height,
            cells: vec![Cell::Empty; count],
        })
    }

    /// Parse rows of `#` (wall) and anything else (empty). The first row is
    /// the top of the grid.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |r| r.as_ref().chars().count()) as i32;
        let mut grid = Grid::new(width, height)?;
        for (row_index, row) in rows.iter().enumerate() {
            let y = height - 1 - row_index as i32;
            for (x, ch) in row.as_ref().chars().enumerate() {
                grid.set_cell(x as i32, y, Cell::wall_or_empty(ch == '#'))?;
            }
        }
        Ok(grid)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    fn index(&self, x: i32, y: i32) -> usize {
        (x * self.height + y) as usize
    }

    fn check_coords(&self, x: i32, y: i32) -> Result<()> {
        if self.in_bounds(x, y) {
            Ok(())
        } else {
            Err(LevelGenError::OutOfBounds { x, y })
        }
    }

    fn check_rect(&self, area: &Rect) -> Result<()> {
        if self.rect().contains_rect(area) {
            Ok(())
        } else if area.x < 0 || area.y < 0 {
            Err(LevelGenError::OutOfBounds { x: area.x, y: area.y })
        } else {
            Err(LevelGenError::OutOfBounds {
                x: area.x_max() - 1,
                y: area.y_max() - 1,
            })
        }
    }

    /// Out-of-range coordinates count as wall.
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.cell_at(x, y).is_wall()
    }

    /// Read-only view for renderers. Out-of-range coordinates read as `Wall`.
    pub fn cell_at(&self, x: i32, y: i32) -> Cell {
        if self.in_bounds(x, y) {
            self.cells[self.index(x, y)]
        } else {
            Cell::Wall
        }
    }

    pub fn kind_at(&self, x: i32, y: i32) -> CellKind {
        self.cell_at(x, y).kind()
    }

    pub fn set_cell(&mut self, x: i32, y: i32, cell: Cell) -> Result<()> {
        self.check_coords(x, y)?;
        self.set_cell_internal(x, y, cell);
        Ok(())
    }

    /// Like [`Grid::set_cell`], but writes outside the grid are ignored.
    pub fn set_cell_safe(&mut self, pos: Pos, cell: Cell) {
        if self.in_bounds(pos.x, pos.y) {
            self.set_cell_internal(pos.x, pos.y, cell);
        }
    }

    // A tag never replaces an existing tag: earlier paint passes win.
    fn set_cell_internal(&mut self, x: i32, y: i32, cell: Cell) {
        let index = self.index(x, y);
        if matches!(self.cells[index], Cell::Tagged(_)) && matches!(cell, Cell::Tagged(_)) {
            return;
        }
        self.cells[index] = cell;
    }

    pub fn fill(&mut self, area: Rect, cell: Cell) -> Result<()> {
        self.check_rect(&area)?;
        for pos in area.positions() {
            self.set_cell_internal(pos.x, pos.y, cell);
        }
        Ok(())
    }

    /// Each cell independently becomes `Wall` with the given probability.
    pub fn fill_random<R: Rng>(&mut self, area: Rect, probability: f64, rng: &mut R) -> Result<()> {
        self.check_rect(&area)?;
        let probability = probability.clamp(0.0, 1.0);
        for pos in area.positions() {
            let wall = rng.random::<f64>() < probability;
            self.set_cell_internal(pos.x, pos.y, Cell::wall_or_empty(wall));
        }
        Ok(())
    }

    /// Number of walls in the 3x3 neighbourhood around `(x, y)`, the centre included.
    pub fn neighbor_wall_count(&self, x: i32, y: i32) -> u32 {
        let mut count = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if self.is_wall(x + dx, y + dy) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Overwrite the region at `(target_x, target_y)` with the wall/empty layout
    /// of `source`. Source tags are discarded.
    pub fn copy_region_from(&mut self, target_x: i32, target_y: i32, source: &Grid) -> Result<()> {
        let target = Rect::new(target_x, target_y, source.width, source.height);
        self.check_rect(&target)?;
        for pos in source.rect().positions() {
            let cell = Cell::wall_or_empty(source.is_wall(pos.x, pos.y));
            self.set_cell_internal(target_x + pos.x, target_y + pos.y, cell);
        }
        Ok(())
    }

    /// Force the outermost rows and columns to `Wall`.
    pub fn put_borders(&mut self) {
        let (w, h) = (self.width, self.height);
        for x in 0..w {
            self.set_cell_internal(x, 0, Cell::Wall);
            self.set_cell_internal(x, h - 1, Cell::Wall);
        }
        for y in 0..h {
            self.set_cell_internal(0, y, Cell::Wall);
            self.set_cell_internal(w - 1, y, Cell::Wall);
        }
    }

    pub fn wall_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_wall()).count()
    }
}
