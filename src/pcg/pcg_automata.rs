// src/pcg/pcg_automata.rs

use crate::error::Result;
use crate::map::{Cell, Grid};
use crate::utils::Rect;

/// One cellular-automata pass over `area`: a cell becomes wall iff more than
/// `min_neighbors` cells of its 3x3 neighbourhood (itself included) are walls.
///
/// Neighbour counts are taken from the grid as it was before the pass, so
/// the result does not depend on visiting order.
pub fn smooth(grid: &mut Grid, area: Rect, min_neighbors: u32) -> Result<()> {
    let counts: Vec<u32> = area
        .positions()
        .map(|p| grid.neighbor_wall_count(p.x, p.y))
        .collect();
    for (pos, count) in area.positions().zip(counts) {
        grid.set_cell(pos.x, pos.y, Cell::wall_or_empty(count > min_neighbors))?;
    }
    Ok(())
}

/// `steps` consecutive passes, each reading the previous pass's output.
pub fn smooth_steps(grid: &mut Grid, area: Rect, min_neighbors: u32, steps: u32) -> Result<()> {
    for _ in 0..steps {
        smooth(grid, area, min_neighbors)?;
    }
    Ok(())
}
