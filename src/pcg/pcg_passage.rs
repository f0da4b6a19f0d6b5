// src/pcg/pcg_passage.rs

use log::warn;

use crate::catalog::{BlockCatalog, PredefinedBlock};
use crate::map::{Direction, Grid};
use crate::pcg::BlockGrid;
use crate::utils::Pos;

/// Tells a door that merely exists in a block's mask apart from one that
/// opens onto carved space beyond the block.
pub struct PassageChecker<'a> {
    block: &'a PredefinedBlock,
    grid: &'a Grid,
    origin: Pos,
}

impl<'a> PassageChecker<'a> {
    pub fn new(slot: Pos, block: &'a PredefinedBlock, grid: &'a Grid) -> Self {
        PassageChecker {
            block,
            grid,
            origin: BlockGrid::slot_origin(slot),
        }
    }

    /// True iff the block has a door on `direction` and at least one doorway
    /// cell, stepped once more in that direction, is not a wall.
    pub fn has_passage(&self, direction: Direction) -> bool {
        let Some(doorway) = self.block.doorway_cells(direction) else {
            return false;
        };
        doorway.iter().any(|cell| {
            let beyond = cell.offset(self.origin.x, self.origin.y).step(direction);
            !self.grid.is_wall(beyond.x, beyond.y)
        })
    }

    pub fn has_any_passage(&self) -> bool {
        Direction::ALL.into_iter().any(|d| self.has_passage(d))
    }
}

/// Passage check for whatever block currently sits in `slot`. Empty slots
/// have no passages.
pub fn has_passage(grid: &Grid, blocks: &BlockGrid, catalog: &BlockCatalog, slot: Pos, direction: Direction) -> bool {
    blocks
        .get(slot)
        .and_then(|b| catalog.get(b.catalog_index()))
        .is_some_and(|predefined| PassageChecker::new(slot, predefined, grid).has_passage(direction))
}

/// Placed blocks none of whose doors leads anywhere.
pub fn find_stuck_blocks(grid: &Grid, blocks: &BlockGrid, catalog: &BlockCatalog) -> Vec<Pos> {
    let stuck: Vec<Pos> = blocks
        .occupied_slots()
        .into_iter()
        .filter(|&slot| {
            blocks
                .get(slot)
                .and_then(|b| catalog.get(b.catalog_index()))
                .is_some_and(|predefined| !PassageChecker::new(slot, predefined, grid).has_any_passage())
        })
        .collect();
    for slot in &stuck {
        warn!("block ({}, {}) has no passage out", slot.x, slot.y);
    }
    stuck
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Cell, DoorMask};
    use crate::pcg::Block;
    use crate::utils::Rect;

    // Two slots side by side; the left one holds an L|R corridor block.
    fn setup() -> (Grid, BlockGrid, BlockCatalog, usize) {
        let catalog = BlockCatalog::builtin().unwrap();
        let index = catalog
            .find_exact(DoorMask::NONE.with(Direction::Left).with(Direction::Right))
            .unwrap();
        let mut grid = Grid::new(24, 8).unwrap();
        grid.fill(grid.rect(), Cell::Wall).unwrap();
        grid.copy_region_from(0, 0, catalog.get(index).unwrap().pattern()).unwrap();
        let mut blocks = BlockGrid::new(2, 1);
        blocks.put(Pos::new(0, 0), Block::new(index, catalog.get(index).unwrap()));
        (grid, blocks, catalog, index)
    }

    #[test]
    fn test_door_into_wall_has_no_passage() {
        let (grid, blocks, catalog, _) = setup();
        let slot = Pos::new(0, 0);
        assert!(!has_passage(&grid, &blocks, &catalog, slot, Direction::Right));
        // left door faces outside the grid
        assert!(!has_passage(&grid, &blocks, &catalog, slot, Direction::Left));
        // no door at all
        assert!(!has_passage(&grid, &blocks, &catalog, slot, Direction::Up));
        assert_eq!(find_stuck_blocks(&grid, &blocks, &catalog), vec![slot]);
    }

    #[test]
    fn test_door_onto_carved_space_has_passage() {
        let (mut grid, blocks, catalog, _) = setup();
        grid.fill(Rect::new(12, 3, 1, 1), Cell::Empty).unwrap();
        let slot = Pos::new(0, 0);
        assert!(has_passage(&grid, &blocks, &catalog, slot, Direction::Right));
        assert!(find_stuck_blocks(&grid, &blocks, &catalog).is_empty());
        // empty slot
        assert!(!has_passage(&grid, &blocks, &catalog, Pos::new(1, 0), Direction::Left));
    }
}
