// src/pcg/pcg_blocks.rs

use rand::Rng;

use crate::catalog::{PredefinedBlock, BLOCK_HEIGHT, BLOCK_WIDTH, MAX_ITEM_SPAWNS};
use crate::map::{Direction, DoorMask, Grid};
use crate::utils::{Pos, Rect};

/// A predefined block placed in one slot of the block grid, plus which of its
/// item spawn points have been handed out this run.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    catalog_index: usize,
    doors: DoorMask,
    spawn_count: usize,
    occupied: [bool; MAX_ITEM_SPAWNS],
}

impl Block {
    pub fn new(catalog_index: usize, predefined: &PredefinedBlock) -> Self {
        Block {
            catalog_index,
            doors: predefined.doors(),
            spawn_count: predefined.item_spawns().len().min(MAX_ITEM_SPAWNS),
            occupied: [false; MAX_ITEM_SPAWNS],
        }
    }

    pub fn catalog_index(&self) -> usize {
        self.catalog_index
    }

    pub fn doors(&self) -> DoorMask {
        self.doors
    }

    /// Indices past the block's own spawn points count as occupied.
    pub fn is_spawn_point_occupied(&self, point: usize) -> bool {
        point >= self.spawn_count || self.occupied[point]
    }

    pub fn set_spawn_point(&mut self, point: usize, occupied: bool) {
        if point < self.spawn_count {
            self.occupied[point] = occupied;
        }
    }

    pub fn has_free_spawn_point(&self) -> bool {
        (0..self.spawn_count).any(|i| !self.occupied[i])
    }

    /// A free spawn point index: random start, then the next free one.
    pub fn pick_free_spawn_point<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        if self.spawn_count == 0 {
            return None;
        }
        let start = rng.random_range(0..self.spawn_count);
        (0..self.spawn_count)
            .map(|i| (start + i) % self.spawn_count)
            .find(|&i| !self.occupied[i])
    }
}

/// The coarse grid of block slots laid over a cell grid. Slot `(x, y)`
/// covers cells `x * BLOCK_WIDTH ..` and `y * BLOCK_HEIGHT ..`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockGrid {
    width: i32,
    height: i32,
    slots: Vec<Option<Block>>,
}

impl BlockGrid {
    pub fn new(width: i32, height: i32) -> Self {
        let (width, height) = (width.max(0), height.max(0));
        BlockGrid {
            width,
            height,
            slots: vec![None; width as usize * height as usize],
        }
    }

    /// As many whole block slots as fit in `grid`.
    pub fn covering(grid: &Grid) -> Self {
        Self::new(grid.width() / BLOCK_WIDTH, grid.height() / BLOCK_HEIGHT)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn in_bounds(&self, slot: Pos) -> bool {
        slot.x >= 0 && slot.y >= 0 && slot.x < self.width && slot.y < self.height
    }

    fn index(&self, slot: Pos) -> Option<usize> {
        self.in_bounds(slot).then(|| (slot.y * self.width + slot.x) as usize)
    }

    pub fn get(&self, slot: Pos) -> Option<&Block> {
        let i = self.index(slot)?;
        self.slots[i].as_ref()
    }

    pub fn get_mut(&mut self, slot: Pos) -> Option<&mut Block> {
        let i = self.index(slot)?;
        self.slots[i].as_mut()
    }

    pub fn is_occupied(&self, slot: Pos) -> bool {
        self.get(slot).is_some()
    }

    /// Door mask of the block in `slot`, if the slot exists and is assigned.
    pub fn doors_at(&self, slot: Pos) -> Option<DoorMask> {
        self.get(slot).map(Block::doors)
    }

    /// Assign a slot. Writes outside the block grid are dropped.
    pub fn put(&mut self, slot: Pos, block: Block) {
        if let Some(i) = self.index(slot) {
            self.slots[i] = Some(block);
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        Rect::new(0, 0, self.width, self.height).positions()
    }

    pub fn occupied_slots(&self) -> Vec<Pos> {
        self.positions().filter(|&p| self.is_occupied(p)).collect()
    }

    pub fn free_slots(&self) -> Vec<Pos> {
        self.positions().filter(|&p| !self.is_occupied(p)).collect()
    }

    pub fn slot_origin(slot: Pos) -> Pos {
        Pos::new(slot.x * BLOCK_WIDTH, slot.y * BLOCK_HEIGHT)
    }

    pub fn slot_rect(slot: Pos) -> Rect {
        let origin = Self::slot_origin(slot);
        Rect::new(origin.x, origin.y, BLOCK_WIDTH, BLOCK_HEIGHT)
    }

    /// The slot covering a cell, if any.
    pub fn slot_of_cell(&self, cell: Pos) -> Option<Pos> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let slot = Pos::new(cell.x / BLOCK_WIDTH, cell.y / BLOCK_HEIGHT);
        self.in_bounds(slot).then_some(slot)
    }

    /// Parts of `grid` right and above the last whole slots, which no block covers.
    pub fn margin_rects(&self, grid: &Grid) -> Vec<Rect> {
        let covered_w = self.width * BLOCK_WIDTH;
        let covered_h = self.height * BLOCK_HEIGHT;
        [
            Rect::new(covered_w, 0, grid.width() - covered_w, grid.height()),
            Rect::new(0, covered_h, covered_w, grid.height() - covered_h),
        ]
        .into_iter()
        .filter(|r| !r.is_empty())
        .collect()
    }

    /// Doors a block in `slot` may never have because they face out of the grid.
    pub fn edge_absent_mask(&self, slot: Pos) -> DoorMask {
        let mut absent = DoorMask::NONE;
        if slot.x == 0 {
            absent = absent.with(Direction::Left);
        }
        if slot.x == self.width - 1 {
            absent = absent.with(Direction::Right);
        }
        if slot.y == 0 {
            absent = absent.with(Direction::Down);
        }
        if slot.y == self.height - 1 {
            absent = absent.with(Direction::Up);
        }
        absent
    }

    /// Pick a slot matching `matches`: a random slot first, then a row-major
    /// linear probe (wrapping) over every other slot.
    pub fn pick_slot<R, F>(&self, rng: &mut R, matches: F) -> Option<Pos>
    where
        R: Rng,
        F: Fn(Pos, Option<&Block>) -> bool,
    {
        let count = self.slot_count();
        if count == 0 {
            return None;
        }
        let start = rng.random_range(0..count);
        (0..count)
            .map(|i| (start + i) % count)
            .map(|i| (Pos::new(i as i32 % self.width, i as i32 / self.width), i))
            .find(|&(slot, i)| matches(slot, self.slots[i].as_ref()))
            .map(|(slot, _)| slot)
    }
}
