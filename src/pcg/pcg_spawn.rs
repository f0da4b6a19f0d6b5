// src/pcg/pcg_spawn.rs

use log::debug;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::catalog::BlockCatalog;
use crate::map::{Grid, Room};
use crate::pcg::{Block, BlockGrid};
use crate::utils::Pos;

/// Player spawn of a random placed block, in grid coordinates. Spawn points
/// that ended up walled over are skipped.
pub fn block_player_spawn<R: Rng>(grid: &Grid, blocks: &BlockGrid, catalog: &BlockCatalog, rng: &mut R) -> Option<Pos> {
    let candidates: Vec<Pos> = blocks
        .occupied_slots()
        .into_iter()
        .filter_map(|slot| slot_player_spawn(blocks, catalog, slot))
        .filter(|p| !grid.is_wall(p.x, p.y))
        .collect();
    candidates.choose(rng).copied()
}

pub fn slot_player_spawn(blocks: &BlockGrid, catalog: &BlockCatalog, slot: Pos) -> Option<Pos> {
    let predefined = blocks.get(slot).and_then(|b| catalog.get(b.catalog_index()))?;
    let origin = BlockGrid::slot_origin(slot);
    let local = predefined.player_spawn();
    Some(local.offset(origin.x, origin.y))
}

/// Starter cell of the largest room; the first one on ties.
pub fn largest_room_starter(rooms: &[Room]) -> Option<Pos> {
    rooms
        .iter()
        .reduce(|best, room| if room.len() > best.len() { room } else { best })
        .map(Room::starter_cell)
}

/// Item spawn positions handed out one at a time. Every position returned
/// marks that spawn point of its block as used, so each is returned at most
/// once. Ends after `remaining` picks or when every spawn point is taken.
pub struct ItemSpawns<'a, R: Rng> {
    blocks: &'a mut BlockGrid,
    catalog: &'a BlockCatalog,
    rng: &'a mut R,
    remaining: usize,
}

impl<'a, R: Rng> ItemSpawns<'a, R> {
    pub fn new(blocks: &'a mut BlockGrid, catalog: &'a BlockCatalog, rng: &'a mut R, limit: usize) -> Self {
        ItemSpawns {
            blocks,
            catalog,
            rng,
            remaining: limit,
        }
    }
}

impl<R: Rng> Iterator for ItemSpawns<'_, R> {
    type Item = Pos;

    fn next(&mut self) -> Option<Pos> {
        if self.remaining == 0 {
            return None;
        }
        let slot = self
            .blocks
            .pick_slot(&mut *self.rng, |_, block| block.is_some_and(Block::has_free_spawn_point))?;
        let block = self.blocks.get_mut(slot)?;
        let point = block.pick_free_spawn_point(&mut *self.rng)?;
        block.set_spawn_point(point, true);
        let local = *self.catalog.get(block.catalog_index())?.item_spawns().get(point)?;
        self.remaining -= 1;

        let origin = BlockGrid::slot_origin(slot);
        let spawn = local.offset(origin.x, origin.y);
        debug!("item spawn at ({}, {}) from slot ({}, {})", spawn.x, spawn.y, slot.x, slot.y);
        Some(spawn)
    }
}
