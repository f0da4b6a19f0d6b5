// src/pcg/pcg_placement.rs

use std::collections::HashSet;

use log::{debug, info, warn};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::catalog::BlockCatalog;
use crate::error::Result;
use crate::map::{Cell, Direction, DoorMask, Grid};
use crate::pcg::{smooth_steps, AutomataConfig, Block, BlockGrid, GenerationIssue, PassageChecker};
use crate::utils::util::{percent_of, percent_to_probability};
use crate::utils::Pos;

/// Door constraints on one slot, derived from its neighbours and the grid edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotConstraints {
    pub require_present: DoorMask,
    pub require_absent: DoorMask,
    /// Sides facing an unassigned neighbour.
    pub free: DoorMask,
}

/// Places predefined blocks on a block grid and keeps the cell grid in step
/// with them. Recoverable problems are collected as issues.
pub struct BlockPlacer<'a> {
    catalog: &'a BlockCatalog,
    blocks: BlockGrid,
    issues: Vec<GenerationIssue>,
    rejected: HashSet<Pos>,
    placed: usize,
    repaired_doors: usize,
    redirected_endpoints: usize,
}

impl<'a> BlockPlacer<'a> {
    pub fn new(catalog: &'a BlockCatalog, blocks: BlockGrid) -> Self {
        BlockPlacer {
            catalog,
            blocks,
            issues: Vec::new(),
            rejected: HashSet::new(),
            placed: 0,
            repaired_doors: 0,
            redirected_endpoints: 0,
        }
    }

    pub fn blocks(&self) -> &BlockGrid {
        &self.blocks
    }

    pub fn issues(&self) -> &[GenerationIssue] {
        &self.issues
    }

    pub fn placed_count(&self) -> usize {
        self.placed
    }

    pub fn repaired_doors(&self) -> usize {
        self.repaired_doors
    }

    pub fn redirected_endpoints(&self) -> usize {
        self.redirected_endpoints
    }

    pub fn into_parts(self) -> (BlockGrid, Vec<GenerationIssue>) {
        (self.blocks, self.issues)
    }

    fn record(&mut self, issue: GenerationIssue) {
        warn!("{}", issue);
        if !self.issues.contains(&issue) {
            self.issues.push(issue);
        }
    }

    pub fn constraints(&self, slot: Pos) -> SlotConstraints {
        let mut c = SlotConstraints {
            require_absent: self.blocks.edge_absent_mask(slot),
            ..Default::default()
        };
        for direction in Direction::ALL {
            if c.require_absent.has(direction) {
                continue;
            }
            match self.blocks.doors_at(slot.step(direction)) {
                Some(doors) if doors.has(direction.opposite()) => {
                    c.require_present = c.require_present.with(direction)
                }
                Some(_) => c.require_absent = c.require_absent.with(direction),
                None => c.free = c.free.with(direction),
            }
        }
        c
    }

    /// Assign a catalog block to `slot` and stamp its pattern into `grid`.
    pub fn assign(&mut self, grid: &mut Grid, slot: Pos, catalog_index: usize) -> Result<()> {
        let Some(predefined) = self.catalog.get(catalog_index) else {
            return Ok(());
        };
        let origin = BlockGrid::slot_origin(slot);
        grid.copy_region_from(origin.x, origin.y, predefined.pattern())?;
        self.blocks.put(slot, Block::new(catalog_index, predefined));
        Ok(())
    }

    /// Place a block in `slot` that agrees with its assigned neighbours. One
    /// free side, if any, is promoted to a required door. When nothing in the
    /// catalog fits, the promotion is dropped; when that still fails the slot
    /// is left unassigned.
    pub fn spawn_node<R: Rng>(&mut self, grid: &mut Grid, slot: Pos, rng: &mut R) -> Result<Option<usize>> {
        let c = self.constraints(slot);
        let free: Vec<Direction> = c.free.doors().collect();
        let promoted = free.choose(rng).map(|&d| c.require_present.with(d));

        let picked = promoted
            .and_then(|present| self.catalog.pick_matching(present, c.require_absent, rng))
            .or_else(|| self.catalog.pick_matching(c.require_present, c.require_absent, rng));

        match picked {
            Some(index) => {
                self.assign(grid, slot, index)?;
                self.placed += 1;
                debug!(
                    "slot ({}, {}): placed block {} (present {}, absent {})",
                    slot.x, slot.y, index, c.require_present, c.require_absent
                );
                Ok(Some(index))
            }
            None => {
                self.rejected.insert(slot);
                self.record(GenerationIssue::ConstraintUnsatisfiable {
                    slot,
                    require_present: c.require_present,
                    require_absent: c.require_absent,
                });
                Ok(None)
            }
        }
    }

    /// Put predefined blocks on `rate_percent` of the slots. Returns how many
    /// were placed.
    pub fn place_predefined<R: Rng>(&mut self, grid: &mut Grid, rate_percent: f64, rng: &mut R) -> Result<usize> {
        let target = percent_of(self.blocks.slot_count(), rate_percent);
        let before = self.placed;
        for _ in 0..target {
            let rejected = &self.rejected;
            let Some(slot) = self
                .blocks
                .pick_slot(rng, |slot, block| block.is_none() && !rejected.contains(&slot))
            else {
                break;
            };
            self.spawn_node(grid, slot, rng)?;
        }
        let placed = self.placed - before;
        info!("placed {} of {} predefined blocks", placed, target);
        Ok(placed)
    }

    /// Fill every unassigned slot, and the strips no slot covers, with
    /// smoothed noise. Each region is filled and smoothed on its own.
    pub fn fill_free_slots<R: Rng>(&self, grid: &mut Grid, automata: &AutomataConfig, rng: &mut R) -> Result<usize> {
        let probability = percent_to_probability(automata.threshold_percent);
        let mut regions: Vec<_> = self
            .blocks
            .free_slots()
            .into_iter()
            .map(BlockGrid::slot_rect)
            .collect();
        let slots = regions.len();
        regions.extend(self.blocks.margin_rects(grid));
        for area in regions {
            grid.fill_random(area, probability, rng)?;
            smooth_steps(grid, area, automata.min_neighbors, automata.smooth_steps)?;
        }
        debug!("filled {} free slots with noise", slots);
        Ok(slots)
    }

    /// Where a corridor ending at `endpoint` (heading for `toward`) should
    /// really end. Endpoints inside a placed block move to a doorway cell on
    /// the side facing `toward`, swapping in the catalog variant that has that
    /// door. Anything else is returned unchanged.
    pub fn redirect_endpoint(&mut self, grid: &mut Grid, endpoint: Pos, toward: Pos) -> Result<Pos> {
        let Some(slot) = self.blocks.slot_of_cell(endpoint) else {
            return Ok(endpoint);
        };
        let Some(current) = self.blocks.get(slot).map(Block::doors) else {
            return Ok(endpoint);
        };
        let direction = Direction::dominant(toward.x - endpoint.x, toward.y - endpoint.y);
        if self.blocks.edge_absent_mask(slot).has(direction) {
            return Ok(endpoint);
        }

        if !current.has(direction) {
            let Some(index) = self.catalog.find_exact(current.with(direction)) else {
                debug!("slot ({}, {}): no variant of {} with a {} door", slot.x, slot.y, current, direction);
                return Ok(endpoint);
            };
            self.assign(grid, slot, index)?;
        }

        let doorway = self
            .blocks
            .get(slot)
            .and_then(|b| self.catalog.get(b.catalog_index()))
            .and_then(|predefined| predefined.doorway_cells(direction).copied());
        let Some(doorway) = doorway else {
            return Ok(endpoint);
        };
        let origin = BlockGrid::slot_origin(slot);
        let target = doorway
            .iter()
            .map(|cell| cell.offset(origin.x, origin.y))
            .min_by_key(|cell| cell.distance_sq(&toward))
            .unwrap_or(endpoint);
        self.redirected_endpoints += 1;
        Ok(target)
    }

    /// Drop doors that lead nowhere, swapping each affected slot for the
    /// catalog block with the reduced mask. Swaps can close off passages of
    /// neighbouring blocks, so this runs until nothing changes. Returns the
    /// number of doors removed.
    pub fn repair_doors(&mut self, grid: &mut Grid) -> Result<usize> {
        let max_rounds = self.blocks.slot_count() * 4 + 1;
        let mut removed = 0;
        for _ in 0..max_rounds {
            let mut changed = false;
            for slot in self.blocks.occupied_slots() {
                let Some(block) = self.blocks.get(slot) else {
                    continue;
                };
                let Some(predefined) = self.catalog.get(block.catalog_index()) else {
                    continue;
                };
                let checker = PassageChecker::new(slot, predefined, grid);
                let dead: Vec<Direction> = block.doors().doors().filter(|&d| !checker.has_passage(d)).collect();
                if dead.is_empty() {
                    continue;
                }
                let reduced = dead.iter().fold(block.doors(), |mask, &d| mask.without(d));
                match self.catalog.find_exact(reduced) {
                    Some(index) => {
                        debug!("slot ({}, {}): doors {} -> {}", slot.x, slot.y, block.doors(), reduced);
                        self.assign(grid, slot, index)?;
                        removed += dead.len();
                        changed = true;
                    }
                    None => {
                        for direction in dead {
                            self.record(GenerationIssue::DoorWithoutPassage { slot, direction });
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }
        self.repaired_doors += removed;
        if removed > 0 {
            info!("door repair removed {} doors", removed);
        }
        Ok(removed)
    }

    /// Depth-first walk through block doors from one random slot. Every door
    /// that faces an unassigned slot gets a matching neighbour. Returns the
    /// start slot if its block could be placed.
    pub fn walk<R: Rng>(&mut self, grid: &mut Grid, rng: &mut R) -> Result<Option<Pos>> {
        let Some(start) = self.blocks.pick_slot(rng, |_, block| block.is_none()) else {
            return Ok(None);
        };
        if self.spawn_node(grid, start, rng)?.is_none() {
            return Ok(None);
        }

        let mut stack = vec![start];
        while let Some(slot) = stack.pop() {
            let Some(doors) = self.blocks.doors_at(slot) else {
                continue;
            };
            for direction in doors.doors() {
                let next = slot.step(direction);
                if !self.blocks.in_bounds(next) || self.blocks.is_occupied(next) || self.rejected.contains(&next) {
                    continue;
                }
                if self.spawn_node(grid, next, rng)?.is_some() {
                    stack.push(next);
                }
            }
        }
        info!("block walk from ({}, {}) placed {} blocks", start.x, start.y, self.placed);
        Ok(Some(start))
    }
}

/// Fill the whole grid with walls, the starting state of a block walk.
pub fn wall_in(grid: &mut Grid) -> Result<()> {
    let rect = grid.rect();
    grid.fill(rect, Cell::Wall)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcg::has_passage;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn corridor_only_catalog() -> BlockCatalog {
        let builtin = BlockCatalog::builtin().unwrap();
        let lr = DoorMask::NONE.with(Direction::Left).with(Direction::Right);
        let index = builtin.find_exact(lr).unwrap();
        BlockCatalog::new(vec![builtin.get(index).unwrap().clone()])
    }

    #[test]
    fn test_constraints_follow_neighbours_and_edges() {
        let catalog = BlockCatalog::builtin().unwrap();
        let mut grid = Grid::new(36, 16).unwrap();
        let mut placer = BlockPlacer::new(&catalog, BlockGrid::covering(&grid));
        let right_only = catalog.find_exact(DoorMask::NONE.with(Direction::Right)).unwrap();
        placer.assign(&mut grid, Pos::new(0, 0), right_only).unwrap();

        let c = placer.constraints(Pos::new(1, 0));
        assert!(c.require_present.has(Direction::Left));
        assert!(c.require_absent.has(Direction::Down));
        assert!(c.free.has(Direction::Right) && c.free.has(Direction::Up));

        // (0, 1) sits above a block without an Up door
        let c = placer.constraints(Pos::new(0, 1));
        assert!(c.require_absent.has(Direction::Down));
        assert!(c.require_absent.has(Direction::Left) && c.require_absent.has(Direction::Up));
        assert_eq!(c.free, DoorMask::NONE.with(Direction::Right));
    }

    #[test]
    fn test_spawn_node_respects_constraints() {
        let catalog = BlockCatalog::builtin().unwrap();
        let mut rng = StdRng::seed_from_u64(21);
        let mut grid = Grid::new(36, 24).unwrap();
        let mut placer = BlockPlacer::new(&catalog, BlockGrid::covering(&grid));
        for slot in [Pos::new(1, 1), Pos::new(0, 1), Pos::new(1, 0), Pos::new(2, 2)] {
            let c = placer.constraints(slot);
            let index = placer.spawn_node(&mut grid, slot, &mut rng).unwrap().unwrap();
            let doors = catalog.get(index).unwrap().doors();
            assert!(doors.satisfies(c.require_present, c.require_absent));
            if !c.free.is_empty() {
                assert!(!doors.is_empty());
            }
        }
        assert_eq!(placer.placed_count(), 4);
        assert!(placer.issues().is_empty());
    }

    #[test]
    fn test_edge_slot_with_corridor_only_catalog_falls_back() {
        let catalog = corridor_only_catalog();
        let mut rng = StdRng::seed_from_u64(3);
        let mut grid = Grid::new(36, 8).unwrap();
        let mut placer = BlockPlacer::new(&catalog, BlockGrid::covering(&grid));

        assert_eq!(placer.spawn_node(&mut grid, Pos::new(0, 0), &mut rng).unwrap(), None);
        assert!(!placer.blocks().is_occupied(Pos::new(0, 0)));
        assert!(matches!(
            placer.issues()[0],
            GenerationIssue::ConstraintUnsatisfiable { slot, .. } if slot == Pos::new(0, 0)
        ));

        placer.place_predefined(&mut grid, 100.0, &mut rng).unwrap();
        assert_eq!(placer.blocks().occupied_slots(), vec![Pos::new(1, 0)]);

        let automata = AutomataConfig::default();
        let filled = placer.fill_free_slots(&mut grid, &automata, &mut rng).unwrap();
        assert_eq!(filled, 2);
    }

    #[test]
    fn test_redirect_adds_door_toward_target() {
        let catalog = BlockCatalog::builtin().unwrap();
        let mut grid = Grid::new(36, 24).unwrap();
        let mut placer = BlockPlacer::new(&catalog, BlockGrid::covering(&grid));
        let closed = catalog.find_exact(DoorMask::NONE).unwrap();
        placer.assign(&mut grid, Pos::new(1, 1), closed).unwrap();

        // from the middle of the centre block toward the right
        let redirected = placer
            .redirect_endpoint(&mut grid, Pos::new(18, 12), Pos::new(33, 12))
            .unwrap();
        assert_eq!(redirected, Pos::new(23, 12));
        assert!(placer.blocks().doors_at(Pos::new(1, 1)).unwrap().has(Direction::Right));
        assert!(!grid.is_wall(23, 12));
        assert_eq!(placer.redirected_endpoints(), 1);

        // endpoints outside placed blocks are left alone
        let untouched = placer.redirect_endpoint(&mut grid, Pos::new(3, 3), Pos::new(30, 3)).unwrap();
        assert_eq!(untouched, Pos::new(3, 3));
    }

    #[test]
    fn test_redirect_never_opens_outward() {
        let catalog = BlockCatalog::builtin().unwrap();
        let mut grid = Grid::new(24, 8).unwrap();
        let mut placer = BlockPlacer::new(&catalog, BlockGrid::covering(&grid));
        let closed = catalog.find_exact(DoorMask::NONE).unwrap();
        placer.assign(&mut grid, Pos::new(0, 0), closed).unwrap();
        let endpoint = Pos::new(5, 4);
        assert_eq!(placer.redirect_endpoint(&mut grid, endpoint, Pos::new(-10, 4)).unwrap(), endpoint);
        assert_eq!(placer.blocks().doors_at(Pos::new(0, 0)), Some(DoorMask::NONE));
    }

    #[test]
    fn test_repair_leaves_only_real_passages() {
        let catalog = BlockCatalog::builtin().unwrap();
        let mut grid = Grid::new(36, 24).unwrap();
        wall_in(&mut grid).unwrap();
        let mut placer = BlockPlacer::new(&catalog, BlockGrid::covering(&grid));
        let all = catalog.find_exact(DoorMask::ALL).unwrap();
        let left = catalog.find_exact(DoorMask::NONE.with(Direction::Left)).unwrap();
        placer.assign(&mut grid, Pos::new(1, 1), all).unwrap();
        placer.assign(&mut grid, Pos::new(2, 1), left).unwrap();

        let removed = placer.repair_doors(&mut grid).unwrap();
        assert_eq!(removed, 3);
        assert_eq!(
            placer.blocks().doors_at(Pos::new(1, 1)),
            Some(DoorMask::NONE.with(Direction::Right))
        );
        for slot in placer.blocks().occupied_slots() {
            let doors = placer.blocks().doors_at(slot).unwrap();
            for direction in doors.doors() {
                assert!(has_passage(&grid, placer.blocks(), &catalog, slot, direction));
            }
        }
    }

    #[test]
    fn test_repair_without_reduced_variant_is_reported() {
        let catalog = corridor_only_catalog();
        let mut grid = Grid::new(36, 8).unwrap();
        wall_in(&mut grid).unwrap();
        let mut placer = BlockPlacer::new(&catalog, BlockGrid::covering(&grid));
        placer.assign(&mut grid, Pos::new(1, 0), 0).unwrap();

        assert_eq!(placer.repair_doors(&mut grid).unwrap(), 0);
        assert_eq!(placer.issues().len(), 2);
        assert!(placer
            .issues()
            .iter()
            .all(|i| matches!(i, GenerationIssue::DoorWithoutPassage { .. })));
    }

    #[test]
    fn test_walk_places_connected_blocks() {
        let catalog = BlockCatalog::builtin().unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let mut grid = Grid::new(48, 32).unwrap();
        wall_in(&mut grid).unwrap();
        let mut placer = BlockPlacer::new(&catalog, BlockGrid::covering(&grid));
        let start = placer.walk(&mut grid, &mut rng).unwrap().unwrap();
        assert!(placer.blocks().is_occupied(start));

        // every door of a walked block faces a block with the matching door
        for slot in placer.blocks().occupied_slots() {
            for direction in placer.blocks().doors_at(slot).unwrap().doors() {
                let next = slot.step(direction);
                let other = placer.blocks().doors_at(next);
                assert!(other.is_some(), "door {} of {:?} faces the empty slot {:?}", direction, slot, next);
                assert!(other.is_some_and(|doors| doors.has(direction.opposite())));
            }
        }
    }
}
