// src/pcg/pcg_generator.rs

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::BlockCatalog;
use crate::error::{LevelGenError, Result};
use crate::map::{Direction, DoorMask, Grid, Room};
use crate::pcg::{
    block_player_spawn, carve_corridor, find_stuck_blocks, largest_room_starter, plan_connections,
    slot_player_spawn, smooth_steps, wall_in, BlockGrid, BlockPlacer, GeneratorConfig, GeneratorKind,
    ItemSpawns,
};
use crate::utils::util::percent_to_probability;
use crate::utils::Pos;

/// A problem generation recovered from. The level is still usable.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationIssue {
    /// No catalog block fits the door constraints of a slot; it was filled with noise instead.
    ConstraintUnsatisfiable {
        slot: Pos,
        require_present: DoorMask,
        require_absent: DoorMask,
    },
    /// A room found nothing to connect to during one connection pass.
    NoConnectionFound { pass: u32, room: usize },
    /// A block door leads into a wall and no catalog block lacks just that door.
    DoorWithoutPassage { slot: Pos, direction: Direction },
}

impl fmt::Display for GenerationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationIssue::ConstraintUnsatisfiable {
                slot,
                require_present,
                require_absent,
            } => write!(
                f,
                "no block fits slot ({}, {}) with doors {} and without {}",
                slot.x, slot.y, require_present, require_absent
            ),
            GenerationIssue::NoConnectionFound { pass, room } => {
                write!(f, "room {} left unconnected in pass {}", room, pass)
            }
            GenerationIssue::DoorWithoutPassage { slot, direction } => {
                write!(f, "door {} of block ({}, {}) has no passage", direction, slot.x, slot.y)
            }
        }
    }
}

#[derive(Default, Debug, Clone)]
pub struct GenerationStats {
    pub generation_time: f64,
    pub room_count: usize,
    pub corridor_count: usize,
    pub placed_blocks: usize,
    pub filler_slots: usize,
    pub redirected_endpoints: usize,
    pub repaired_doors: usize,
    /// Placed blocks left without any passage out.
    pub stuck_blocks: usize,
}

/// Everything one generation run produces.
#[derive(Debug, Clone)]
pub struct Level {
    pub grid: Grid,
    pub rooms: Vec<Room>,
    pub blocks: BlockGrid,
    pub player_spawn: Option<Pos>,
    pub stats: GenerationStats,
    pub issues: Vec<GenerationIssue>,
    catalog: Arc<BlockCatalog>,
    item_limit: usize,
}

impl Level {
    /// Lazily hand out item spawn positions from the placed blocks.
    pub fn item_spawns<'a, R: Rng>(&'a mut self, rng: &'a mut R) -> ItemSpawns<'a, R> {
        ItemSpawns::new(&mut self.blocks, &self.catalog, rng, self.item_limit)
    }

    pub fn catalog(&self) -> &BlockCatalog {
        &self.catalog
    }
}

pub struct ProceduralGenerator {
    config: GeneratorConfig,
    catalog: Arc<BlockCatalog>,
    rng: StdRng,
    stats: GenerationStats,
    issues: Vec<GenerationIssue>,
}

impl ProceduralGenerator {
    pub fn new(config: GeneratorConfig, catalog: Arc<BlockCatalog>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        ProceduralGenerator {
            config,
            catalog,
            rng,
            stats: GenerationStats::default(),
            issues: Vec::new(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Stats of the last run.
    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    pub fn generate(&mut self) -> Result<Level> {
        self.config.validate()?;
        if self.config.requires_catalog() && self.catalog.is_empty() {
            return Err(LevelGenError::EmptyCatalog);
        }

        let start = Instant::now();
        self.stats = GenerationStats::default();
        self.issues.clear();
        info!(
            "generating {:?} level {}x{}",
            self.config.kind, self.config.width, self.config.height
        );

        let mut grid = Grid::new(self.config.width, self.config.height)?;
        let catalog = Arc::clone(&self.catalog);
        let mut placer = BlockPlacer::new(&catalog, BlockGrid::covering(&grid));

        let walk_start = match self.config.kind {
            GeneratorKind::CellularAutomata => {
                self.generate_automata(&mut grid)?;
                None
            }
            GeneratorKind::Mixed => {
                self.generate_mixed(&mut grid, &mut placer)?;
                None
            }
            GeneratorKind::BlockWalk => self.generate_block_walk(&mut grid, &mut placer)?,
        };

        let rooms = grid.find_rooms(grid.rect(), &mut self.rng);
        self.stats.room_count = rooms.len();
        self.stats.placed_blocks = placer.placed_count();
        self.stats.redirected_endpoints = placer.redirected_endpoints();
        self.stats.repaired_doors = placer.repaired_doors();

        let (blocks, placement_issues) = placer.into_parts();
        self.issues.extend(placement_issues);
        self.stats.stuck_blocks = find_stuck_blocks(&grid, &blocks, &catalog).len();

        let player_spawn = match walk_start {
            Some(slot) => slot_player_spawn(&blocks, &catalog, slot).filter(|p| !grid.is_wall(p.x, p.y)),
            None => block_player_spawn(&grid, &blocks, &catalog, &mut self.rng),
        }
        .or_else(|| largest_room_starter(&rooms));
        if player_spawn.is_none() {
            warn!("no player spawn: the level has no open cell");
        }

        self.stats.generation_time = start.elapsed().as_secs_f64();
        info!(
            "generated {} rooms, {} corridors, {} blocks ({} filler slots) in {:.3}s",
            self.stats.room_count,
            self.stats.corridor_count,
            self.stats.placed_blocks,
            self.stats.filler_slots,
            self.stats.generation_time
        );

        Ok(Level {
            grid,
            rooms,
            blocks,
            player_spawn,
            stats: self.stats.clone(),
            issues: self.issues.clone(),
            catalog,
            item_limit: self.config.spawns.item_count,
        })
    }

    fn generate_automata(&mut self, grid: &mut Grid) -> Result<()> {
        let automata = &self.config.automata;
        let rect = grid.rect();
        grid.fill_random(rect, percent_to_probability(automata.threshold_percent), &mut self.rng)?;
        smooth_steps(grid, rect, automata.min_neighbors, automata.smooth_steps)?;
        self.force_borders(grid);
        self.connect_rooms(grid, None)?;
        self.force_borders(grid);
        Ok(())
    }

    fn generate_mixed(&mut self, grid: &mut Grid, placer: &mut BlockPlacer) -> Result<()> {
        placer.place_predefined(grid, self.config.predefined.rate_percent, &mut self.rng)?;
        self.stats.filler_slots = placer.fill_free_slots(grid, &self.config.automata, &mut self.rng)?;
        self.force_borders(grid);
        self.connect_rooms(grid, Some(&mut *placer))?;
        placer.repair_doors(grid)?;
        self.force_borders(grid);
        Ok(())
    }

    fn generate_block_walk(&mut self, grid: &mut Grid, placer: &mut BlockPlacer) -> Result<Option<Pos>> {
        wall_in(grid)?;
        let start = placer.walk(grid, &mut self.rng)?;
        self.force_borders(grid);
        placer.repair_doors(grid)?;
        self.force_borders(grid);
        Ok(start)
    }

    fn force_borders(&self, grid: &mut Grid) {
        if self.config.force_borders {
            grid.put_borders();
        }
    }

    /// Repeated connection passes. Corridor ends inside placed blocks are
    /// moved to doorways when a placer is given.
    fn connect_rooms(&mut self, grid: &mut Grid, mut placer: Option<&mut BlockPlacer>) -> Result<()> {
        let connection = self.config.connection.clone();
        for pass in 0..connection.passes {
            let rooms = grid.find_rooms(grid.rect(), &mut self.rng);
            if rooms.len() <= 1 {
                debug!("connection pass {}: {} rooms, done", pass, rooms.len());
                break;
            }
            let plan = plan_connections(&rooms, connection.strategy);
            for room in plan.unconnected {
                let issue = GenerationIssue::NoConnectionFound { pass, room };
                warn!("{}", issue);
                self.issues.push(issue);
            }
            for c in &plan.connections {
                let (mut start, mut end) = (c.start, c.end);
                if let Some(placer) = placer.as_mut() {
                    start = placer.redirect_endpoint(grid, start, end)?;
                    end = placer.redirect_endpoint(grid, end, start)?;
                }
                carve_corridor(grid, start, end, connection.brush);
                self.stats.corridor_count += 1;
            }
            debug!(
                "connection pass {}: {} rooms, {} corridors",
                pass,
                rooms.len(),
                plan.connections.len()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Cell;
    use crate::pcg::{has_passage, AutomataConfig, ConnectionStrategy, PredefinedConfig};

    fn config(kind: GeneratorKind, width: i32, height: i32, seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            kind,
            width,
            height,
            seed: Some(seed),
            automata: AutomataConfig {
                threshold_percent: 45.0,
                min_neighbors: 4,
                smooth_steps: 4,
            },
            predefined: PredefinedConfig {
                rate_percent: 50.0,
                catalog_path: None,
            },
            ..Default::default()
        }
    }

    fn generator(config: GeneratorConfig) -> ProceduralGenerator {
        ProceduralGenerator::new(config, Arc::new(BlockCatalog::builtin().unwrap()))
    }

    fn assert_borders(grid: &Grid) {
        for x in 0..grid.width() {
            assert!(grid.is_wall(x, 0) && grid.is_wall(x, grid.height() - 1));
        }
        for y in 0..grid.height() {
            assert!(grid.is_wall(0, y) && grid.is_wall(grid.width() - 1, y));
        }
    }

    fn assert_doors_have_passages(level: &Level) {
        for slot in level.blocks.occupied_slots() {
            let doors = level.blocks.doors_at(slot).unwrap();
            for direction in doors.doors() {
                assert!(
                    has_passage(&level.grid, &level.blocks, level.catalog(), slot, direction),
                    "slot {:?} door {}",
                    slot,
                    direction
                );
            }
        }
    }

    #[test]
    fn test_mixed_end_to_end() {
        for seed in 0..8 {
            let level = generator(config(GeneratorKind::Mixed, 24, 16, seed)).generate().unwrap();
            assert!(!level.rooms.is_empty(), "seed {}", seed);
            assert_borders(&level.grid);
            let spawn = level.player_spawn.unwrap();
            assert!(!level.grid.is_wall(spawn.x, spawn.y));
            assert_doors_have_passages(&level);
            assert_eq!(level.stats.room_count, level.rooms.len());
        }
    }

    #[test]
    fn test_automata_end_to_end() {
        for seed in 0..8 {
            let mut config = config(GeneratorKind::CellularAutomata, 24, 16, seed);
            config.connection.strategy = ConnectionStrategy::SpanningTree;
            let level = generator(config).generate().unwrap();
            assert!(!level.rooms.is_empty(), "seed {}", seed);
            assert_borders(&level.grid);
            let spawn = level.player_spawn.unwrap();
            assert!(!level.grid.is_wall(spawn.x, spawn.y));
            assert_eq!(level.blocks.occupied_slots().len(), 0);
        }
    }

    #[test]
    fn test_block_walk_end_to_end() {
        let mut generator = generator(config(GeneratorKind::BlockWalk, 48, 32, 12));
        let mut level = generator.generate().unwrap();
        assert!(level.stats.placed_blocks >= 1);
        assert_borders(&level.grid);
        let spawn = level.player_spawn.unwrap();
        assert!(!level.grid.is_wall(spawn.x, spawn.y));
        assert_doors_have_passages(&level);

        let mut rng = StdRng::seed_from_u64(1);
        let items: Vec<Pos> = level.item_spawns(&mut rng).collect();
        assert!(!items.is_empty() && items.len() <= 8);
        assert!(items.iter().all(|p| !level.grid.is_wall(p.x, p.y)));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let a = generator(config(GeneratorKind::Mixed, 48, 32, 99)).generate().unwrap();
        let b = generator(config(GeneratorKind::Mixed, 48, 32, 99)).generate().unwrap();
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.player_spawn, b.player_spawn);
    }

    #[test]
    fn test_invalid_configuration_aborts() {
        let mut bad = config(GeneratorKind::Mixed, 0, 16, 1);
        assert!(matches!(
            generator(bad.clone()).generate(),
            Err(LevelGenError::InvalidDimensions { .. })
        ));

        bad.width = 24;
        let mut empty = ProceduralGenerator::new(bad.clone(), Arc::new(BlockCatalog::default()));
        assert!(matches!(empty.generate(), Err(LevelGenError::EmptyCatalog)));

        // no blocks requested, so no catalog needed
        bad.predefined.rate_percent = 0.0;
        let mut plain = ProceduralGenerator::new(bad, Arc::new(BlockCatalog::default()));
        let level = plain.generate().unwrap();
        assert!(level.grid.rect().positions().any(|p| level.grid.cell_at(p.x, p.y) == Cell::Wall));
    }
}
