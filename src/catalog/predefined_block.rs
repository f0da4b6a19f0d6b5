// src/catalog/predefined_block.rs

use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{LevelGenError, Result};
use crate::map::{Direction, DoorMask, Grid};
use crate::utils::Pos;

/// Width of every predefined block, in cells.
pub const BLOCK_WIDTH: i32 = 12;
/// Height of every predefined block, in cells.
pub const BLOCK_HEIGHT: i32 = 8;
/// Upper bound on item spawn points per block.
pub const MAX_ITEM_SPAWNS: usize = 4;

/// Standard doorway cells, indexed by [`Direction::index`].
pub const STANDARD_DOORWAYS: [[Pos; 2]; 4] = [
    [Pos::new(0, 3), Pos::new(0, 4)],                               // Left
    [Pos::new(BLOCK_WIDTH - 1, 3), Pos::new(BLOCK_WIDTH - 1, 4)],   // Right
    [Pos::new(5, BLOCK_HEIGHT - 1), Pos::new(6, BLOCK_HEIGHT - 1)], // Up
    [Pos::new(5, 0), Pos::new(6, 0)],                               // Down
];

pub const STANDARD_PLAYER_SPAWN: Pos = Pos::new(3, 1);

pub const STANDARD_ITEM_SPAWNS: [Pos; MAX_ITEM_SPAWNS] =
    [Pos::new(3, 1), Pos::new(9, 1), Pos::new(3, 6), Pos::new(9, 6)];

/// A hand-authored `BLOCK_WIDTH x BLOCK_HEIGHT` tile pattern with doors on
/// some of its sides. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct PredefinedBlock {
    name: String,
    doors: DoorMask,
    pattern: Grid,
    doorways: [[Pos; 2]; 4],
    player_spawn: Pos,
    item_spawns: Vec<Pos>,
}

impl PredefinedBlock {
    /// A block using the standard doorway and spawn coordinates.
    pub fn new(name: impl Into<String>, doors: DoorMask, pattern: Grid) -> Result<Self> {
        let block = PredefinedBlock {
            name: name.into(),
            doors,
            pattern,
            doorways: STANDARD_DOORWAYS,
            player_spawn: STANDARD_PLAYER_SPAWN,
            item_spawns: STANDARD_ITEM_SPAWNS.to_vec(),
        };
        block.validate()?;
        Ok(block)
    }

    pub fn from_record(record: BlockRecord) -> Result<Self> {
        let doors = DoorMask::from_bits(record.door_mask).ok_or_else(|| {
            LevelGenError::invalid_block(&record.name, format!("door mask {} has bits above 15", record.door_mask))
        })?;
        let pattern = Grid::from_rows(&record.pattern)
            .map_err(|e| LevelGenError::invalid_block(&record.name, e.to_string()))?;

        let mut doorways = STANDARD_DOORWAYS;
        if let Some(overrides) = &record.doorways {
            for direction in Direction::ALL {
                if let Some(cells) = overrides.get(direction) {
                    doorways[direction.index()] = cells;
                }
            }
        }

        let block = PredefinedBlock {
            name: record.name,
            doors,
            pattern,
            doorways,
            player_spawn: record.player_spawn.unwrap_or(STANDARD_PLAYER_SPAWN),
            item_spawns: record.item_spawns.unwrap_or_else(|| STANDARD_ITEM_SPAWNS.to_vec()),
        };
        block.validate()?;
        Ok(block)
    }

    fn validate(&self) -> Result<()> {
        let fail = |reason: String| Err(LevelGenError::invalid_block(&self.name, reason));

        if self.pattern.width() != BLOCK_WIDTH || self.pattern.height() != BLOCK_HEIGHT {
            return fail(format!(
                "pattern is {}x{}, expected {}x{}",
                self.pattern.width(),
                self.pattern.height(),
                BLOCK_WIDTH,
                BLOCK_HEIGHT
            ));
        }
        if self.item_spawns.len() > MAX_ITEM_SPAWNS {
            return fail(format!("{} item spawns, at most {} allowed", self.item_spawns.len(), MAX_ITEM_SPAWNS));
        }
        let inside = |p: &Pos| self.pattern.in_bounds(p.x, p.y);
        if !inside(&self.player_spawn) {
            return fail(format!("player spawn {:?} outside the block", self.player_spawn));
        }
        if let Some(p) = self.item_spawns.iter().find(|p| !inside(p)) {
            return fail(format!("item spawn {:?} outside the block", p));
        }
        if let Some(p) = self.doorways.iter().flatten().find(|p| !inside(p)) {
            return fail(format!("doorway {:?} outside the block", p));
        }

        for direction in self.doors.doors() {
            let blocked = self.doorways[direction.index()]
                .iter()
                .all(|p| self.pattern.is_wall(p.x, p.y));
            if blocked {
                warn!("block `{}`: {} door has walls on every doorway cell", self.name, direction);
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doors(&self) -> DoorMask {
        self.doors
    }

    pub fn has_door(&self, direction: Direction) -> bool {
        self.doors.has(direction)
    }

    /// The two doorway cells on `direction`'s side, or `None` when the block
    /// has no door there.
    pub fn doorway_cells(&self, direction: Direction) -> Option<&[Pos; 2]> {
        self.has_door(direction).then(|| &self.doorways[direction.index()])
    }

    pub fn pattern(&self) -> &Grid {
        &self.pattern
    }

    pub fn player_spawn(&self) -> Pos {
        self.player_spawn
    }

    pub fn item_spawns(&self) -> &[Pos] {
        &self.item_spawns
    }
}

impl fmt::Display for PredefinedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.doors)
    }
}

/// On-disk form of a predefined block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockRecord {
    pub name: String,
    pub door_mask: u8,
    /// `BLOCK_HEIGHT` rows of `BLOCK_WIDTH` chars, top row first; `#` is wall.
    pub pattern: Vec<String>,
    #[serde(default)]
    pub doorways: Option<DoorwayRecord>,
    #[serde(default)]
    pub player_spawn: Option<Pos>,
    #[serde(default)]
    pub item_spawns: Option<Vec<Pos>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoorwayRecord {
    #[serde(default)]
    pub left: Option<[Pos; 2]>,
    #[serde(default)]
    pub right: Option<[Pos; 2]>,
    #[serde(default)]
    pub up: Option<[Pos; 2]>,
    #[serde(default)]
    pub down: Option<[Pos; 2]>,
}

impl DoorwayRecord {
    fn get(&self, direction: Direction) -> Option<[Pos; 2]> {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }
}
