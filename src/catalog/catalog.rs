// src/catalog/catalog.rs

use std::fs;
use std::path::Path;

use include_dir::{include_dir, Dir};
use log::{debug, info};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::catalog::{BlockRecord, PredefinedBlock};
use crate::error::Result;
use crate::map::DoorMask;

static BUILTIN_BLOCKS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets/blocks");

/// The read-only set of predefined blocks. Loaded once, then shared between
/// generation runs (wrap it in an `Arc`).
#[derive(Debug, Clone, Default)]
pub struct BlockCatalog {
    blocks: Vec<PredefinedBlock>,
}

impl BlockCatalog {
    pub fn new(blocks: Vec<PredefinedBlock>) -> Self {
        BlockCatalog { blocks }
    }

    /// The catalog compiled into the crate: one block for each of the 16 door masks.
    pub fn builtin() -> Result<Self> {
        let mut files: Vec<_> = BUILTIN_BLOCKS
            .files()
            .filter(|f| f.path().extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort_by_key(|f| f.path());

        let mut blocks = Vec::with_capacity(files.len());
        for file in files {
            let record: BlockRecord = serde_json::from_slice(file.contents())?;
            blocks.push(PredefinedBlock::from_record(record)?);
        }
        debug!("builtin catalog: {} blocks", blocks.len());
        Ok(BlockCatalog::new(blocks))
    }

    /// Parse either a single record or an array of records.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let records: Vec<BlockRecord> = if value.is_array() {
            serde_json::from_value(value)?
        } else {
            vec![serde_json::from_value(value)?]
        };
        let blocks = records
            .into_iter()
            .map(PredefinedBlock::from_record)
            .collect::<Result<Vec<_>>>()?;
        Ok(BlockCatalog::new(blocks))
    }

    /// Load a JSON file, or every `*.json` file of a directory (sorted by name).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            let catalog = Self::from_json_str(&fs::read_to_string(path)?)?;
            info!("Loaded {} predefined blocks from {}", catalog.len(), path.display());
            return Ok(catalog);
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry_path = entry?.path();
            if entry_path.extension().is_some_and(|ext| ext == "json") {
                paths.push(entry_path);
            }
        }
        paths.sort();

        let mut blocks = Vec::new();
        for file in paths {
            blocks.extend(Self::from_json_str(&fs::read_to_string(&file)?)?.blocks);
        }
        info!("Loaded {} predefined blocks from {}", blocks.len(), path.display());
        Ok(BlockCatalog::new(blocks))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PredefinedBlock> {
        self.blocks.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PredefinedBlock> {
        self.blocks.iter()
    }

    /// Indices of blocks whose door mask has every `require_present` door and
    /// none of the `require_absent` ones.
    pub fn matching(&self, require_present: DoorMask, require_absent: DoorMask) -> Vec<usize> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.doors().satisfies(require_present, require_absent))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn pick_matching<R: Rng>(
        &self,
        require_present: DoorMask,
        require_absent: DoorMask,
        rng: &mut R,
    ) -> Option<usize> {
        self.matching(require_present, require_absent).choose(rng).copied()
    }

    /// First block whose door mask is exactly `mask`.
    pub fn find_exact(&self, mask: DoorMask) -> Option<usize> {
        self.blocks.iter().position(|b| b.doors() == mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Direction;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_builtin_covers_every_mask() {
        let catalog = BlockCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 16);
        for bits in 0..16u8 {
            let mask = DoorMask::from_bits(bits).unwrap();
            let index = catalog.find_exact(mask).expect("mask missing from builtin catalog");
            let block = catalog.get(index).unwrap();
            // every door opening is actually open in the pattern
            for direction in mask.doors() {
                let cells = block.doorway_cells(direction).unwrap();
                assert!(cells.iter().all(|p| !block.pattern().is_wall(p.x, p.y)));
            }
            // spawn points stand on open cells
            let spawn = block.player_spawn();
            assert!(!block.pattern().is_wall(spawn.x, spawn.y));
            for p in block.item_spawns() {
                assert!(!block.pattern().is_wall(p.x, p.y));
            }
        }
    }

    #[test]
    fn test_matching_respects_present_and_absent() {
        let catalog = BlockCatalog::builtin().unwrap();
        let left = DoorMask::NONE.with(Direction::Left);
        let up_or_down = DoorMask::NONE.with(Direction::Up).with(Direction::Down);
        let found = catalog.matching(left, up_or_down);
        assert_eq!(found.len(), 2); // L and LR
        for index in found {
            let doors = catalog.get(index).unwrap().doors();
            assert!(doors.has(Direction::Left));
            assert!(!doors.has(Direction::Up) && !doors.has(Direction::Down));
        }
        assert!(catalog.matching(DoorMask::ALL, DoorMask::NONE.with(Direction::Left)).is_empty());
    }

    #[test]
    fn test_pick_matching_empty_is_none() {
        let catalog = BlockCatalog::default();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(catalog.is_empty());
        assert_eq!(catalog.pick_matching(DoorMask::NONE, DoorMask::NONE, &mut rng), None);
    }

    #[test]
    fn test_from_json_array() {
        let row = |s: &str| format!("\"{}\"", s);
        let pattern = [
            "############", "#..........#", "#..........#", "#..........#",
            "#..........#", "#..........#", "#..........#", "############",
        ]
        .iter()
        .map(|s| row(s))
        .collect::<Vec<_>>()
        .join(",");
        let json = format!(
            "[{{\"name\":\"a\",\"door_mask\":0,\"pattern\":[{p}]}},{{\"name\":\"b\",\"door_mask\":0,\"pattern\":[{p}]}}]",
            p = pattern
        );
        let catalog = BlockCatalog::from_json_str(&json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find_exact(DoorMask::NONE), Some(0));
    }
}
