// src/pcg/pcg_config.rs

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LevelGenError, Result};

/// Which generation pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GeneratorKind {
    /// Noise + smoothing over the whole grid, then room connection.
    CellularAutomata,
    /// Predefined blocks on a share of the slots, smoothed noise elsewhere,
    /// repeated room connection and door repair.
    #[default]
    Mixed,
    /// A walk through block doors starting from one random slot.
    BlockWalk,
}

/// Neighbourhood cleared around every cell of a carved corridor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CorridorBrush {
    /// Full 3x3 square.
    Square,
    /// Centre plus its four orthogonal neighbours.
    #[default]
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionStrategy {
    /// Each room links to its nearest room unless already linked to one
    /// it meets first. Cheap, may leave rooms disconnected.
    #[default]
    NearestNeighbor,
    /// Kruskal over the closest edge pair of every room pair: one pass
    /// connects every room.
    SpanningTree,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomataConfig {
    /// Chance, in percent, that a noise cell starts as wall.
    pub threshold_percent: f64,
    /// A cell becomes wall when more than this many of its 3x3 cells are walls.
    pub min_neighbors: u32,
    pub smooth_steps: u32,
}

impl Default for AutomataConfig {
    fn default() -> Self {
        AutomataConfig {
            threshold_percent: 45.0,
            min_neighbors: 4,
            smooth_steps: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredefinedConfig {
    /// Share of block slots, in percent, that receive a predefined block.
    pub rate_percent: f64,
    /// Directory or JSON file with block records; the builtin catalog is used when unset.
    pub catalog_path: Option<PathBuf>,
}

impl Default for PredefinedConfig {
    fn default() -> Self {
        PredefinedConfig {
            rate_percent: 40.0,
            catalog_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub passes: u32,
    pub brush: CorridorBrush,
    pub strategy: ConnectionStrategy,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            passes: 5,
            brush: CorridorBrush::Plus,
            strategy: ConnectionStrategy::NearestNeighbor,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub item_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub kind: GeneratorKind,
    pub width: i32,
    pub height: i32,
    /// Fixed seed for reproducible runs; OS entropy when unset.
    pub seed: Option<u64>,
    pub automata: AutomataConfig,
    pub predefined: PredefinedConfig,
    pub connection: ConnectionConfig,
    pub spawns: SpawnConfig,
    pub force_borders: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            kind: GeneratorKind::Mixed,
            width: 96,
            height: 64,
            seed: None,
            automata: AutomataConfig::default(),
            predefined: PredefinedConfig::default(),
            connection: ConnectionConfig::default(),
            spawns: SpawnConfig { item_count: 8 },
            force_borders: true,
        }
    }
}

impl GeneratorConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(LevelGenError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Whether this configuration places predefined blocks at all.
    pub fn requires_catalog(&self) -> bool {
        match self.kind {
            GeneratorKind::CellularAutomata => false,
            GeneratorKind::Mixed => self.predefined.rate_percent > 0.0,
            GeneratorKind::BlockWalk => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GeneratorConfig::from_json_str(
            r#"{ "kind": "CellularAutomata", "width": 24, "height": 16, "automata": { "min_neighbors": 5 } }"#,
        )
        .unwrap();
        assert_eq!(config.kind, GeneratorKind::CellularAutomata);
        assert_eq!(config.width, 24);
        assert_eq!(config.automata.min_neighbors, 5);
        assert_eq!(config.automata.smooth_steps, 4);
        assert_eq!(config.connection.passes, 5);
        assert!(config.force_borders);
        assert!(!config.requires_catalog());
    }

    #[test]
    fn test_validate_dimensions() {
        let mut config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        config.height = 0;
        assert!(matches!(
            config.validate(),
            Err(LevelGenError::InvalidDimensions { height: 0, .. })
        ));
    }

    #[test]
    fn test_requires_catalog() {
        let mut config = GeneratorConfig::default();
        assert!(config.requires_catalog());
        config.predefined.rate_percent = 0.0;
        assert!(!config.requires_catalog());
        config.kind = GeneratorKind::BlockWalk;
        assert!(config.requires_catalog());
    }
}
