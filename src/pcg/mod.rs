// src/pcg/mod.rs
pub mod pcg_automata;
pub mod pcg_blocks;
pub mod pcg_config;
pub mod pcg_connect;
pub mod pcg_generator;
pub mod pcg_passage;
pub mod pcg_placement;
pub mod pcg_spawn;

pub use pcg_automata::{smooth, smooth_steps};
pub use pcg_blocks::{Block, BlockGrid};
pub use pcg_config::{
    AutomataConfig, ConnectionConfig, ConnectionStrategy, CorridorBrush, GeneratorConfig, GeneratorKind,
    PredefinedConfig, SpawnConfig,
};
pub use pcg_connect::{carve_corridor, plan_connections, Connection, ConnectionPlan};
pub use pcg_generator::{GenerationIssue, GenerationStats, Level, ProceduralGenerator};
pub use pcg_passage::{find_stuck_blocks, has_passage, PassageChecker};
pub use pcg_placement::{wall_in, BlockPlacer, SlotConstraints};
pub use pcg_spawn::{block_player_spawn, largest_room_starter, slot_player_spawn, ItemSpawns};
