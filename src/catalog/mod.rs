// src/catalog/mod.rs
mod catalog;
mod predefined_block;

pub use self::catalog::BlockCatalog;
pub use self::predefined_block::{
    BlockRecord, DoorwayRecord, PredefinedBlock, BLOCK_HEIGHT, BLOCK_WIDTH, MAX_ITEM_SPAWNS,
    STANDARD_DOORWAYS, STANDARD_ITEM_SPAWNS, STANDARD_PLAYER_SPAWN,
};
