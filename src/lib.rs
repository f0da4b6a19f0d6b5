// src/lib.rs

pub mod catalog;
pub mod error;
pub mod map;
pub mod pcg;
pub mod render;
pub mod utils;

pub use error::{LevelGenError, Result};
pub use pcg::{GeneratorConfig, Level, ProceduralGenerator};
