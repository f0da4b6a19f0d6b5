#![warn(non_snake_case)]
//! # rust_levelgen Entry Point
//!
//! Generates one platformer level from a JSON configuration, prints it as text and
//! optionally writes a PNG of it.
//!
//! Usage: `rust_levelgen [config.json] [out.png]`. Without a config file the defaults
//! are used; `RUST_LOG` controls log output.
//!
//! ## License
//! Licensed under the MIT License.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use rust_levelgen::catalog::BlockCatalog;
use rust_levelgen::map::paint_rooms;
use rust_levelgen::pcg::{GeneratorConfig, ProceduralGenerator};
use rust_levelgen::render::{AsciiPainter, PngPainter, TilePainter};

const PNG_CELL_SIZE: u32 = 8;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    info!("rust_levelgen starting...");

    let args: Vec<String> = std::env::args().collect();
    let config = match args.get(1) {
        Some(path) => GeneratorConfig::load(&PathBuf::from(path))?,
        None => GeneratorConfig::default(),
    };
    let png_path = args.get(2).map(PathBuf::from);

    let catalog = match &config.predefined.catalog_path {
        Some(path) => BlockCatalog::load(path)?,
        None => BlockCatalog::builtin()?,
    };
    info!("{} predefined blocks in catalog", catalog.len());

    let seed = config.seed;
    let mut generator = ProceduralGenerator::new(config, Arc::new(catalog));
    let mut level = generator.generate()?;

    let mut ascii = AsciiPainter::new();
    ascii.paint(&level.grid, level.grid.rect())?;
    print!("{}", ascii.as_str());

    if let Some(path) = png_path {
        // rooms are tagged on a copy so the picture shows each room in its own colour
        let mut painted = level.grid.clone();
        paint_rooms(&mut painted, &level.rooms)?;
        let mut png = PngPainter::new(PNG_CELL_SIZE);
        png.paint(&painted, painted.rect())?;
        png.save(&path)?;
    }

    for issue in &level.issues {
        warn!("{}", issue);
    }
    match level.player_spawn {
        Some(spawn) => info!("player spawn at ({}, {})", spawn.x, spawn.y),
        None => warn!("level has no player spawn"),
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_os_rng(),
    };
    for (i, item) in level.item_spawns(&mut rng).enumerate() {
        info!("item spawn {} at ({}, {})", i, item.x, item.y);
    }

    info!("rust_levelgen done.");
    Ok(())
}
