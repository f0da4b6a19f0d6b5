// src/map/cell.rs

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A colour-like display attribute attached to empty cells for debug painting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayTag {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl DisplayTag {
    /// Reserved for marking the starter cell of every room.
    pub const ROOM_STARTER: DisplayTag = DisplayTag::new(255, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// A random, fully saturated-ish colour.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let hue = rng.random_range(0.0..360.0);
        let saturation = rng.random_range(0.5..=1.0);
        let value = rng.random_range(0.6..=1.0);
        Self::from_hsv(hue, saturation, value)
    }

    fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        let c = value * saturation;
        let h = (hue % 360.0) / 60.0;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = value - c;
        let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::new(to_byte(r), to_byte(g), to_byte(b))
    }

    pub fn to_rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// The wall/empty classification every cell reduces to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Empty,
    Wall,
}

/// One grid cell. Tagged cells are walkable (they count as empty).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Wall,
    Tagged(DisplayTag),
}

impl Cell {
    pub fn wall_or_empty(wall: bool) -> Self {
        if wall {
            Cell::Wall
        } else {
            Cell::Empty
        }
    }

    pub fn kind(&self) -> CellKind {
        match self {
            Cell::Wall => CellKind::Wall,
            Cell::Empty | Cell::Tagged(_) => CellKind::Empty,
        }
    }

    pub fn is_wall(&self) -> bool {
        matches!(self, Cell::Wall)
    }

    pub fn tag(&self) -> Option<DisplayTag> {
        match self {
            Cell::Tagged(tag) => Some(*tag),
            _ => None,
        }
    }
}
