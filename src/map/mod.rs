// src/map/mod.rs
pub mod cell;
pub mod direction;
pub mod grid;
pub mod room;

pub use cell::{Cell, CellKind, DisplayTag};
pub use direction::{Direction, DoorMask};
pub use grid::Grid;
pub use room::{paint_rooms, Room};
