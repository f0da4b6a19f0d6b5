// src/map/direction.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four sides of a block. Each carries a distinct bit so that a
/// set of doors collapses into a [`DoorMask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

    pub const fn bit(self) -> u8 {
        match self {
            Direction::Left => 1,  // 0001
            Direction::Right => 2, // 0010
            Direction::Up => 4,    // 0100
            Direction::Down => 8,  // 1000
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Cell offset one step in this direction (`y` grows upwards).
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
        }
    }

    /// Index into per-direction arrays, following `ALL`.
    pub const fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Up => 2,
            Direction::Down => 3,
        }
    }

    /// The dominant direction of the vector `(dx, dy)`; vertical wins ties.
    pub fn dominant(dx: i32, dy: i32) -> Direction {
        if dx.abs() > dy.abs() {
            if dx > 0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if dy > 0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Left => "Left",
            Direction::Right => "Right",
            Direction::Up => "Up",
            Direction::Down => "Down",
        };
        f.write_str(name)
    }
}

/// A 4-bit set of doors (`Left=1, Right=2, Up=4, Down=8`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DoorMask(u8);

impl DoorMask {
    pub const NONE: DoorMask = DoorMask(0);
    pub const ALL: DoorMask = DoorMask(0b1111);

    /// Returns `None` for values with bits above the four door bits.
    pub fn from_bits(bits: u8) -> Option<Self> {
        (bits <= Self::ALL.0).then_some(DoorMask(bits))
    }

    pub fn from_doors(doors: &[Direction]) -> Self {
        doors.iter().fold(DoorMask::NONE, |mask, &d| mask.with(d))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn has(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    pub fn with(self, direction: Direction) -> Self {
        DoorMask(self.0 | direction.bit())
    }

    pub fn without(self, direction: Direction) -> Self {
        DoorMask(self.0 & !direction.bit())
    }

    pub fn union(self, other: DoorMask) -> Self {
        DoorMask(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `(mask & present) == present && (mask & absent) == 0`
    pub fn satisfies(self, require_present: DoorMask, require_absent: DoorMask) -> bool {
        self.0 & require_present.0 == require_present.0 && self.0 & require_absent.0 == 0
    }

    pub fn doors(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.has(*d))
    }
}

impl fmt::Display for DoorMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |d: Direction, c: char| if self.has(d) { c } else { '-' };
        write!(
            f,
            "{}{}{}{}",
            flag(Direction::Left, 'L'),
            flag(Direction::Right, 'R'),
            flag(Direction::Up, 'U'),
            flag(Direction::Down, 'D')
        )
    }
}
