// src/utils/geometry.rs

use serde::{Deserialize, Serialize};

use crate::map::Direction;

/// An integer cell coordinate. `y` grows upwards, so `Direction::Down` is `y - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Pos) -> f64 {
        (self.distance_sq(other) as f64).sqrt()
    }

    /// Squared euclidean distance, exact in integers.
    pub fn distance_sq(&self, other: &Pos) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    pub fn step(&self, direction: Direction) -> Pos {
        let (dx, dy) = direction.offset();
        Pos::new(self.x + dx, self.y + dy)
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Pos {
        Pos::new(self.x + dx, self.y + dy)
    }

    /// The four orthogonal neighbours, in `Direction::ALL` order.
    pub fn neighbors4(&self) -> [Pos; 4] {
        Direction::ALL.map(|d| self.step(d))
    }
}

impl From<(i32, i32)> for Pos {
    fn from((x, y): (i32, i32)) -> Self {
        Pos::new(x, y)
    }
}

/// An axis-aligned cell rectangle: `x..x + width` by `y..y + height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn x_max(&self) -> i32 {
        self.x + self.width
    }

    pub fn y_max(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width as usize * self.height as usize
        }
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x >= self.x && pos.x < self.x_max() && pos.y >= self.y && pos.y < self.y_max()
    }

    /// True if `other` lies entirely inside `self`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.is_empty()
            || (other.x >= self.x
                && other.y >= self.y
                && other.x_max() <= self.x_max()
                && other.y_max() <= self.y_max())
    }

    /// Every position inside the rectangle, row-major from the bottom row.
    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        let Rect { x, y, width, height } = *self;
        (y..y + height.max(0)).flat_map(move |py| (x..x + width.max(0)).map(move |px| Pos::new(px, py)))
    }
}

/// A straight run of cells between two grid positions, walked with the
/// integer-error (Bresenham) line algorithm. Works in every octant and
/// always yields both endpoints.
#[derive(Debug, Clone, Copy)]
pub struct GridLine {
    pub start: Pos,
    pub end: Pos,
}

impl GridLine {
    pub fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub fn cells(&self) -> GridLineCells {
        let dx = (self.end.x - self.start.x).abs();
        let dy = -(self.end.y - self.start.y).abs();
        GridLineCells {
            current: self.start,
            end: self.end,
            dx,
            dy,
            sx: (self.end.x - self.start.x).signum(),
            sy: (self.end.y - self.start.y).signum(),
            error: dx + dy,
            remaining: dx.max(-dy) + 1,
        }
    }
}

pub struct GridLineCells {
    current: Pos,
    end: Pos,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    error: i32,
    remaining: i32,
}

impl Iterator for GridLineCells {
    type Item = Pos;

    fn next(&mut self) -> Option<Pos> {
        if self.remaining <= 0 {
            return None;
        }
        self.remaining -= 1;
        let cell = self.current;
        if cell == self.end {
            self.remaining = 0;
            return Some(cell);
        }
        let doubled = 2 * self.error;
        if doubled >= self.dy {
            self.error += self.dy;
            self.current.x += self.sx;
        }
        if doubled <= self.dx {
            self.error += self.dx;
            self.current.y += self.sy;
        }
        Some(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_distance() {
        let a = Pos::new(0, 0);
        let b = Pos::new(3, 4);
        assert_approx_eq!(a.distance_to(&b), 5.0);
        assert_eq!(a.distance_sq(&b), 25);
    }

    #[test]
    fn test_step_is_y_up() {
        let p = Pos::new(5, 5);
        assert_eq!(p.step(Direction::Up), Pos::new(5, 6));
        assert_eq!(p.step(Direction::Down), Pos::new(5, 4));
        assert_eq!(p.step(Direction::Left), Pos::new(4, 5));
        assert_eq!(p.step(Direction::Right), Pos::new(6, 5));
    }

    #[test]
    fn test_rect_positions_row_major() {
        let r = Rect::new(1, 2, 2, 2);
        let cells: Vec<Pos> = r.positions().collect();
        assert_eq!(
            cells,
            vec![Pos::new(1, 2), Pos::new(2, 2), Pos::new(1, 3), Pos::new(2, 3)]
        );
        assert_eq!(r.area(), 4);
        assert!(Rect::new(0, 0, 10, 10).contains_rect(&r));
        assert!(!r.contains(Pos::new(3, 2)));
    }

    #[test]
    fn test_rect_area_beyond_i32() {
        assert_eq!(Rect::new(0, 0, 70000, 70000).area(), 4_900_000_000);
        assert_eq!(Rect::new(0, 0, -2, 5).area(), 0);
    }

    #[test]
    fn test_line_reaches_endpoint_in_every_direction() {
        let start = Pos::new(10, 10);
        for end in [
            Pos::new(17, 13),
            Pos::new(3, 12),
            Pos::new(11, 0),
            Pos::new(2, 2),
            Pos::new(10, 10),
        ] {
            let cells: Vec<Pos> = GridLine::new(start, end).cells().collect();
            assert_eq!(cells.first(), Some(&start));
            assert_eq!(cells.last(), Some(&end));
            let expected = (end.x - start.x).abs().max((end.y - start.y).abs()) + 1;
            assert_eq!(cells.len() as i32, expected);
            // consecutive cells touch (8-connected)
            for pair in cells.windows(2) {
                assert!((pair[0].x - pair[1].x).abs() <= 1);
                assert!((pair[0].y - pair[1].y).abs() <= 1);
            }
        }
    }
}
