// src/map/room.rs

use std::collections::{BTreeSet, HashSet};

use log::debug;
use rand::Rng;

use crate::error::Result;
use crate::map::{Cell, DisplayTag, Grid};
use crate::utils::{Pos, Rect};

/// How many random tags to draw before accepting a duplicate.
const TAG_ATTEMPTS: usize = 5;

/// A 4-connected component of non-wall cells.
///
/// Rooms are snapshots: they are rebuilt from scratch by every call to
/// [`Grid::find_rooms`] and carry no identity across calls.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    cells: BTreeSet<Pos>,
    edge_cells: BTreeSet<Pos>,
    starter_cell: Pos,
    tag: DisplayTag,
}

impl Room {
    fn new(starter_cell: Pos, cells: BTreeSet<Pos>, tag: DisplayTag) -> Self {
        let edge_cells = cells
            .iter()
            .copied()
            .filter(|cell| cell.neighbors4().iter().any(|n| !cells.contains(n)))
            .collect();
        Room {
            cells,
            edge_cells,
            starter_cell,
            tag,
        }
    }

    pub fn cells(&self) -> &BTreeSet<Pos> {
        &self.cells
    }

    /// Cells with at least one orthogonal neighbour outside the room.
    pub fn edge_cells(&self) -> &BTreeSet<Pos> {
        &self.edge_cells
    }

    pub fn starter_cell(&self) -> Pos {
        self.starter_cell
    }

    pub fn tag(&self) -> DisplayTag {
        self.tag
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }
}

impl Grid {
    /// Extract every connected non-wall region starting inside `area`.
    ///
    /// The area is scanned row-major; each unclaimed non-wall cell seeds a
    /// stack-based flood fill that claims its whole component. Components
    /// that start in `area` may extend beyond it.
    pub fn find_rooms<R: Rng>(&self, area: Rect, rng: &mut R) -> Vec<Room> {
        let mut rooms = Vec::new();
        let mut claimed: HashSet<Pos> = HashSet::new();
        let mut used_tags: HashSet<DisplayTag> = HashSet::from([DisplayTag::ROOM_STARTER]);

        for pos in area.positions() {
            if self.is_wall(pos.x, pos.y) || claimed.contains(&pos) {
                continue;
            }
            let cells = self.flood_fill(pos);
            claimed.extend(cells.iter().copied());
            let tag = pick_unused_tag(&mut used_tags, rng);
            rooms.push(Room::new(pos, cells, tag));
        }

        debug!("find_rooms: {} rooms in {:?}", rooms.len(), area);
        rooms
    }

    fn flood_fill(&self, start: Pos) -> BTreeSet<Pos> {
        let mut cells = BTreeSet::new();
        let mut stack = vec![start];
        while let Some(cell) = stack.pop() {
            if self.is_wall(cell.x, cell.y) || !cells.insert(cell) {
                continue;
            }
            stack.extend(cell.neighbors4());
        }
        cells
    }
}

fn pick_unused_tag<R: Rng>(used: &mut HashSet<DisplayTag>, rng: &mut R) -> DisplayTag {
    let mut tag = DisplayTag::random(rng);
    for _ in 1..TAG_ATTEMPTS {
        if !used.contains(&tag) {
            break;
        }
        tag = DisplayTag::random(rng);
    }
    used.insert(tag);
    tag
}

/// Tag every room for debug display: starter cells get the reserved starter
/// tag first, so the later per-room tag cannot overwrite them.
pub fn paint_rooms(grid: &mut Grid, rooms: &[Room]) -> Result<()> {
    for room in rooms {
        let start = room.starter_cell();
        grid.set_cell(start.x, start.y, Cell::Tagged(DisplayTag::ROOM_STARTER))?;
        for cell in room.cells() {
            grid.set_cell(cell.x, cell.y, Cell::Tagged(room.tag()))?;
        }
    }
    Ok(())
}
