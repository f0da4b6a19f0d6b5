// src/pcg/pcg_connect.rs

use std::collections::HashSet;

use log::debug;
use union_find::UnionFind;

use crate::map::{Cell, Grid, Room};
use crate::pcg::{ConnectionStrategy, CorridorBrush};
use crate::utils::{GridLine, Pos};

/// A corridor to carve between two rooms, from an edge cell of each.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub from_room: usize,
    pub to_room: usize,
    pub start: Pos,
    pub end: Pos,
    pub distance: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionPlan {
    pub connections: Vec<Connection>,
    /// Rooms that found nothing to link to this pass.
    pub unconnected: Vec<usize>,
}

/// Pick which rooms to join, and through which cells. Room indices refer to `rooms`.
pub fn plan_connections(rooms: &[Room], strategy: ConnectionStrategy) -> ConnectionPlan {
    let plan = match strategy {
        ConnectionStrategy::NearestNeighbor => plan_nearest_neighbor(rooms),
        ConnectionStrategy::SpanningTree => plan_spanning_tree(rooms),
    };
    debug!(
        "plan_connections: {} rooms, {} connections, {} unconnected",
        rooms.len(),
        plan.connections.len(),
        plan.unconnected.len()
    );
    plan
}

/// Closest pair of edge cells between two rooms and their squared distance.
/// The first minimal pair in iteration order wins.
fn closest_edge_pair(a: &Room, b: &Room) -> Option<(Pos, Pos, i64)> {
    let mut best: Option<(Pos, Pos, i64)> = None;
    for c1 in a.edge_cells() {
        for c2 in b.edge_cells() {
            let d = c1.distance_sq(c2);
            if best.map_or(true, |(_, _, bd)| d < bd) {
                best = Some((*c1, *c2, d));
            }
        }
    }
    best
}

// A room is skipped for the whole pass as soon as the scan meets a room it
// is already connected to, even if a closer candidate was seen before.
fn plan_nearest_neighbor(rooms: &[Room]) -> ConnectionPlan {
    let mut plan = ConnectionPlan::default();
    let mut connected: HashSet<(usize, usize)> = HashSet::new();

    for i in 0..rooms.len() {
        let mut closest: Option<(usize, Pos, Pos, i64)> = None;
        for j in 0..rooms.len() {
            if i == j {
                continue;
            }
            if connected.contains(&(i, j)) {
                closest = None;
                break;
            }
            if let Some((c1, c2, d)) = closest_edge_pair(&rooms[i], &rooms[j]) {
                if closest.map_or(true, |(_, _, _, bd)| d < bd) {
                    closest = Some((j, c1, c2, d));
                }
            }
        }

        match closest {
            Some((j, start, end, d)) => {
                connected.insert((i, j));
                connected.insert((j, i));
                plan.connections.push(Connection {
                    from_room: i,
                    to_room: j,
                    start,
                    end,
                    distance: (d as f64).sqrt(),
                });
            }
            None if rooms.len() > 1 => plan.unconnected.push(i),
            None => {}
        }
    }
    plan
}

fn plan_spanning_tree(rooms: &[Room]) -> ConnectionPlan {
    let mut edges = Vec::new();
    for i in 0..rooms.len() {
        for j in i + 1..rooms.len() {
            if let Some((c1, c2, d)) = closest_edge_pair(&rooms[i], &rooms[j]) {
                edges.push((d, i, j, c1, c2));
            }
        }
    }
    edges.sort_by_key(|&(d, i, j, _, _)| (d, i, j));

    let mut sets: UnionFind<union_find::Size> = UnionFind::new(rooms.len());
    let mut plan = ConnectionPlan::default();
    for (d, i, j, start, end) in edges {
        // union reports whether i and j were still in separate sets
        if sets.union(i, j) {
            plan.connections.push(Connection {
                from_room: i,
                to_room: j,
                start,
                end,
                distance: (d as f64).sqrt(),
            });
        }
    }
    plan
}

/// Clear a walkable corridor from `start` to `end`. Returns the number of
/// line steps walked.
pub fn carve_corridor(grid: &mut Grid, start: Pos, end: Pos, brush: CorridorBrush) -> usize {
    let mut steps = 0;
    for cell in GridLine::new(start, end).cells() {
        match brush {
            CorridorBrush::Square => {
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        grid.set_cell_safe(cell.offset(dx, dy), Cell::Empty);
                    }
                }
            }
            CorridorBrush::Plus => {
                grid.set_cell_safe(cell, Cell::Empty);
                for neighbor in cell.neighbors4() {
                    grid.set_cell_safe(neighbor, Cell::Empty);
                }
            }
        }
        steps += 1;
    }
    steps
}
