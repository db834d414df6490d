#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic eight-directional A* over the traversal grid.
//!
//! [`find_path`] solves a single query synchronously. [`Pathfinder`] queues
//! queries behind tickets and resolves a bounded number of them per call so
//! the search cost can be spread across ticks.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use horde_core::{TileCoord, TraversalGrid, NEIGHBOR_OFFSETS};

const ORTHOGONAL_STEP: u32 = 10;
const DIAGONAL_STEP: u32 = 14;

/// Finds the cheapest route between two tiles.
///
/// The returned path starts with `start` and ends with `goal`. Entering a tile
/// costs its traversal cost scaled by the step length, and diagonal steps may
/// not cut past blocked corners. Returns `None` when both tiles coincide,
/// either tile cannot be stood on, or the goal is unreachable.
#[must_use]
pub fn find_path(grid: &TraversalGrid, start: TileCoord, goal: TileCoord) -> Option<Vec<TileCoord>> {
    if start == goal || !grid.is_walkable(start) || !grid.is_walkable(goal) {
        return None;
    }

    let start_index = grid.index(start)?;
    let goal_index = grid.index(goal)?;
    let mut best = vec![u32::MAX; grid.len()];
    let mut parent = vec![usize::MAX; grid.len()];
    let mut closed = vec![false; grid.len()];
    let mut open = BinaryHeap::new();
    let mut sequence = 0_u64;

    best[start_index] = 0;
    let start_h = heuristic(start, goal);
    open.push(Reverse((start_h, start_h, sequence, start_index)));

    while let Some(Reverse((_, _, _, index))) = open.pop() {
        if closed[index] {
            continue;
        }
        closed[index] = true;
        if index == goal_index {
            return Some(reconstruct(grid, &parent, goal_index));
        }

        let tile = grid.tile_from_index(index)?;
        let cost_so_far = best[index];
        for delta in NEIGHBOR_OFFSETS {
            let Some(next) = grid.step(tile, delta) else {
                continue;
            };
            let Some(next_index) = grid.index(next) else {
                continue;
            };
            if closed[next_index] {
                continue;
            }
            let Some(entering) = grid.traversal(next).cost() else {
                continue;
            };

            let step = if delta.0 != 0 && delta.1 != 0 {
                DIAGONAL_STEP
            } else {
                ORTHOGONAL_STEP
            };
            let tentative = cost_so_far.saturating_add(entering * step);
            if tentative >= best[next_index] {
                continue;
            }

            best[next_index] = tentative;
            parent[next_index] = index;
            sequence += 1;
            let h = heuristic(next, goal);
            open.push(Reverse((tentative.saturating_add(h), h, sequence, next_index)));
        }
    }

    log::debug!(
        "no route from ({}, {}) to ({}, {})",
        start.column(),
        start.row(),
        goal.column(),
        goal.row()
    );
    None
}

/// Octile distance scaled to match the step costs of free tiles.
fn heuristic(from: TileCoord, to: TileCoord) -> u32 {
    let columns = from.column().abs_diff(to.column());
    let rows = from.row().abs_diff(to.row());
    let (long, short) = if columns > rows {
        (columns, rows)
    } else {
        (rows, columns)
    };
    ORTHOGONAL_STEP * long + (DIAGONAL_STEP - ORTHOGONAL_STEP) * short
}

fn reconstruct(grid: &TraversalGrid, parent: &[usize], goal_index: usize) -> Vec<TileCoord> {
    let mut path = Vec::new();
    let mut cursor = goal_index;
    loop {
        if let Some(tile) = grid.tile_from_index(cursor) {
            path.push(tile);
        }
        match parent.get(cursor) {
            Some(&previous) if previous != usize::MAX => cursor = previous,
            _ => break,
        }
    }
    path.reverse();
    path
}

/// Handle identifying a queued path request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathTicket(u64);

impl PathTicket {
    /// Retrieves the numeric representation of the ticket.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Outcome of a queued path request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathResult {
    /// Ticket returned when the request was queued.
    pub ticket: PathTicket,
    /// Tile the path starts from.
    pub start: TileCoord,
    /// Tile the path leads to.
    pub goal: TileCoord,
    /// Tiles from start to goal inclusive, or `None` when no route exists.
    pub path: Option<Vec<TileCoord>>,
}

#[derive(Clone, Copy, Debug)]
struct PathRequest {
    ticket: PathTicket,
    start: TileCoord,
    goal: TileCoord,
}

/// Queue of path requests resolved in arrival order under a per-call budget.
#[derive(Clone, Debug)]
pub struct Pathfinder {
    budget: usize,
    next_ticket: u64,
    queue: VecDeque<PathRequest>,
}

impl Pathfinder {
    /// Creates a pathfinder resolving at most `budget` requests per call.
    ///
    /// A zero budget is raised to one so queued requests always drain.
    #[must_use]
    pub fn new(budget: usize) -> Self {
        Self {
            budget: budget.max(1),
            next_ticket: 0,
            queue: VecDeque::new(),
        }
    }

    /// Queues a request and returns the ticket its result will carry.
    pub fn request(&mut self, start: TileCoord, goal: TileCoord) -> PathTicket {
        let ticket = PathTicket(self.next_ticket);
        self.next_ticket += 1;
        self.queue.push_back(PathRequest {
            ticket,
            start,
            goal,
        });
        ticket
    }

    /// Drops a queued request. Returns `true` when it was still queued.
    pub fn cancel(&mut self, ticket: PathTicket) -> bool {
        let before = self.queue.len();
        self.queue.retain(|request| request.ticket != ticket);
        before != self.queue.len()
    }

    /// Number of queued requests.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drops every queued request.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Resolves up to the budgeted number of queued requests, oldest first.
    pub fn calculate(&mut self, grid: &TraversalGrid) -> Vec<PathResult> {
        let count = self.budget.min(self.queue.len());
        self.queue
            .drain(..count)
            .map(|request| PathResult {
                ticket: request.ticket,
                start: request.start,
                goal: request.goal,
                path: find_path(grid, request.start, request.goal),
            })
            .collect()
    }
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new(8)
    }
}
