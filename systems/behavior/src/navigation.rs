use std::collections::VecDeque;
use std::time::Duration;

use horde_core::{TileCoord, TraversalGrid, Vec2};
use horde_system_pathfinding::{PathTicket, Pathfinder};

/// Per-enemy path following state.
///
/// Moves through `idle -> pending -> following -> idle`: a request is queued
/// when no path is held or the refresh interval elapsed, its result replaces
/// the held path, and the path is consumed waypoint by waypoint.
#[derive(Clone, Debug, Default)]
pub(crate) struct Navigation {
    path: VecDeque<TileCoord>,
    pending: Option<PathTicket>,
    refresh_at: Duration,
}

impl Navigation {
    pub(crate) fn pending(&self) -> Option<PathTicket> {
        self.pending
    }

    /// Installs the result of the outstanding request.
    ///
    /// Results for tickets other than the outstanding one are ignored.
    pub(crate) fn deliver(&mut self, ticket: PathTicket, path: Option<Vec<TileCoord>>) -> bool {
        if self.pending != Some(ticket) {
            return false;
        }
        self.pending = None;
        self.path = path
            .map(|tiles| tiles.into_iter().skip(1).collect())
            .unwrap_or_default();
        true
    }

    /// Direction toward the next waypoint, queueing a new request when due.
    ///
    /// Enemies sharing a tile with the target head straight for it. Without
    /// a usable waypoint the returned direction is zero.
    pub(crate) fn desired_direction(
        &mut self,
        position: Vec2,
        target: Vec2,
        grid: &TraversalGrid,
        pathfinder: &mut Pathfinder,
        now: Duration,
        refresh: Duration,
    ) -> Vec2 {
        let (Some(here), Some(goal)) = (grid.tile_at(position), grid.tile_at(target)) else {
            return target - position;
        };
        if here == goal {
            self.path.clear();
            return target - position;
        }

        while self.path.front() == Some(&here) {
            let _ = self.path.pop_front();
        }

        let due = self.path.is_empty() || now >= self.refresh_at;
        if self.pending.is_none() && due {
            self.pending = Some(pathfinder.request(here, goal));
            self.refresh_at = now + refresh;
        }

        self.path
            .front()
            .map_or(Vec2::ZERO, |waypoint| grid.tile_center(*waypoint) - position)
    }

    /// Drops the held path and any outstanding request.
    pub(crate) fn reset(&mut self, pathfinder: &mut Pathfinder) {
        if let Some(ticket) = self.pending.take() {
            let _ = pathfinder.cancel(ticket);
        }
        self.path.clear();
    }
}
