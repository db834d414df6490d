#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared direction field that steers every enemy toward a common target.
//!
//! The field is rebuilt with a reverse breadth-first search from the target
//! tiles. Each discovered tile stores the unit direction toward the tile that
//! discovered it, so following the vectors from any reached tile leads to a
//! target. Tiles the search never reached hold a zero vector.

use std::collections::VecDeque;

use horde_core::{TileCoord, TraversalGrid, Vec2, NEIGHBOR_OFFSETS};

/// Dense grid of unit steering directions.
#[derive(Clone, Debug)]
pub struct FlowField {
    columns: u32,
    rows: u32,
    tile_length: f32,
    vectors: Vec<Vec2>,
    reached: Vec<bool>,
    target: Option<Vec2>,
    epsilon: f32,
}

impl FlowField {
    /// Creates an empty field that regenerates once its target moves further
    /// than `epsilon` world units.
    #[must_use]
    pub fn new(epsilon: f32) -> Self {
        Self {
            columns: 0,
            rows: 0,
            tile_length: 1.0,
            vectors: Vec::new(),
            reached: Vec::new(),
            target: None,
            epsilon: epsilon.max(0.0),
        }
    }

    /// Target position the field was last generated for.
    #[must_use]
    pub const fn target(&self) -> Option<Vec2> {
        self.target
    }

    /// Rebuilds the field toward a single world position.
    pub fn generate(&mut self, target: Vec2, grid: &TraversalGrid) {
        self.generate_from(&[target], grid);
        self.target = Some(target);
    }

    /// Rebuilds the field toward several world positions at once.
    ///
    /// Targets off the map or on blocked tiles are skipped. The remembered
    /// target is cleared, so the next [`FlowField::refresh`] always rebuilds.
    pub fn generate_from(&mut self, targets: &[Vec2], grid: &TraversalGrid) {
        self.columns = grid.columns();
        self.rows = grid.rows();
        self.tile_length = grid.tile_length();
        self.vectors.clear();
        self.vectors.resize(grid.len(), Vec2::ZERO);
        self.reached.clear();
        self.reached.resize(grid.len(), false);
        self.target = None;

        let mut queue = VecDeque::new();
        for target in targets {
            let Some(tile) = grid.tile_at(*target).filter(|tile| grid.is_walkable(*tile)) else {
                continue;
            };
            let Some(index) = grid.index(tile) else {
                continue;
            };
            if self.reached[index] {
                continue;
            }
            self.reached[index] = true;
            queue.push_back(tile);
        }

        while let Some(tile) = queue.pop_front() {
            for delta in NEIGHBOR_OFFSETS {
                let Some(next) = grid.step(tile, delta) else {
                    continue;
                };
                let Some(index) = grid.index(next) else {
                    continue;
                };
                if self.reached[index] {
                    continue;
                }

                self.reached[index] = true;
                self.vectors[index] = Vec2::new(-delta.0 as f32, -delta.1 as f32).normalize();
                queue.push_back(next);
            }
        }

        log::debug!(
            "flow field rebuilt over {}x{} tiles from {} target(s)",
            self.columns,
            self.rows,
            targets.len()
        );
    }

    /// Rebuilds the field when the target moved further than the configured
    /// epsilon or the grid's shape changed. Returns `true` when it rebuilt.
    pub fn refresh(&mut self, target: Vec2, grid: &TraversalGrid) -> bool {
        let same_shape = self.columns == grid.columns()
            && self.rows == grid.rows()
            && self.tile_length == grid.tile_length()
            && self.vectors.len() == grid.len();
        let settled = self
            .target
            .map_or(false, |previous| previous.distance(target) <= self.epsilon);
        if same_shape && settled {
            return false;
        }

        self.generate(target, grid);
        true
    }

    /// Steering direction at a world position. Zero off the map.
    #[must_use]
    pub fn vector_at(&self, position: Vec2) -> Vec2 {
        self.tile_at(position)
            .map_or(Vec2::ZERO, |tile| self.vector_at_tile(tile))
    }

    /// Steering direction stored for a tile. Zero outside the field.
    #[must_use]
    pub fn vector_at_tile(&self, tile: TileCoord) -> Vec2 {
        self.index(tile)
            .and_then(|index| self.vectors.get(index).copied())
            .unwrap_or(Vec2::ZERO)
    }

    /// Reports whether the last rebuild reached the tile.
    #[must_use]
    pub fn is_reachable(&self, tile: TileCoord) -> bool {
        self.index(tile)
            .and_then(|index| self.reached.get(index).copied())
            .unwrap_or(false)
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        if tile.column() >= self.columns || tile.row() >= self.rows {
            return None;
        }
        Some(tile.row() as usize * self.columns as usize + tile.column() as usize)
    }

    fn tile_at(&self, position: Vec2) -> Option<TileCoord> {
        if !(position.x >= 0.0 && position.y >= 0.0) {
            return None;
        }
        let column = (position.x / self.tile_length).floor();
        let row = (position.y / self.tile_length).floor();
        if column >= self.columns as f32 || row >= self.rows as f32 {
            return None;
        }
        Some(TileCoord::new(column as u32, row as u32))
    }
}

impl Default for FlowField {
    fn default() -> Self {
        Self::new(4.0)
    }
}
