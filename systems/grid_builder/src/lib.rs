#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Builds the traversal grid shared by every navigation system from a
//! layered tile map.
//!
//! A tile is blocked when any obstacle layer has a tile at its position,
//! near-wall when any of its eight neighbours is blocked, and free otherwise.

use horde_core::{TileCoord, Traversal, TraversalGrid, NEIGHBOR_OFFSETS};
use thiserror::Error;

/// Single named layer of a tile map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileLayer {
    name: String,
    columns: u32,
    rows: u32,
    tiles: Vec<bool>,
}

impl TileLayer {
    /// Creates a layer from row-major tile presence flags.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: u32, rows: u32, tiles: Vec<bool>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
            tiles,
        }
    }

    /// Creates a layer without any tiles.
    #[must_use]
    pub fn empty(name: impl Into<String>, columns: u32, rows: u32) -> Self {
        let count = (columns as usize).saturating_mul(rows as usize);
        Self::new(name, columns, rows, vec![false; count])
    }

    /// Name of the layer.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Places or removes a tile. Positions outside the layer are ignored.
    pub fn set(&mut self, tile: TileCoord, present: bool) {
        if tile.column() >= self.columns || tile.row() >= self.rows {
            return;
        }
        let index = tile.row() as usize * self.columns as usize + tile.column() as usize;
        if let Some(slot) = self.tiles.get_mut(index) {
            *slot = present;
        }
    }

    /// Reports whether the layer has a tile at the provided position.
    #[must_use]
    pub fn has_tile(&self, tile: TileCoord) -> bool {
        if tile.column() >= self.columns || tile.row() >= self.rows {
            return false;
        }
        let index = tile.row() as usize * self.columns as usize + tile.column() as usize;
        self.tiles.get(index).copied().unwrap_or(false)
    }
}

/// Ordered collection of the layers composing a map.
///
/// The first layer defines the map's dimensions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerSet {
    layers: Vec<TileLayer>,
}

impl LayerSet {
    /// Creates an empty layer set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer.
    pub fn push(&mut self, layer: TileLayer) {
        self.layers.push(layer);
    }

    /// Looks up a layer by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Dimensions of the map as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.layers
            .first()
            .map(|layer| (layer.columns, layer.rows))
    }

    /// Iterator over the layers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TileLayer> {
        self.layers.iter()
    }
}

impl FromIterator<TileLayer> for LayerSet {
    fn from_iter<I: IntoIterator<Item = TileLayer>>(iter: I) -> Self {
        Self {
            layers: iter.into_iter().collect(),
        }
    }
}

/// Reasons a tile map cannot be turned into a traversal grid.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    /// No obstacle layer names were supplied.
    #[error("no obstacle layers were named")]
    NoObstacleLayers,
    /// The map has no layers or no tiles.
    #[error("the map has no tiles")]
    EmptyMap,
    /// A named obstacle layer is absent from the map.
    #[error("obstacle layer `{0}` is missing from the map")]
    MissingLayer(String),
    /// A layer's dimensions differ from the map's.
    #[error("layer `{name}` is {found:?} tiles but the map is {expected:?}")]
    DimensionMismatch {
        /// Name of the offending layer.
        name: String,
        /// Map dimensions as `(columns, rows)`.
        expected: (u32, u32),
        /// Layer dimensions as `(columns, rows)`.
        found: (u32, u32),
    },
    /// A layer stores a different number of tiles than its dimensions imply.
    #[error("layer `{name}` holds {found} tiles, expected {expected}")]
    TileCountMismatch {
        /// Name of the offending layer.
        name: String,
        /// Tile count implied by the dimensions.
        expected: usize,
        /// Tile count actually stored.
        found: usize,
    },
    /// The tile length is not a positive finite number.
    #[error("tile length must be positive, got {0}")]
    InvalidTileLength(f32),
}

/// Classifies every tile of the map.
///
/// # Errors
///
/// Returns a [`GridError`] when no obstacle layer is named, a named layer is
/// missing, or the layers disagree about the map's shape.
pub fn build<S: AsRef<str>>(
    layers: &LayerSet,
    obstacle_layers: &[S],
    tile_length: f32,
) -> Result<TraversalGrid, GridError> {
    if obstacle_layers.is_empty() {
        return Err(GridError::NoObstacleLayers);
    }
    let (columns, rows) = layers.dimensions().ok_or(GridError::EmptyMap)?;
    if columns == 0 || rows == 0 {
        return Err(GridError::EmptyMap);
    }
    if !tile_length.is_finite() || tile_length <= 0.0 {
        return Err(GridError::InvalidTileLength(tile_length));
    }

    let mut obstacles = Vec::with_capacity(obstacle_layers.len());
    for name in obstacle_layers {
        let name = name.as_ref();
        let layer = layers
            .get(name)
            .ok_or_else(|| GridError::MissingLayer(name.to_owned()))?;
        if (layer.columns, layer.rows) != (columns, rows) {
            return Err(GridError::DimensionMismatch {
                name: name.to_owned(),
                expected: (columns, rows),
                found: (layer.columns, layer.rows),
            });
        }
        let expected = columns as usize * rows as usize;
        if layer.tiles.len() != expected {
            return Err(GridError::TileCountMismatch {
                name: name.to_owned(),
                expected,
                found: layer.tiles.len(),
            });
        }
        obstacles.push(layer);
    }

    let blocked: Vec<bool> = (0..rows)
        .flat_map(|row| (0..columns).map(move |column| TileCoord::new(column, row)))
        .map(|tile| obstacles.iter().any(|layer| layer.has_tile(tile)))
        .collect();
    let is_blocked = |column: i64, row: i64| -> bool {
        if column < 0 || row < 0 || column >= i64::from(columns) || row >= i64::from(rows) {
            return false;
        }
        blocked[row as usize * columns as usize + column as usize]
    };

    let mut cells = Vec::with_capacity(blocked.len());
    for row in 0..i64::from(rows) {
        for column in 0..i64::from(columns) {
            let traversal = if is_blocked(column, row) {
                Traversal::Blocked
            } else if NEIGHBOR_OFFSETS
                .iter()
                .any(|&(dc, dr)| is_blocked(column + i64::from(dc), row + i64::from(dr)))
            {
                Traversal::NearWall
            } else {
                Traversal::Free
            };
            cells.push(traversal);
        }
    }

    TraversalGrid::from_cells(columns, rows, tile_length, cells).ok_or(GridError::EmptyMap)
}

/// Classifies the map, falling back to an all-blocked grid on failure.
///
/// The failure is logged and the fallback keeps the map's dimensions so that
/// world/tile conversions stay meaningful while nothing can move.
#[must_use]
pub fn build_or_impassable<S: AsRef<str>>(
    layers: &LayerSet,
    obstacle_layers: &[S],
    tile_length: f32,
) -> TraversalGrid {
    match build(layers, obstacle_layers, tile_length) {
        Ok(grid) => {
            log::debug!(
                "built {}x{} traversal grid",
                grid.columns(),
                grid.rows()
            );
            grid
        }
        Err(error) => {
            log::error!("failed to build traversal grid: {error}");
            let (columns, rows) = layers.dimensions().unwrap_or((0, 0));
            TraversalGrid::impassable(columns, rows, tile_length)
        }
    }
}
