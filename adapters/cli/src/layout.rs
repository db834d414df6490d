//! ASCII map format.
//!
//! Each line is a row of tiles: `#` marks a wall, `o` an obstacle, `S` a
//! spawn point, `P` the player start and anything else open floor.

use horde_core::TileCoord;
use horde_system_grid_builder::{LayerSet, TileLayer};
use thiserror::Error;

/// Name of the layer holding `#` tiles.
pub(crate) const WALL_LAYER: &str = "walls";
/// Name of the layer holding `o` tiles.
pub(crate) const OBSTACLE_LAYER: &str = "obstacles";

/// Arena used when no map file is given.
pub(crate) const BUILTIN_MAP: &str = include_str!("../maps/arena.txt");

/// Parsed map: tile layers plus marker positions.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Layout {
    /// Wall and obstacle layers.
    pub(crate) layers: LayerSet,
    /// Tiles marked as spawn points, in reading order.
    pub(crate) spawn_points: Vec<TileCoord>,
    /// Tile the player starts on.
    pub(crate) player: TileCoord,
}

/// Reasons an ASCII map is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum LayoutError {
    /// The map has no non-empty line.
    #[error("map contains no tiles")]
    Empty,
    /// An empty line sits between two rows of tiles.
    #[error("row {row} is blank")]
    BlankRow {
        /// Zero-based row index.
        row: usize,
    },
    /// A row is shorter or longer than the first one.
    #[error("row {row} has {found} tiles, expected {expected}")]
    Ragged {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// No `P` marker was found.
    #[error("map has no player start `P`")]
    MissingPlayer,
    /// More than one `P` marker was found.
    #[error("second player start at column {column}, row {row}")]
    DuplicatePlayer {
        /// Column of the extra marker.
        column: u32,
        /// Row of the extra marker.
        row: u32,
    },
    /// No `S` marker was found.
    #[error("map has no spawn point `S`")]
    NoSpawnPoints,
}

/// Parses an ASCII map.
///
/// Trailing whitespace and blank lines before or after the map are ignored;
/// a blank line inside the map is rejected.
pub(crate) fn parse(text: &str) -> Result<Layout, LayoutError> {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let first = lines
        .iter()
        .position(|line| !line.is_empty())
        .ok_or(LayoutError::Empty)?;
    let last = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .unwrap_or(first);
    let lines = &lines[first..=last];

    let expected = lines[0].chars().count();
    for (row, line) in lines.iter().enumerate() {
        if line.is_empty() {
            return Err(LayoutError::BlankRow { row });
        }
        let found = line.chars().count();
        if found != expected {
            return Err(LayoutError::Ragged {
                row,
                expected,
                found,
            });
        }
    }

    let columns = expected as u32;
    let rows = lines.len() as u32;
    let mut walls = TileLayer::empty(WALL_LAYER, columns, rows);
    let mut obstacles = TileLayer::empty(OBSTACLE_LAYER, columns, rows);
    let mut spawn_points = Vec::new();
    let mut player = None;

    for (row, line) in lines.iter().enumerate() {
        for (column, symbol) in line.chars().enumerate() {
            let tile = TileCoord::new(column as u32, row as u32);
            match symbol {
                '#' => walls.set(tile, true),
                'o' => obstacles.set(tile, true),
                'S' => spawn_points.push(tile),
                'P' => {
                    if player.replace(tile).is_some() {
                        return Err(LayoutError::DuplicatePlayer {
                            column: tile.column(),
                            row: tile.row(),
                        });
                    }
                }
                _ => {}
            }
        }
    }

    let player = player.ok_or(LayoutError::MissingPlayer)?;
    if spawn_points.is_empty() {
        return Err(LayoutError::NoSpawnPoints);
    }

    Ok(Layout {
        layers: [walls, obstacles].into_iter().collect(),
        spawn_points,
        player,
    })
}
