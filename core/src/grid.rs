//! Tile traversal grid and the geometry shared by every grid search.

use glam::Vec2;

use crate::TileCoord;

/// Eight-neighbourhood step offsets in the order every search expands them.
///
/// Orthogonal steps come first, followed by the four diagonals.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];

/// Movement classification of a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Traversal {
    /// Open floor.
    Free,
    /// Walkable floor touching at least one blocked tile.
    NearWall,
    /// Impassable tile.
    Blocked,
}

impl Traversal {
    /// Cost of entering the tile, or `None` when it cannot be entered.
    #[must_use]
    pub const fn cost(self) -> Option<u32> {
        match self {
            Self::Free => Some(1),
            Self::NearWall => Some(2),
            Self::Blocked => None,
        }
    }

    /// Reports whether agents may stand on the tile.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Self::Blocked)
    }
}

/// Row-major classification of every map tile.
///
/// Lookups outside the grid report [`Traversal::Blocked`], so callers never
/// need separate bounds checks.
#[derive(Clone, Debug, PartialEq)]
pub struct TraversalGrid {
    columns: u32,
    rows: u32,
    tile_length: f32,
    cells: Vec<Traversal>,
}

impl TraversalGrid {
    /// Creates a grid from row-major cells.
    ///
    /// Returns `None` when the cell count does not match the dimensions or the
    /// tile length is not a positive finite number.
    #[must_use]
    pub fn from_cells(
        columns: u32,
        rows: u32,
        tile_length: f32,
        cells: Vec<Traversal>,
    ) -> Option<Self> {
        let expected = usize::try_from(u64::from(columns) * u64::from(rows)).ok()?;
        if cells.len() != expected || !tile_length.is_finite() || tile_length <= 0.0 {
            return None;
        }

        Some(Self {
            columns,
            rows,
            tile_length,
            cells,
        })
    }

    /// Creates a grid where every tile is open floor.
    #[must_use]
    pub fn uniform(columns: u32, rows: u32, tile_length: f32) -> Self {
        Self::filled(columns, rows, tile_length, Traversal::Free)
    }

    /// Creates a grid where every tile is blocked.
    #[must_use]
    pub fn impassable(columns: u32, rows: u32, tile_length: f32) -> Self {
        Self::filled(columns, rows, tile_length, Traversal::Blocked)
    }

    fn filled(columns: u32, rows: u32, tile_length: f32, traversal: Traversal) -> Self {
        let tile_length = if tile_length.is_finite() && tile_length > 0.0 {
            tile_length
        } else {
            1.0
        };
        let count = (columns as usize).saturating_mul(rows as usize);
        Self {
            columns,
            rows,
            tile_length,
            cells: vec![traversal; count],
        }
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

    /// Side length of a tile in world units.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Total number of tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the grid holds no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row-major index of a tile, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, tile: TileCoord) -> Option<usize> {
        if tile.column() >= self.columns || tile.row() >= self.rows {
            return None;
        }
        let index = tile.row() as usize * self.columns as usize + tile.column() as usize;
        Some(index)
    }

    /// Tile stored at a row-major index.
    #[must_use]
    pub fn tile_from_index(&self, index: usize) -> Option<TileCoord> {
        if index >= self.cells.len() || self.columns == 0 {
            return None;
        }
        let columns = self.columns as usize;
        let column = u32::try_from(index % columns).ok()?;
        let row = u32::try_from(index / columns).ok()?;
        Some(TileCoord::new(column, row))
    }

    /// Classification of a tile. Out-of-bounds tiles are blocked.
    #[must_use]
    pub fn traversal(&self, tile: TileCoord) -> Traversal {
        self.index(tile)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(Traversal::Blocked)
    }

    /// Reports whether a tile can be stood on.
    #[must_use]
    pub fn is_walkable(&self, tile: TileCoord) -> bool {
        self.traversal(tile).is_walkable()
    }

    /// Reports whether a world position lies on a walkable tile.
    #[must_use]
    pub fn is_walkable_at(&self, position: Vec2) -> bool {
        self.tile_at(position)
            .map_or(false, |tile| self.is_walkable(tile))
    }

    /// Tile containing a world position, if the position lies on the map.
    #[must_use]
    pub fn tile_at(&self, position: Vec2) -> Option<TileCoord> {
        if !position.x.is_finite() || !position.y.is_finite() {
            return None;
        }
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        let column = (position.x / self.tile_length).floor();
        let row = (position.y / self.tile_length).floor();
        if column >= self.columns as f32 || row >= self.rows as f32 {
            return None;
        }
        Some(TileCoord::new(column as u32, row as u32))
    }

    /// World position of a tile's centre.
    #[must_use]
    pub fn tile_center(&self, tile: TileCoord) -> Vec2 {
        Vec2::new(
            (tile.column() as f32 + 0.5) * self.tile_length,
            (tile.row() as f32 + 0.5) * self.tile_length,
        )
    }

    /// Tile reached by applying an offset, if it lies inside the grid.
    #[must_use]
    pub fn offset(&self, tile: TileCoord, (dc, dr): (i32, i32)) -> Option<TileCoord> {
        let column = i64::from(tile.column()) + i64::from(dc);
        let row = i64::from(tile.row()) + i64::from(dr);
        if column < 0 || row < 0 || column >= i64::from(self.columns) || row >= i64::from(self.rows)
        {
            return None;
        }
        Some(TileCoord::new(column as u32, row as u32))
    }

    /// Applies the shared stepping rule used by every grid search.
    ///
    /// The destination must be walkable, and a diagonal step additionally
    /// requires both orthogonally adjacent tiles to be walkable.
    #[must_use]
    pub fn step(&self, tile: TileCoord, delta: (i32, i32)) -> Option<TileCoord> {
        let next = self.offset(tile, delta)?;
        if !self.is_walkable(next) {
            return None;
        }
        let (dc, dr) = delta;
        if dc != 0 && dr != 0 {
            let horizontal = self.offset(tile, (dc, 0))?;
            let vertical = self.offset(tile, (0, dr))?;
            if !self.is_walkable(horizontal) || !self.is_walkable(vertical) {
                return None;
            }
        }
        Some(next)
    }

    /// Reports whether the straight segment between two points crosses only
    /// walkable tiles.
    ///
    /// Points off the map count as blocked.
    #[must_use]
    pub fn line_of_sight(&self, from: Vec2, to: Vec2) -> bool {
        self.first_blocked(from, to).is_none()
    }

    /// Fraction of the segment `from -> to` travelled before it first enters
    /// a tile that cannot be walked, or `None` when every crossed tile is
    /// walkable.
    ///
    /// Every tile the segment touches is visited in order. A segment passing
    /// exactly through a tile corner is blocked when any of the tiles around
    /// that corner is.
    #[must_use]
    pub fn first_blocked(&self, from: Vec2, to: Vec2) -> Option<f32> {
        if !from.is_finite() || !to.is_finite() {
            return Some(0.0);
        }
        let Some(start) = self.tile_at(from) else {
            return Some(0.0);
        };
        if !self.is_walkable(start) {
            return Some(0.0);
        }

        let delta = to - from;
        let mut column = i64::from(start.column());
        let mut row = i64::from(start.row());
        let (step_x, mut next_x, span_x) = self.axis_crossings(from.x, delta.x, column);
        let (step_y, mut next_y, span_y) = self.axis_crossings(from.y, delta.y, row);

        loop {
            let t = next_x.min(next_y);
            if t > 1.0 {
                return None;
            }
            if next_x == next_y {
                let corner_clear = self.is_walkable_index(column + step_x, row)
                    && self.is_walkable_index(column, row + step_y);
                column += step_x;
                row += step_y;
                next_x += span_x;
                next_y += span_y;
                if !corner_clear {
                    return Some(t.max(0.0));
                }
            } else if next_x < next_y {
                column += step_x;
                next_x += span_x;
            } else {
                row += step_y;
                next_y += span_y;
            }
            if !self.is_walkable_index(column, row) {
                return Some(t.max(0.0));
            }
        }
    }

    /// Direction, first boundary crossing and per-tile span of a segment
    /// along one axis, as fractions of the segment.
    fn axis_crossings(&self, origin: f32, delta: f32, index: i64) -> (i64, f32, f32) {
        if delta > 0.0 {
            let boundary = (index + 1) as f32 * self.tile_length;
            (1, (boundary - origin) / delta, self.tile_length / delta)
        } else if delta < 0.0 {
            let boundary = index as f32 * self.tile_length;
            (-1, (boundary - origin) / delta, self.tile_length / -delta)
        } else {
            (0, f32::INFINITY, f32::INFINITY)
        }
    }

    fn is_walkable_index(&self, column: i64, row: i64) -> bool {
        if column < 0 || row < 0 || column >= i64::from(self.columns) || row >= i64::from(self.rows)
        {
            return false;
        }
        self.is_walkable(TileCoord::new(column as u32, row as u32))
    }
}

/// Unit vector pointing at the provided angle in radians.
#[must_use]
pub fn unit_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
