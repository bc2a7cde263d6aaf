use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Smallest tile edge accepted; anything below is raised to this.
pub const MIN_TILE_SIZE: f32 = 0.01;

/// Tile layout of one segment, as loaded from config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Tile size across the travel axis.
    pub tile_width: f32,
    /// Tile size along the travel axis.
    pub tile_depth: f32,
    /// Tiles across the travel axis.
    pub columns: u32,
    /// Tiles along the travel axis.
    pub rows: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_width: 1.0,
            tile_depth: 1.0,
            columns: 20,
            rows: 20,
        }
    }
}

/// Fixed rectangular grid of tiles centred on a segment's origin.
///
/// Cell `(x, z)` sits at
/// `(-W*columns/2 + x*W + W/2, 0, -D*rows/2 + z*D + D/2)` relative to the
/// origin. Cells are visited column by column (x outer, z inner).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGrid {
    tile_width: f32,
    tile_depth: f32,
    columns: u32,
    rows: u32,
}

impl TileGrid {
    /// Sizes below [`MIN_TILE_SIZE`] and zero counts are raised to the minimum.
    pub fn new(tile_width: f32, tile_depth: f32, columns: u32, rows: u32) -> Self {
        Self {
            tile_width: tile_width.max(MIN_TILE_SIZE),
            tile_depth: tile_depth.max(MIN_TILE_SIZE),
            columns: columns.max(1),
            rows: rows.max(1),
        }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(
            config.tile_width,
            config.tile_depth,
            config.columns,
            config.rows,
        )
    }

    pub fn tile_width(&self) -> f32 {
        self.tile_width
    }

    pub fn tile_depth(&self) -> f32 {
        self.tile_depth
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of tiles in one segment.
    pub fn tile_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Total span across the travel axis.
    pub fn width_extent(&self) -> f32 {
        self.columns as f32 * self.tile_width
    }

    /// Total span along the travel axis.
    pub fn depth_extent(&self) -> f32 {
        self.rows as f32 * self.tile_depth
    }

    /// Centre of cell `(x, z)` relative to the segment origin.
    pub fn cell_offset(&self, x: u32, z: u32) -> Vec3 {
        let start_x = -self.width_extent() / 2.0;
        let start_z = -self.depth_extent() / 2.0;
        Vec3::new(
            start_x + x as f32 * self.tile_width + self.tile_width / 2.0,
            0.0,
            start_z + z as f32 * self.tile_depth + self.tile_depth / 2.0,
        )
    }

    /// Every cell index in generation order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + use<> {
        let rows = self.rows;
        (0..self.columns).flat_map(move |x| (0..rows).map(move |z| (x, z)))
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::from_config(&GridConfig::default())
    }
}
