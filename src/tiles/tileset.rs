//! Tileset builder.
//!
//! Deduplicates tiles into a square atlas image and hands out stable
//! 1-based identifiers. Slots fill in raster order and are never rewritten,
//! so the occupied slots are always the prefix `[0, len)` and a tile's
//! identifier is its slot index plus one. Identifier 0 means the tile had
//! no match and the tileset was already full.

use std::collections::{BTreeSet, HashMap};

use image::RgbaImage;

use crate::error::{Result, TilecutError};
use crate::types::{Colour, EdgePolicy, TileConfig};

use super::{TileGrid, TileMatcher};

/// Identifier recorded for tiles that could not be placed.
pub const UNMAPPED: u32 = 0;

/// Bytes per RGBA8 pixel.
const CHANNELS: usize = 4;

/// A growing atlas of distinct tiles.
#[derive(Debug, Clone)]
pub struct Tileset {
    atlas: RgbaImage,
    tile_width: u32,
    tile_height: u32,
    /// Slots per atlas side.
    columns: u32,
    /// Maximum number of distinct tiles.
    capacity: u32,
    /// Number of occupied slots.
    len: u32,
    /// Slot lookup by pixel content, first slot wins.
    index: HashMap<Vec<u8>, u32>,
    scratch: Vec<u8>,
}

impl Tileset {
    /// Allocate an empty atlas large enough for `tile_count` tiles and seed
    /// the first slot with an opaque black tile (identifier 1).
    pub fn new(tile_width: u32, tile_height: u32, tile_count: u32) -> Result<Self> {
        if tile_width == 0 || tile_height == 0 || tile_count == 0 {
            return Err(TilecutError::Config {
                message: format!(
                    "Cannot build a tileset of {} {}x{} tiles",
                    tile_count, tile_width, tile_height
                ),
                help: None,
            });
        }

        let columns = atlas_columns(tile_count);
        let atlas = allocate_atlas(tile_width, tile_height, columns)?;

        let mut tileset = Self {
            atlas,
            tile_width,
            tile_height,
            columns,
            capacity: tile_count,
            len: 0,
            index: HashMap::new(),
            scratch: Vec::with_capacity(tile_width as usize * tile_height as usize * CHANNELS),
        };

        let placeholder = RgbaImage::from_pixel(tile_width, tile_height, Colour::BLACK.into());
        tileset.insert(placeholder.as_raw());

        Ok(tileset)
    }

    /// Return the identifier for `tile`, inserting it when nothing matches.
    ///
    /// `tile` is packed RGBA8 of exactly one tile.
    pub fn identify(&mut self, tile: &[u8], matcher: &dyn TileMatcher) -> u32 {
        debug_assert_eq!(tile.len(), self.tile_bytes());

        if let Some(slot) = self.find(tile, matcher) {
            return slot + 1;
        }

        if self.len >= self.capacity {
            return UNMAPPED;
        }

        self.insert(tile)
    }

    /// First occupied slot, in raster order, that matches `tile`.
    fn find(&mut self, tile: &[u8], matcher: &dyn TileMatcher) -> Option<u32> {
        if matcher.is_exact() {
            return self.index.get(tile).copied();
        }

        let mut scratch = std::mem::take(&mut self.scratch);
        let found = (0..self.len).find(|&slot| {
            self.read_slot(slot, &mut scratch);
            matcher.matches(&scratch, tile)
        });
        self.scratch = scratch;
        found
    }

    /// Copy `tile` into the next free slot and return its identifier.
    fn insert(&mut self, tile: &[u8]) -> u32 {
        let slot = self.len;
        let (x, y) = self.slot_origin(slot);
        let row_bytes = self.tile_width as usize * CHANNELS;
        let atlas_width = self.atlas.width() as usize;

        let raw: &mut [u8] = &mut self.atlas;
        for (r, src) in tile.chunks_exact(row_bytes).enumerate() {
            let start = ((y as usize + r) * atlas_width + x as usize) * CHANNELS;
            raw[start..start + row_bytes].copy_from_slice(src);
        }

        self.index.entry(tile.to_vec()).or_insert(slot);
        self.len += 1;
        self.len
    }

    /// Read one slot's pixels into `out` as packed RGBA8.
    fn read_slot(&self, slot: u32, out: &mut Vec<u8>) {
        let (x, y) = self.slot_origin(slot);
        let row_bytes = self.tile_width as usize * CHANNELS;
        let atlas_width = self.atlas.width() as usize;
        let raw = self.atlas.as_raw();

        out.clear();
        for r in 0..self.tile_height as usize {
            let start = ((y as usize + r) * atlas_width + x as usize) * CHANNELS;
            out.extend_from_slice(&raw[start..start + row_bytes]);
        }
    }

    /// Top-left pixel of a slot.
    fn slot_origin(&self, slot: u32) -> (u32, u32) {
        (
            (slot % self.columns) * self.tile_width,
            (slot / self.columns) * self.tile_height,
        )
    }

    fn tile_bytes(&self) -> usize {
        self.tile_width as usize * self.tile_height as usize * CHANNELS
    }

    /// The pixels stored under an identifier, if it is in use.
    pub fn tile(&self, id: u32) -> Option<RgbaImage> {
        if id == UNMAPPED || id > self.len {
            return None;
        }
        let mut bytes = Vec::with_capacity(self.tile_bytes());
        self.read_slot(id - 1, &mut bytes);
        RgbaImage::from_raw(self.tile_width, self.tile_height, bytes)
    }

    /// Number of distinct tiles stored, including the reserved first tile.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len >= self.capacity
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Slots per atlas side.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn image(&self) -> &RgbaImage {
        &self.atlas
    }

    pub fn into_image(self) -> RgbaImage {
        self.atlas
    }
}

/// Smallest `n` with `n * n >= tile_count`.
pub fn atlas_columns(tile_count: u32) -> u32 {
    (tile_count as f64).sqrt().ceil() as u32
}

/// Allocate a zeroed square atlas, reporting failure instead of aborting.
fn allocate_atlas(tile_width: u32, tile_height: u32, columns: u32) -> Result<RgbaImage> {
    let too_large = || TilecutError::Allocation {
        message: format!(
            "Tileset of {}x{} tiles of {}x{} pixels is too large",
            columns, columns, tile_width, tile_height
        ),
    };

    let width = tile_width.checked_mul(columns).ok_or_else(too_large)?;
    let height = tile_height.checked_mul(columns).ok_or_else(too_large)?;
    let bytes = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or_else(too_large)?;

    let mut buffer = Vec::new();
    buffer.try_reserve_exact(bytes).map_err(|e| TilecutError::Allocation {
        message: format!("Failed to allocate {}x{} tileset: {}", width, height, e),
    })?;
    buffer.resize(bytes, 0);

    RgbaImage::from_raw(width, height, buffer).ok_or_else(too_large)
}

/// Row-major grid of tile identifiers, one per source cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierGrid {
    width: u32,
    height: u32,
    ids: Vec<u32>,
}

impl IdentifierGrid {
    /// `ids` must hold exactly `width * height` entries.
    pub fn new(width: u32, height: u32, ids: Vec<u32>) -> Self {
        debug_assert_eq!(ids.len(), width as usize * height as usize);
        Self { width, height, ids }
    }

    /// Width in cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, column: u32, row: u32) -> Option<u32> {
        if column >= self.width || row >= self.height {
            return None;
        }
        self.ids
            .get(row as usize * self.width as usize + column as usize)
            .copied()
    }

    /// Rows of identifiers, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.ids.chunks(self.width.max(1) as usize)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.ids
    }

    /// Number of cells that received identifier 0.
    pub fn unmapped(&self) -> usize {
        self.ids.iter().filter(|&&id| id == UNMAPPED).count()
    }

    /// Distinct non-zero identifiers referenced by the grid.
    pub fn distinct(&self) -> BTreeSet<u32> {
        self.ids.iter().copied().filter(|&id| id != UNMAPPED).collect()
    }
}

/// Result of one generation pass.
#[derive(Debug, Clone)]
pub struct Generation {
    pub tileset: Tileset,
    pub grid: IdentifierGrid,
}

/// Slice `image` into tiles and identify each against a fresh tileset.
pub fn generate(
    image: &RgbaImage,
    config: &TileConfig,
    matcher: &dyn TileMatcher,
) -> Result<Generation> {
    config.validate()?;

    let cells = TileGrid::new(image, config.tile_width, config.tile_height);
    if config.edges == EdgePolicy::Reject && !cells.is_exact() {
        return Err(TilecutError::Config {
            message: format!(
                "Image size {}x{} is not a multiple of the tile size {}x{}",
                image.width(),
                image.height(),
                config.tile_width,
                config.tile_height
            ),
            help: Some("Crop the image or allow truncation with edges: truncate".to_string()),
        });
    }

    let mut tileset = Tileset::new(config.tile_width, config.tile_height, config.tile_count)?;

    // One tile buffer for the whole run
    let mut tile = Vec::with_capacity(cells.tile_len());
    let mut ids = Vec::with_capacity(cells.len());
    for row in 0..cells.rows() {
        for column in 0..cells.columns() {
            cells.read_tile(column, row, &mut tile);
            ids.push(tileset.identify(&tile, matcher));
        }
    }

    let grid = IdentifierGrid::new(cells.columns(), cells.rows(), ids);
    Ok(Generation { tileset, grid })
}
