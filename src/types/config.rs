//! Tile configuration.
//!
//! `TileConfig` is the resolved set of options for a single conversion,
//! after CLI flags have been layered over the project manifest.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TilecutError};

use super::Colour;

/// Default maximum number of distinct tiles the tileset may hold.
pub const DEFAULT_TILE_COUNT: u32 = 2048;

/// Similarity that selects exact matching. Similarity is the fraction of
/// pixels that must be identical, so 1.0 means every pixel.
pub const EXACT_SIMILARITY: f32 = 1.0;

/// What to do when the source image is not an exact multiple of the tile size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// Drop the trailing partial column and row of cells.
    #[default]
    Truncate,
    /// Refuse to convert.
    Reject,
}

impl fmt::Display for EdgePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgePolicy::Truncate => write!(f, "truncate"),
            EdgePolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Options controlling tile extraction and tileset generation.
#[derive(Debug, Clone, PartialEq)]
pub struct TileConfig {
    pub tile_width: u32,
    pub tile_height: u32,
    /// Maximum number of distinct tiles, including the reserved first tile.
    pub tile_count: u32,
    /// Fraction of identical pixels required for two tiles to match.
    pub similarity: f32,
    pub transparent_colour: Colour,
    pub edges: EdgePolicy,
}

impl TileConfig {
    /// Create a config for the given tile size with default options.
    pub fn new(tile_width: u32, tile_height: u32) -> Self {
        Self {
            tile_width,
            tile_height,
            tile_count: DEFAULT_TILE_COUNT,
            similarity: EXACT_SIMILARITY,
            transparent_colour: Colour::MAGENTA,
            edges: EdgePolicy::default(),
        }
    }

    pub fn with_tile_count(mut self, tile_count: u32) -> Self {
        self.tile_count = tile_count;
        self
    }

    pub fn with_similarity(mut self, similarity: f32) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn with_edges(mut self, edges: EdgePolicy) -> Self {
        self.edges = edges;
        self
    }

    /// True when tiles must be byte-for-byte identical to match.
    pub fn is_exact(&self) -> bool {
        self.similarity >= EXACT_SIMILARITY
    }

    /// Check the options are usable before any pixel work starts.
    pub fn validate(&self) -> Result<()> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(TilecutError::Config {
                message: format!(
                    "Tile size must be non-zero, got {}x{}",
                    self.tile_width, self.tile_height
                ),
                help: Some("Pass the tile size with -w <width> -h <height>".to_string()),
            });
        }

        if self.tile_count == 0 {
            return Err(TilecutError::Config {
                message: "Tile count must be at least 1".to_string(),
                help: Some("The first tileset entry is always reserved".to_string()),
            });
        }

        if !(self.similarity > 0.0 && self.similarity <= EXACT_SIMILARITY) {
            return Err(TilecutError::Config {
                message: format!("Similarity {} is out of range", self.similarity),
                help: Some("Use a fraction greater than 0 and at most 1.0 (exact)".to_string()),
            });
        }

        Ok(())
    }
}
