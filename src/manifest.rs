//! Project manifest (tilecut.yaml) parsing.
//!
//! The manifest supplies default conversion options for a project. Command
//! line flags override anything set here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TilecutError};
use crate::types::{Colour, EdgePolicy, TileConfig, DEFAULT_TILE_COUNT, EXACT_SIMILARITY};

/// File name looked up in the working directory when no manifest is given.
pub const MANIFEST_FILE: &str = "tilecut.yaml";

/// Project manifest loaded from tilecut.yaml.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    /// Tile width in pixels.
    pub tile_width: Option<u32>,

    /// Tile height in pixels.
    pub tile_height: Option<u32>,

    /// Maximum number of distinct tiles.
    pub tile_count: Option<u32>,

    /// Fraction of identical pixels for two tiles to match (1.0 is exact).
    pub similarity: Option<f32>,

    /// Colour Tiled should treat as transparent (hex).
    pub transparent_colour: Option<String>,

    /// Handling of images that are not a multiple of the tile size.
    pub edges: Option<EdgePolicy>,
}

/// Per-run overrides, typically from command line flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub tile_width: Option<u32>,
    pub tile_height: Option<u32>,
    pub tile_count: Option<u32>,
    pub similarity: Option<f32>,
    pub edges: Option<EdgePolicy>,
}

impl Manifest {
    /// Load manifest from a tilecut.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TilecutError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse manifest from YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(content).map_err(|e| TilecutError::Config {
            message: format!("Invalid manifest: {}", e),
            help: Some(format!("Check {} syntax", MANIFEST_FILE)),
        })
    }

    /// Load the explicit manifest if given, else `tilecut.yaml` in `dir`
    /// when present, else defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        let candidate = dir.join(MANIFEST_FILE);
        if candidate.is_file() {
            Ok((Self::load(&candidate)?, Some(candidate)))
        } else {
            Ok((Self::default(), None))
        }
    }

    /// Layer `overrides` over this manifest and fill in built-in defaults.
    ///
    /// Tile size has no default; an unset size resolves to 0 and fails
    /// `TileConfig::validate`.
    pub fn resolve(&self, overrides: &Overrides) -> Result<TileConfig> {
        let transparent_colour = match &self.transparent_colour {
            Some(hex) => Colour::from_hex(hex)?,
            None => Colour::MAGENTA,
        };

        let config = TileConfig {
            tile_width: overrides.tile_width.or(self.tile_width).unwrap_or(0),
            tile_height: overrides.tile_height.or(self.tile_height).unwrap_or(0),
            tile_count: overrides
                .tile_count
                .or(self.tile_count)
                .unwrap_or(DEFAULT_TILE_COUNT),
            similarity: overrides
                .similarity
                .or(self.similarity)
                .unwrap_or(EXACT_SIMILARITY),
            transparent_colour,
            edges: overrides.edges.or(self.edges).unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
