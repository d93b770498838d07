//! tilecut - Tile map image to tileset converter
//!
//! A library for slicing a tile-based map image into a deduplicated tileset
//! image and a Tiled JSON (`.tmj`) map that references it.

pub mod cli;
pub mod error;
pub mod manifest;
pub mod output;
pub mod render;
pub mod tiles;
pub mod types;

pub use error::{Result, TilecutError};
pub use manifest::{Manifest, Overrides};
pub use render::{load_png, render_map, write_map, write_png, MapDocument, MapFiles, OutputStem};
pub use tiles::{
    generate, matcher_for, ExactMatcher, Generation, IdentifierGrid, ThresholdMatcher, Tile,
    TileGrid, TileMatcher, Tileset,
};
pub use types::{Colour, EdgePolicy, TileConfig};
