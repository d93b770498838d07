//! Tile extraction and deduplication.
//!
//! A source image is sliced into a `TileGrid`, each tile is identified
//! against a growing `Tileset`, and the identifiers are collected into an
//! `IdentifierGrid` ready for serialization.

mod extract;
mod matcher;
mod tileset;

pub use extract::{Tile, TileGrid, Tiles};
pub use matcher::{matcher_for, ExactMatcher, ThresholdMatcher, TileMatcher};
pub use tileset::{atlas_columns, generate, Generation, IdentifierGrid, Tileset, UNMAPPED};
