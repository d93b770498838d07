//! Core domain types for tilecut.
//!
//! - `Colour` - RGBA colour values
//! - `TileConfig` - Resolved options for one conversion

mod colour;
mod config;

pub use colour::Colour;
pub use config::{EdgePolicy, TileConfig, DEFAULT_TILE_COUNT, EXACT_SIMILARITY};
