//! Tile comparison strategies.
//!
//! The tileset builder asks a `TileMatcher` whether an occupied tileset slot
//! can stand in for an incoming tile. Both sides are packed RGBA8 bytes of
//! the same tile size.

use crate::types::TileConfig;

/// Decides whether two equally-sized tiles are the same tile.
pub trait TileMatcher {
    fn matches(&self, candidate: &[u8], tile: &[u8]) -> bool;

    /// True when `matches` is plain byte equality, which lets the builder
    /// look tiles up by content instead of scanning.
    fn is_exact(&self) -> bool {
        false
    }
}

/// Byte-for-byte equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl TileMatcher for ExactMatcher {
    fn matches(&self, candidate: &[u8], tile: &[u8]) -> bool {
        candidate == tile
    }

    fn is_exact(&self) -> bool {
        true
    }
}

/// Matches when at least `fraction` of the pixels are identical.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdMatcher {
    pub fraction: f32,
}

impl ThresholdMatcher {
    pub fn new(fraction: f32) -> Self {
        Self { fraction }
    }
}

impl TileMatcher for ThresholdMatcher {
    fn matches(&self, candidate: &[u8], tile: &[u8]) -> bool {
        if candidate.len() != tile.len() {
            return false;
        }

        let total = tile.len() / 4;
        if total == 0 {
            return true;
        }

        let same = candidate
            .chunks_exact(4)
            .zip(tile.chunks_exact(4))
            .filter(|(a, b)| a == b)
            .count();

        same as f64 >= self.fraction as f64 * total as f64
    }
}

/// Pick the matcher for a config: exact at 1.0, thresholded below.
pub fn matcher_for(config: &TileConfig) -> Box<dyn TileMatcher> {
    if config.is_exact() {
        Box::new(ExactMatcher)
    } else {
        Box::new(ThresholdMatcher::new(config.similarity))
    }
}
