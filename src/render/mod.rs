//! Output rendering for tilecut.
//!
//! PNG reading and writing for source maps and tilesets, and the Tiled
//! `.tmj` map serializer.

mod png;
mod tmj;

pub use png::{load_png, write_png};
pub use tmj::{
    render_map, write_map, MapDocument, MapFiles, OutputStem, TILED_VERSION, TILESET_COLUMNS,
};
