pub mod completions;
pub mod convert;

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use clap_complete::Shell;

use crate::error::{Result, TilecutError};
use crate::manifest::Overrides;
use crate::types::EdgePolicy;

use self::convert::ConvertArgs;

/// tilecut - Convert a tile-based map image into a tileset and a Tiled map
#[derive(Parser, Debug)]
#[command(name = "tilecut")]
#[command(version, about, long_about = None, disable_help_flag = true)]
pub struct Cli {
    /// Source map image (PNG)
    pub input: Option<PathBuf>,

    /// Output path; `.png` and `.tmj` are written next to its stem
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Tile width in pixels
    #[arg(short = 'w', long = "width", value_name = "WIDTH")]
    pub tile_width: Option<u32>,

    /// Tile height in pixels
    #[arg(short = 'h', long = "height", value_name = "HEIGHT")]
    pub tile_height: Option<u32>,

    /// Maximum number of distinct tiles [default: 2048]
    #[arg(short = 'c', long = "count", value_name = "TILECOUNT")]
    pub tile_count: Option<u32>,

    /// Fraction of identical pixels for tiles to match [default: 1.0, exact]
    #[arg(short, long, value_name = "SIMILARITY")]
    pub similarity: Option<f32>,

    /// Project manifest (defaults to ./tilecut.yaml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Reject images that are not a multiple of the tile size
    #[arg(long)]
    pub strict: bool,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

impl Cli {
    /// Flags that override manifest settings.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            tile_count: self.tile_count,
            similarity: self.similarity,
            edges: self.strict.then_some(EdgePolicy::Reject),
        }
    }

    /// Conversion request for these flags. An input image is required.
    pub fn convert_args(&self) -> Result<ConvertArgs> {
        let input = self.input.clone().ok_or_else(|| TilecutError::Config {
            message: "No input image given".to_string(),
            help: Some("Pass the source map image, e.g. tilecut map.png -w 16 -h 16".to_string()),
        })?;

        Ok(ConvertArgs {
            input,
            output: self.output.clone(),
            config: self.config.clone(),
            overrides: self.overrides(),
        })
    }
}

/// Hint printed for malformed invocations.
pub fn usage_hint() -> &'static str {
    "tilecut: try 'tilecut --help' for more information"
}
