//! Convert command implementation.
//!
//! Loads a map image, builds the deduplicated tileset and writes the
//! tileset PNG plus the `.tmj` map.

use std::path::{Path, PathBuf};

use crate::error::{Result, TilecutError};
use crate::manifest::{Manifest, Overrides};
use crate::output::{display_path, plural, Printer};
use crate::render::{load_png, write_map, MapFiles, OutputStem};
use crate::tiles::{generate, matcher_for, TileGrid};
use crate::types::EdgePolicy;

/// Inputs for one conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub overrides: Overrides,
}

pub fn run(args: ConvertArgs, printer: &Printer) -> Result<MapFiles> {
    let cwd = std::env::current_dir()?;
    run_in(args, &cwd, printer)
}

/// Run a conversion, looking for the default manifest in `dir`.
pub fn run_in(args: ConvertArgs, dir: &Path, printer: &Printer) -> Result<MapFiles> {
    let (manifest, manifest_path) = Manifest::discover(args.config.as_deref(), dir)?;
    if let Some(path) = &manifest_path {
        printer.info("Manifest", &display_path(path));
    }
    let config = manifest.resolve(&args.overrides)?;

    let input = &args.input;
    let stem = OutputStem::resolve(input, args.output.as_deref());
    if stem.png_path() == *input {
        return Err(TilecutError::Config {
            message: format!("Output would overwrite the source image {}", display_path(input)),
            help: Some("Pass a different output name with -o".to_string()),
        });
    }

    printer.status("Loading", &display_path(input));
    let img = load_png(input)?;

    let cells = TileGrid::new(&img, config.tile_width, config.tile_height);
    printer.info(
        "Analyzed",
        &format!(
            "{}x{} image, {}x{} grid of {}x{} tiles",
            img.width(),
            img.height(),
            cells.columns(),
            cells.rows(),
            config.tile_width,
            config.tile_height
        ),
    );

    if !cells.is_exact() && config.edges == EdgePolicy::Truncate {
        printer.warning(
            "Warning",
            &format!(
                "Image size {}x{} is not a multiple of {}x{}; partial tiles dropped",
                img.width(),
                img.height(),
                config.tile_width,
                config.tile_height
            ),
        );
    }

    let matcher = matcher_for(&config);
    let generation = generate(&img, &config, matcher.as_ref())?;

    printer.status(
        "Generated",
        &format!(
            "{} from {}",
            plural(generation.tileset.len() as usize, "distinct tile", "distinct tiles"),
            plural(cells.len(), "cell", "cells")
        ),
    );

    let unmapped = generation.grid.unmapped();
    if unmapped > 0 {
        printer.warning(
            "Warning",
            &format!(
                "tileset full at {}; {} left unmapped",
                plural(config.tile_count as usize, "tile", "tiles"),
                plural(unmapped, "cell", "cells")
            ),
        );
    }

    let files = write_map(&generation, &config, &stem)?;

    printer.status("Writing", &display_path(&files.tileset));
    printer.status("Writing", &display_path(&files.map));
    printer.info("Finished", &stem.display_name());

    Ok(files)
}
