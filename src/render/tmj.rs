//! Tiled JSON map (`.tmj`) output.
//!
//! The map file is produced from a fixed text template whose `@` placeholders
//! are replaced literally. Numbers are substituted as-is; strings are JSON
//! escaped first so any file name yields a valid document.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TilecutError};
use crate::tiles::{Generation, IdentifierGrid};
use crate::types::{Colour, TileConfig};

use super::write_png;

/// Tiled release the template was exported from.
pub const TILED_VERSION: &str = "1.11.0";

/// Tileset `columns` value written to every map.
pub const TILESET_COLUMNS: u32 = 16;

const TEMPLATE: &str = r#"{
    "compressionlevel":-1,
    "height":@map_height,
    "infinite":false,
    "layers":[
        {
            "data":[
@data
            ],
            "height":@map_height,
            "id":1,
            "name":"@name",
            "opacity":1,
            "type":"tilelayer",
            "visible":true,
            "width":@map_width,
            "x":0,
            "y":0
        }
    ],
    "nextlayerid":2,
    "nextobjectid":1,
    "orientation":"orthogonal",
    "renderorder":"right-down",
    "tiledversion":"@tiled_version",
    "tileheight":@tile_height,
    "tilesets":[
        {
            "columns":@columns,
            "firstgid":1,
            "image":"@image_file",
            "imageheight":@image_height,
            "imagewidth":@image_width,
            "margin":0,
            "name":"@name",
            "spacing":0,
            "tilecount":@tile_count,
            "tileheight":@tile_height,
            "tilewidth":@tile_width,
            "transparentcolor":"@transparent"
        }
    ],
    "tilewidth":@tile_width,
    "type":"map",
    "version":"1.10",
    "width":@map_width
}
"#;

/// Indentation of each row inside the layer's `data` array.
const DATA_INDENT: &str = "                ";

/// Output path without extension; `.png` and `.tmj` are appended to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputStem {
    stem: PathBuf,
}

impl OutputStem {
    /// Strip the final extension, if any, from `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            stem: path.as_ref().with_extension(""),
        }
    }

    /// Use `output` unless it is missing or names the input itself, in
    /// which case outputs sit next to the input. A default stem whose
    /// tileset would overwrite the input gets a `-map` suffix.
    pub fn resolve(input: &Path, output: Option<&Path>) -> Self {
        match output {
            Some(out) if out != input => Self::new(out),
            _ => {
                let stem = Self::new(input);
                if stem.png_path() == input {
                    Self {
                        stem: stem.with_suffix("-map"),
                    }
                } else {
                    stem
                }
            }
        }
    }

    /// File name of the stem, used for the layer and tileset names.
    pub fn display_name(&self) -> String {
        self.stem
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "map".to_string())
    }

    pub fn png_path(&self) -> PathBuf {
        self.with_suffix(".png")
    }

    pub fn map_path(&self) -> PathBuf {
        self.with_suffix(".tmj")
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut path = self.stem.clone().into_os_string();
        path.push(suffix);
        PathBuf::from(path)
    }
}

/// Everything that goes into one map file.
#[derive(Debug, Clone)]
pub struct MapDocument<'a> {
    pub name: String,
    pub grid: &'a IdentifierGrid,
    pub tile_width: u32,
    pub tile_height: u32,
    pub image_width: u32,
    pub image_height: u32,
    /// Distinct tiles actually stored in the tileset.
    pub tile_count: u32,
    pub transparent_colour: Colour,
}

impl<'a> MapDocument<'a> {
    pub fn new(name: impl Into<String>, generation: &'a Generation, config: &TileConfig) -> Self {
        let image = generation.tileset.image();
        Self {
            name: name.into(),
            grid: &generation.grid,
            tile_width: config.tile_width,
            tile_height: config.tile_height,
            image_width: image.width(),
            image_height: image.height(),
            tile_count: generation.tileset.len(),
            transparent_colour: config.transparent_colour,
        }
    }

    pub fn image_file(&self) -> String {
        format!("{}.png", self.name)
    }
}

/// Render a map document to `.tmj` text.
pub fn render_map(doc: &MapDocument) -> String {
    let fields = [
        ("@data", layer_data(doc.grid)),
        ("@map_width", doc.grid.width().to_string()),
        ("@map_height", doc.grid.height().to_string()),
        ("@tile_width", doc.tile_width.to_string()),
        ("@tile_height", doc.tile_height.to_string()),
        ("@image_width", doc.image_width.to_string()),
        ("@image_height", doc.image_height.to_string()),
        ("@tile_count", doc.tile_count.to_string()),
        ("@columns", TILESET_COLUMNS.to_string()),
        ("@tiled_version", escape_json(TILED_VERSION)),
        ("@transparent", escape_json(&doc.transparent_colour.to_tiled_hex())),
        ("@image_file", escape_json(&doc.image_file())),
        ("@name", escape_json(&doc.name)),
    ];

    fill(TEMPLATE, &fields)
}

/// Replace each `@placeholder` in one pass over the template, so
/// substituted values are never scanned again.
fn fill(template: &str, fields: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(at) = rest.find('@') {
        out.push_str(&rest[..at]);
        let tail = &rest[at..];

        let field = fields
            .iter()
            .filter(|(key, _)| tail.starts_with(key))
            .max_by_key(|(key, _)| key.len());

        match field {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('@');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Layer data rows: comma separated, one grid row per line.
fn layer_data(grid: &IdentifierGrid) -> String {
    grid.rows()
        .map(|row| {
            let ids: Vec<String> = row.iter().map(u32::to_string).collect();
            format!("{}{}", DATA_INDENT, ids.join(", "))
        })
        .collect::<Vec<_>>()
        .join(",\n")
}

/// Escape a value for use between JSON string quotes.
fn escape_json(value: &str) -> String {
    let quoted = serde_json::Value::from(value).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

/// Paths written by `write_map`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFiles {
    /// Tileset image. Always written, since the first tile is reserved.
    pub tileset: PathBuf,
    pub map: PathBuf,
}

/// Write the tileset PNG and the `.tmj` map for a generation.
pub fn write_map(
    generation: &Generation,
    config: &TileConfig,
    stem: &OutputStem,
) -> Result<MapFiles> {
    let map_path = stem.map_path();
    if let Some(parent) = map_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TilecutError::Io {
            path: parent.to_path_buf(),
            message: format!("Failed to create output directory: {}", e),
        })?;
    }

    let tileset = stem.png_path();
    write_png(generation.tileset.image(), &tileset)?;

    let doc = MapDocument::new(stem.display_name(), generation, config);
    fs::write(&map_path, render_map(&doc)).map_err(|e| TilecutError::Io {
        path: map_path.clone(),
        message: format!("Failed to write map: {}", e),
    })?;

    Ok(MapFiles {
        tileset,
        map: map_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{generate, ExactMatcher};
    use image::{Rgba, RgbaImage};
    use pretty_assertions::assert_eq;

    fn red_map() -> Generation {
        let img = RgbaImage::from_pixel(8, 4, Rgba([255, 0, 0, 255]));
        generate(&img, &TileConfig::new(2, 2).with_tile_count(4), &ExactMatcher).unwrap()
    }

    #[test]
    fn test_output_stem_strips_extension() {
        let stem = OutputStem::new("maps/level1.tmj");
        assert_eq!(stem.display_name(), "level1");
        assert_eq!(stem.png_path(), PathBuf::from("maps/level1.png"));
        assert_eq!(stem.map_path(), PathBuf::from("maps/level1.tmj"));
    }

    #[test]
    fn test_output_stem_without_extension() {
        let stem = OutputStem::new("level1");
        assert_eq!(stem.display_name(), "level1");
        assert_eq!(stem.png_path(), PathBuf::from("level1.png"));
    }

    #[test]
    fn test_output_stem_keeps_inner_dots() {
        let stem = OutputStem::new("world.v2/level.1.png");
        assert_eq!(stem.display_name(), "level.1");
        assert_eq!(stem.map_path(), PathBuf::from("world.v2/level.1.tmj"));

        let stem = OutputStem::new("a.b.c");
        assert_eq!(stem.display_name(), "a.b");
        assert_eq!(stem.png_path(), PathBuf::from("a.b.png"));
    }

    #[test]
    fn test_output_stem_resolve() {
        let input = Path::new("art/level1.bmp");
        assert_eq!(OutputStem::resolve(input, None), OutputStem::new("art/level1"));
        assert_eq!(
            OutputStem::resolve(input, Some(input)),
            OutputStem::new("art/level1")
        );
        assert_eq!(
            OutputStem::resolve(input, Some(Path::new("out/world.tmj"))),
            OutputStem::new("out/world")
        );
    }

    #[test]
    fn test_fill_single_pass() {
        let fields = [
            ("@a", "@b".to_string()),
            ("@b", "x".to_string()),
            ("@ab", "long".to_string()),
        ];
        assert_eq!(fill("[@a] [@b] [@ab] [@c]", &fields), "[@b] [x] [long] [@c]");
    }

    #[test]
    fn test_output_stem_resolve_never_targets_png_input() {
        let input = Path::new("art/level1.png");
        let stem = OutputStem::resolve(input, None);
        assert_eq!(stem.display_name(), "level1-map");
        assert_eq!(stem.png_path(), PathBuf::from("art/level1-map.png"));
        assert_eq!(OutputStem::resolve(input, Some(input)), stem);
    }

    #[test]
    fn test_layer_data_rows() {
        let grid = IdentifierGrid::new(3, 2, vec![1, 2, 3, 4, 5, 0]);
        assert_eq!(
            layer_data(&grid),
            format!("{i}1, 2, 3,\n{i}4, 5, 0", i = DATA_INDENT)
        );
    }

    #[test]
    fn test_layer_data_empty_grid() {
        let grid = IdentifierGrid::new(0, 0, vec![]);
        assert_eq!(layer_data(&grid), "");
    }

    #[test]
    fn test_render_map_is_valid_json() {
        let generation = red_map();
        let config = TileConfig::new(2, 2).with_tile_count(4);
        let doc = MapDocument::new("level1", &generation, &config);

        let parsed: serde_json::Value = serde_json::from_str(&render_map(&doc)).unwrap();

        assert_eq!(parsed["width"], 4);
        assert_eq!(parsed["height"], 2);
        assert_eq!(parsed["tilewidth"], 2);
        assert_eq!(parsed["tileheight"], 2);
        assert_eq!(parsed["type"], "map");
        assert_eq!(parsed["version"], "1.10");
        assert_eq!(parsed["tiledversion"], TILED_VERSION);

        let layer = &parsed["layers"][0];
        assert_eq!(layer["name"], "level1");
        assert_eq!(layer["type"], "tilelayer");
        assert_eq!(layer["width"], 4);
        assert_eq!(layer["height"], 2);
        assert_eq!(layer["data"], serde_json::json!([2, 2, 2, 2, 2, 2, 2, 2]));

        let tileset = &parsed["tilesets"][0];
        assert_eq!(tileset["name"], "level1");
        assert_eq!(tileset["image"], "level1.png");
        assert_eq!(tileset["columns"], 16);
        assert_eq!(tileset["firstgid"], 1);
        assert_eq!(tileset["imagewidth"], 4);
        assert_eq!(tileset["imageheight"], 4);
        assert_eq!(tileset["tilecount"], 2);
        assert_eq!(tileset["transparentcolor"], "#ff00ff");
    }

    #[test]
    fn test_render_map_tileset_height_uses_tile_height() {
        let img = RgbaImage::from_pixel(4, 6, Rgba([0, 0, 255, 255]));
        let config = TileConfig::new(4, 3);
        let generation = generate(&img, &config, &ExactMatcher).unwrap();
        let doc = MapDocument::new("tall", &generation, &config);

        let parsed: serde_json::Value = serde_json::from_str(&render_map(&doc)).unwrap();
        assert_eq!(parsed["tilesets"][0]["tilewidth"], 4);
        assert_eq!(parsed["tilesets"][0]["tileheight"], 3);
        assert_eq!(parsed["tileheight"], 3);
    }

    #[test]
    fn test_render_map_escapes_names() {
        let generation = red_map();
        let config = TileConfig::new(2, 2);
        let doc = MapDocument::new(r#"odd "name" @name@data"#, &generation, &config);

        let parsed: serde_json::Value = serde_json::from_str(&render_map(&doc)).unwrap();
        assert_eq!(parsed["layers"][0]["name"], r#"odd "name" @name@data"#);
        assert_eq!(parsed["tilesets"][0]["image"], r#"odd "name" @name@data.png"#);
    }

    #[test]
    fn test_render_map_custom_transparent_colour() {
        let generation = red_map();
        let mut config = TileConfig::new(2, 2);
        config.transparent_colour = Colour::rgb(0x12, 0x34, 0x56);
        let doc = MapDocument::new("c", &generation, &config);

        assert!(render_map(&doc).contains(r##""transparentcolor":"#123456""##));
    }

    #[test]
    fn test_render_map_no_placeholders_left() {
        let generation = red_map();
        let config = TileConfig::new(2, 2);
        let doc = MapDocument::new("level1", &generation, &config);
        assert!(!render_map(&doc).contains('@'));
    }

    #[test]
    fn test_write_map_creates_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let stem = OutputStem::new(dir.path().join("out").join("level1"));
        let generation = red_map();
        let config = TileConfig::new(2, 2).with_tile_count(4);

        let files = write_map(&generation, &config, &stem).unwrap();

        let png = files.tileset;
        assert_eq!(png, dir.path().join("out").join("level1.png"));
        assert_eq!(files.map, dir.path().join("out").join("level1.tmj"));

        let atlas = image::open(&png).unwrap().to_rgba8();
        assert_eq!(atlas.dimensions(), (4, 4));
        assert_eq!(atlas.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(atlas.get_pixel(2, 0).0, [255, 0, 0, 255]);

        let text = fs::read_to_string(&files.map).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["tilesets"][0]["image"], "level1.png");
    }
}
