//! PNG input and output.
//!
//! Source maps are decoded to RGBA8 regardless of their stored bit depth;
//! tilesets are written back as RGBA8 PNG.

use std::path::Path;

use image::{ImageFormat, RgbaImage};

use crate::error::{Result, TilecutError};

/// Load a source map image.
pub fn load_png(path: &Path) -> Result<RgbaImage> {
    if !path.is_file() {
        return Err(TilecutError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let img = image::open(path).map_err(|e| TilecutError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(img.to_rgba8())
}

/// Write an image to a PNG file.
pub fn write_png(image: &RgbaImage, path: &Path) -> Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| TilecutError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to write PNG: {}", e),
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    #[test]
    fn test_write_png_round_trip() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([255, 0, 255, 128]));

        let dir = tempdir().unwrap();
        let path = dir.path().join("tiles.png");

        write_png(&img, &path).unwrap();
        assert!(path.exists());

        let loaded = load_png(&path).unwrap();
        assert_eq!(loaded.dimensions(), (2, 2));
        assert_eq!(loaded.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(loaded.get_pixel(1, 0).0, [255, 0, 255, 128]);
    }

    #[test]
    fn test_load_png_converts_rgb_to_rgba() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        image::RgbImage::from_pixel(3, 1, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let loaded = load_png(&path).unwrap();
        assert_eq!(loaded.get_pixel(2, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_load_png_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_png(&dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, TilecutError::NotFound { .. }));
    }

    #[test]
    fn test_load_png_not_an_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.png");
        std::fs::write(&path, "not a png").unwrap();

        let err = load_png(&path).unwrap_err();
        assert!(matches!(err, TilecutError::Decode { .. }));
    }

    #[test]
    fn test_write_png_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope").join("tiles.png");
        let img = RgbaImage::new(1, 1);

        let err = write_png(&img, &path).unwrap_err();
        assert!(matches!(err, TilecutError::Io { .. }));
    }
}
