//! Tile extraction.
//!
//! Slices a source image into fixed-size cells, visited in raster order.
//! Grid dimensions use integer division, so a trailing partial column or
//! row of cells is never visited.

use image::RgbaImage;

/// One cell copied out of the source image.
#[derive(Debug, Clone)]
pub struct Tile {
    pub column: u32,
    pub row: u32,
    pub image: RgbaImage,
}

impl Tile {
    /// Packed RGBA8 bytes, row-major.
    pub fn bytes(&self) -> &[u8] {
        self.image.as_raw()
    }
}

/// A view of a source image as a grid of tiles.
#[derive(Debug, Clone, Copy)]
pub struct TileGrid<'a> {
    image: &'a RgbaImage,
    tile_width: u32,
    tile_height: u32,
}

impl<'a> TileGrid<'a> {
    /// Both tile dimensions must be non-zero.
    pub fn new(image: &'a RgbaImage, tile_width: u32, tile_height: u32) -> Self {
        debug_assert!(tile_width > 0 && tile_height > 0);
        Self {
            image,
            tile_width,
            tile_height,
        }
    }

    /// Number of whole cells per row.
    pub fn columns(&self) -> u32 {
        self.image.width() / self.tile_width
    }

    /// Number of whole cell rows.
    pub fn rows(&self) -> u32 {
        self.image.height() / self.tile_height
    }

    pub fn len(&self) -> usize {
        self.columns() as usize * self.rows() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the image divides evenly into tiles.
    pub fn is_exact(&self) -> bool {
        self.image.width() % self.tile_width == 0 && self.image.height() % self.tile_height == 0
    }

    /// Packed RGBA8 byte length of one tile.
    pub fn tile_len(&self) -> usize {
        self.tile_width as usize * self.tile_height as usize * 4
    }

    /// Copy the cell at (`column`, `row`) into `buf` as packed RGBA8 bytes,
    /// replacing its contents. The cell must lie inside the grid.
    pub fn read_tile(&self, column: u32, row: u32, buf: &mut Vec<u8>) {
        debug_assert!(column < self.columns() && row < self.rows());
        let stride = self.image.width() as usize * 4;
        let span = self.tile_width as usize * 4;
        let left = (column * self.tile_width) as usize * 4;
        let top = (row * self.tile_height) as usize;
        let raw = self.image.as_raw();

        buf.clear();
        for y in top..top + self.tile_height as usize {
            let start = y * stride + left;
            buf.extend_from_slice(&raw[start..start + span]);
        }
    }

    /// Iterate tiles left-to-right, top-to-bottom. Each call starts over.
    pub fn iter(&self) -> Tiles<'a> {
        Tiles {
            grid: *self,
            next: 0,
        }
    }
}

impl<'a> IntoIterator for &TileGrid<'a> {
    type Item = Tile;
    type IntoIter = Tiles<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy raster-order tile iterator.
#[derive(Debug, Clone)]
pub struct Tiles<'a> {
    grid: TileGrid<'a>,
    next: usize,
}

impl Iterator for Tiles<'_> {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        let grid = &self.grid;
        if self.next >= grid.len() {
            return None;
        }

        let column = (self.next % grid.columns() as usize) as u32;
        let row = (self.next / grid.columns() as usize) as u32;
        self.next += 1;

        let image = image::imageops::crop_imm(
            grid.image,
            column * grid.tile_width,
            row * grid.tile_height,
            grid.tile_width,
            grid.tile_height,
        )
        .to_image();

        Some(Tile { column, row, image })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.grid.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Tiles<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// 4x2 image: left 2x2 red, right 2x2 blue.
    fn two_cells() -> RgbaImage {
        RgbaImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    #[test]
    fn test_grid_dimensions() {
        let img = RgbaImage::new(8, 6);
        let grid = TileGrid::new(&img, 2, 3);
        assert_eq!(grid.columns(), 4);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.len(), 8);
        assert!(grid.is_exact());
    }

    #[test]
    fn test_raster_order() {
        let img = RgbaImage::new(6, 4);
        let grid = TileGrid::new(&img, 2, 2);
        let positions: Vec<(u32, u32)> = grid.iter().map(|t| (t.column, t.row)).collect();
        assert_eq!(
            positions,
            vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]
        );
    }

    #[test]
    fn test_tile_pixels_copied_verbatim() {
        let img = two_cells();
        let tiles: Vec<Tile> = TileGrid::new(&img, 2, 2).iter().collect();

        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0].image.dimensions(), (2, 2));
        assert!(tiles[0].image.pixels().all(|p| p.0 == [255, 0, 0, 255]));
        assert!(tiles[1].image.pixels().all(|p| p.0 == [0, 0, 255, 255]));
        assert_eq!(tiles[0].bytes().len(), 2 * 2 * 4);
    }

    #[test]
    fn test_partial_edges_truncated() {
        // 5x3 with 2x2 tiles: one partial column and one partial row dropped
        let img = RgbaImage::new(5, 3);
        let grid = TileGrid::new(&img, 2, 2);
        assert_eq!(grid.columns(), 2);
        assert_eq!(grid.rows(), 1);
        assert!(!grid.is_exact());
        assert_eq!(grid.iter().count(), 2);
    }

    #[test]
    fn test_image_smaller_than_tile() {
        let img = RgbaImage::new(3, 3);
        let grid = TileGrid::new(&img, 4, 4);
        assert!(grid.is_empty());
        assert_eq!(grid.iter().next().map(|t| t.column), None);
    }

    #[test]
    fn test_read_tile_reuses_buffer() {
        let img = RgbaImage::from_fn(6, 4, |x, y| Rgba([x as u8, y as u8, 7, 255]));
        let grid = TileGrid::new(&img, 2, 2);

        let mut buf = Vec::with_capacity(grid.tile_len());
        let capacity = buf.capacity();
        for tile in grid.iter() {
            grid.read_tile(tile.column, tile.row, &mut buf);
            assert_eq!(buf.as_slice(), tile.bytes());
        }
        assert_eq!(buf.len(), grid.tile_len());
        assert_eq!(buf.capacity(), capacity);
    }

    #[test]
    fn test_iter_is_restartable() {
        let img = two_cells();
        let grid = TileGrid::new(&img, 2, 2);

        let first: Vec<Vec<u8>> = grid.iter().map(|t| t.bytes().to_vec()).collect();
        let second: Vec<Vec<u8>> = (&grid).into_iter().map(|t| t.bytes().to_vec()).collect();
        assert_eq!(first, second);
        assert_eq!(grid.iter().len(), 2);
    }
}
