//! Tile partition of the framebuffer.
//!
//! The image is split into fixed-size rectangular tiles, each rendered
//! start-to-finish by one worker. Tiles are enumerated center-out so a
//! progressive preview resolves the visually important middle of the
//! board first.

/// A rectangular region of the framebuffer, owned exclusively by one
/// worker while it renders.
#[derive(Debug, Clone, Copy)]
pub struct Tile {
    /// X coordinate of the tile's top-left corner.
    pub x: u32,
    /// Y coordinate of the tile's top-left corner.
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position in the render order; also seeds the tile's RNG stream.
    pub index: usize,
}

impl Tile {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Partition a framebuffer into tiles, ordered center-out.
///
/// Edge tiles are clipped to the image, so coverage is exact: every
/// pixel belongs to exactly one tile.
pub fn generate_tiles(width: u32, height: u32, tile_size: u32) -> Vec<Tile> {
    let tile_size = tile_size.max(1);
    let mut tiles = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let tw = tile_size.min(width - x);
            let th = tile_size.min(height - y);
            tiles.push(Tile::new(x, y, tw, th, 0));
            x += tile_size;
        }
        y += tile_size;
    }

    sort_center_out(&mut tiles, width, height);
    for (i, tile) in tiles.iter_mut().enumerate() {
        tile.index = i;
    }
    tiles
}

/// Sort tiles by distance of their center from the image center.
fn sort_center_out(tiles: &mut [Tile], width: u32, height: u32) {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;

    tiles.sort_by(|a, b| {
        let da = (a.x as f32 + a.width as f32 / 2.0 - cx).powi(2)
            + (a.y as f32 + a.height as f32 / 2.0 - cy).powi(2);
        let db = (b.x as f32 + b.width as f32 / 2.0 - cx).powi(2)
            + (b.y as f32 + b.height as f32 / 2.0 - cy).powi(2);
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });
}
