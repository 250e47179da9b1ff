//! RGB framebuffer shared between workers at tile granularity.

use crate::color::Rgb;
use crate::tile::Tile;

/// Destination pixel buffer: width × height × RGB, 8 bits per channel.
///
/// Workers never touch the framebuffer directly while shading; they
/// render a tile to a local buffer and blit it in one short critical
/// section. Tiles never overlap, so a blit can never tear another
/// tile's pixels.
#[derive(Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Framebuffer {
    /// A zero-filled (black) buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 3],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let i = ((y * self.width + x) * 3) as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, c: Rgb) {
        let i = ((y * self.width + x) * 3) as usize;
        self.data[i..i + 3].copy_from_slice(&c);
    }

    /// Copy a fully rendered tile (row-major within the tile) into place.
    pub fn blit_tile(&mut self, tile: &Tile, pixels: &[Rgb]) {
        debug_assert_eq!(pixels.len(), (tile.width * tile.height) as usize);
        for local_y in 0..tile.height {
            for local_x in 0..tile.width {
                let c = pixels[(local_y * tile.width + local_x) as usize];
                self.set_pixel(tile.x + local_x, tile.y + local_y, c);
            }
        }
    }

    /// Raw RGB bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_black() {
        let fb = Framebuffer::new(4, 3);
        assert_eq!(fb.as_bytes().len(), 4 * 3 * 3);
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_set_and_get_pixel() {
        let mut fb = Framebuffer::new(8, 8);
        fb.set_pixel(3, 5, [10, 20, 30]);
        assert_eq!(fb.pixel(3, 5), [10, 20, 30]);
        assert_eq!(fb.pixel(3, 4), [0, 0, 0]);
    }

    #[test]
    fn test_blit_tile_writes_only_its_region() {
        let mut fb = Framebuffer::new(8, 8);
        let tile = Tile::new(2, 2, 3, 2, 0);
        let pixels = vec![[255, 0, 0]; 6];
        fb.blit_tile(&tile, &pixels);

        for y in 0..8 {
            for x in 0..8 {
                let inside = (2..5).contains(&x) && (2..4).contains(&y);
                let expected = if inside { [255, 0, 0] } else { [0, 0, 0] };
                assert_eq!(fb.pixel(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }
}
