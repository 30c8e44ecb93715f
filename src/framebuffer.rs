/// CHIP-8 screen width in pixels
pub const CHIP8_SCREEN_WIDTH: usize = 64;
/// CHIP-8 screen height in pixels
pub const CHIP8_SCREEN_HEIGHT: usize = 32;

const CHIP8_PIXEL_COUNT: usize = CHIP8_SCREEN_WIDTH * CHIP8_SCREEN_HEIGHT;

/// Monochrome 64x32 screen, one byte per pixel (0 or 1), row-major.
///
/// Sprites are XORed onto the screen and wrap around both edges, so no
/// coordinate can ever fall outside the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Box<[u8; CHIP8_PIXEL_COUNT]>,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            pixels: Box::new([0u8; CHIP8_PIXEL_COUNT]),
        }
    }

    /// turn every pixel off
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn offset(x: usize, y: usize) -> usize {
        (y % CHIP8_SCREEN_HEIGHT) * CHIP8_SCREEN_WIDTH + (x % CHIP8_SCREEN_WIDTH)
    }

    /// 0 or 1; coordinates wrap like sprite drawing does
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[Self::offset(x, y)]
    }

    /// XOR `sprite` (one byte per row, msb on the left) onto the screen
    /// with its top-left corner at (x, y). Returns true if any lit pixel
    /// was turned off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut collision = false;
        for (row, bits) in sprite.iter().enumerate() {
            for bit in 0..8 {
                let new = (bits >> (7 - bit)) & 0x01;
                let offset = Self::offset(x as usize + bit, y as usize + row);
                let old = self.pixels[offset];
                collision |= old == 1 && new == 1;
                self.pixels[offset] = old ^ new;
            }
        }
        collision
    }

    /// the raw pixels, row-major
    pub fn as_slice(&self) -> &[u8] {
        &self.pixels[..]
    }

    /// coordinates of every lit pixel, for renderers
    pub fn lit_pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, px)| **px == 1)
            .map(|(i, _)| (i % CHIP8_SCREEN_WIDTH, i / CHIP8_SCREEN_WIDTH))
    }
}
