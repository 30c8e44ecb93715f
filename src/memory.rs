use crate::error::{Chip8Error, Result};
use std::io::{self, Read};

// NB. addresses are u16 as per the chip-8 and always masked to 12 bits;
//     lengths are usize to stop endless casting

/// Represents the addressable memory of the machine
pub trait MemoryMap {
    /// read one byte; the address wraps around the end of memory
    fn read_byte(&self, addr: u16) -> u8;

    /// write one byte; the address wraps around the end of memory
    fn write_byte(&mut self, addr: u16, value: u8);

    /// get a big-endian two-byte word (an instruction)
    fn get_word(&self, addr: u16) -> u16 {
        ((self.read_byte(addr) as u16) << 8) | (self.read_byte(addr.wrapping_add(1)) as u16)
    }

    /// write a chunk of bytes starting at addr, wrapping if needed
    fn write(&mut self, data: &[u8], addr: u16) {
        for (offset, byte) in data.iter().enumerate() {
            self.write_byte(addr.wrapping_add(offset as u16), *byte);
        }
    }

    /// fill buf with the bytes starting at addr, wrapping if needed
    fn read(&self, addr: u16, buf: &mut [u8]) {
        for (offset, byte) in buf.iter_mut().enumerate() {
            *byte = self.read_byte(addr.wrapping_add(offset as u16));
        }
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded; everything below is reserved for the
/// interpreter (and the font)
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// largest program that fits between the program address and the top of RAM
pub const CHIP8_MAX_PROGRAM_BYTES: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

const CHIP8_ADDR_MASK: u16 = 0x0fff;

/// where the hex digit glyphs live
pub const CHIP8_FONT_ADDR: u16 = 0x000;

/// bytes per font glyph
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// Defines the CHIP-8 standard 4K memory map:
///   0x0000-0x004f  font (16 glyphs x 5 bytes)
///   0x0050-0x01ff  reserved
///   0x0200-0x0fff  program
pub struct Chip8MemoryMap {
    bytes: Box<[u8; CHIP8_RAM_SIZE_BYTES]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn read_byte(&self, addr: u16) -> u8 {
        self.bytes[(addr & CHIP8_ADDR_MASK) as usize]
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        self.bytes[(addr & CHIP8_ADDR_MASK) as usize] = value;
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8MemoryMap {
    /// zeroed memory with the font installed
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: Box::new([0u8; CHIP8_RAM_SIZE_BYTES]),
        };
        mm.reset();
        mm
    }

    /// zero everything and reinstall the font
    pub fn reset(&mut self) {
        self.bytes.fill(0);
        self.write(&CHIP8_FONT, CHIP8_FONT_ADDR);
    }

    /// load a CHIP-8 program at 0x200. The whole image is read before
    /// anything is written, so a failed load leaves memory untouched.
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize> {
        // one byte past the limit is enough to know the image won't fit
        let mut buf = Vec::with_capacity(CHIP8_MAX_PROGRAM_BYTES);
        let len = reader
            .by_ref()
            .take(CHIP8_MAX_PROGRAM_BYTES as u64 + 1)
            .read_to_end(&mut buf)?;
        if len > CHIP8_MAX_PROGRAM_BYTES {
            return Err(Chip8Error::ProgramTooLarge {
                size: len,
                max_size: CHIP8_MAX_PROGRAM_BYTES,
            });
        }
        self.write(&buf, CHIP8_PROGRAM_ADDR);
        Ok(len)
    }

    /// the whole of memory, for inspection
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..]
    }
}

/// glyph address of a hex digit
pub fn font_glyph_addr(digit: u8) -> u16 {
    CHIP8_FONT_ADDR + digit as u16 * CHIP8_FONT_GLYPH_BYTES
}

#[rustfmt::skip]
const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        // NB. memory is zeroed from 0x50 because before that we bake in the font
        assert!(m.bytes[0x50..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_font_installed_at_zero() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.bytes[..5], [0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(m.bytes[0x4b..0x50], [0xF0, 0x80, 0xF0, 0x80, 0x80]);
        assert_eq!(font_glyph_addr(0xa), 50);
    }

    #[test]
    fn test_write_slice_ok() {
        let mut dst = Chip8MemoryMap::new();
        dst.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x308);
        let mut buf = [0xffu8; 16];
        dst.read(0x300, &mut buf);
        assert_eq!(buf, [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_read_word() {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x200);
        assert_eq!(m.get_word(0x204), 0x0405);
    }

    #[test]
    fn test_addresses_wrap() {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0xaa, 0xbb, 0xcc], 0x0fff);
        assert_eq!(m.read_byte(0x0fff), 0xaa);
        assert_eq!(m.read_byte(0x0000), 0xbb);
        assert_eq!(m.read_byte(0x1001), 0xcc);
        assert_eq!(m.get_word(0x0fff), 0xaabb);
    }

    #[test]
    fn test_program_load_ok() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        assert_eq!(dst.load_program(&mut prog)?, 2);
        assert_eq!(dst.get_word(0x200), 0x00e0);
        Ok(())
    }

    #[test]
    fn test_program_fills_memory_exactly() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        let image = vec![0x12; CHIP8_MAX_PROGRAM_BYTES];
        dst.load_program(&mut image.as_slice())?;
        assert_eq!(dst.read_byte(0x0fff), 0x12);
        assert_eq!(dst.read_byte(0x0000), 0xF0);
        Ok(())
    }

    #[test]
    fn test_program_too_large_rejected() {
        let mut dst = Chip8MemoryMap::new();
        let image = vec![0x12; CHIP8_MAX_PROGRAM_BYTES + 1];
        let err = dst.load_program(&mut image.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            Chip8Error::ProgramTooLarge {
                size: 3585,
                max_size: 3584
            }
        ));
        // nothing was written, font intact
        assert_eq!(dst.read_byte(0x200), 0);
        assert_eq!(dst.read_byte(0x000), 0xF0);
    }

    /// endless ROM source that counts what it hands out
    struct Endless {
        consumed: usize,
    }

    impl io::Read for Endless {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            buf.fill(0x12);
            self.consumed += buf.len();
            Ok(buf.len())
        }
    }

    #[test]
    fn test_endless_program_read_is_bounded() {
        let mut dst = Chip8MemoryMap::new();
        let mut src = Endless { consumed: 0 };
        let err = dst.load_program(&mut src).unwrap_err();
        assert!(matches!(
            err,
            Chip8Error::ProgramTooLarge {
                size: 3585,
                max_size: 3584
            }
        ));
        assert!(src.consumed <= CHIP8_MAX_PROGRAM_BYTES + 1);
        assert_eq!(dst.read_byte(0x200), 0);
    }
}
