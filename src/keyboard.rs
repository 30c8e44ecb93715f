use crate::error::{Chip8Error, Result};

/// number of keys on the COSMAC hex keypad
pub const CHIP8_KEY_COUNT: u8 = 16;

/// The hex keypad, as a bitmask with one bit per key (bit n == key n).
/// Only the input side ever changes it; the interpreter just asks questions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Keyboard {
    mask: u16,
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard { mask: 0 }
    }

    pub fn reset(&mut self) {
        self.mask = 0;
    }

    /// press or release a single key
    pub fn set_key(&mut self, key: u8, pressed: bool) -> Result<()> {
        if key >= CHIP8_KEY_COUNT {
            return Err(Chip8Error::InvalidKey { key });
        }
        if pressed {
            self.mask |= 1 << key;
        } else {
            self.mask &= !(1 << key);
        }
        Ok(())
    }

    /// replace the state of all 16 keys at once
    pub fn set_mask(&mut self, mask: u16) {
        self.mask = mask;
    }

    pub fn mask(&self) -> u16 {
        self.mask
    }

    pub fn is_any_key_pressed(&self) -> bool {
        self.mask != 0
    }

    /// keys outside 0x0-0xF are never pressed
    pub fn is_key_pressed(&self, key: u8) -> bool {
        key < CHIP8_KEY_COUNT && (self.mask >> key) & 0x01 != 0
    }

    /// lowest-numbered key that is down, if any
    pub fn lowest_pressed_key(&self) -> Option<u8> {
        (0..CHIP8_KEY_COUNT).find(|key| (self.mask >> key) & 0x01 != 0)
    }
}
