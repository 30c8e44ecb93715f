use crate::input::{CHIP8_CONVENTIONAL_KEYMAP, CHIP8_LITERAL_KEYMAP};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// front-end settings, taken from the command line
#[derive(Debug, Parser)]
#[command(name = "chip8vm")]
#[command(about = "A CHIP-8 virtual machine in your terminal")]
#[command(
    after_help = "Keys: Esc or Ctrl-C quit, F5 run/pause, F10 step, F11 step while held, F8 reset"
)]
pub struct Config {
    /// ROM image to load at 0x200
    pub rom: PathBuf,

    /// instructions executed per frame
    #[arg(long, default_value_t = 10)]
    pub steps_per_frame: u32,

    /// stop after this many frames instead of waiting for Esc
    #[arg(long)]
    pub frames: Option<u64>,

    /// frames per second; timers count down once per frame. 0 runs unpaced
    #[arg(long, default_value_t = 60)]
    pub frame_rate: u32,

    /// how keyboard keys map onto the hex keypad
    #[arg(long, value_enum, default_value_t = Keymap::Conventional)]
    pub keymap: Keymap,

    /// frames a key stays down after being pressed
    #[arg(long, default_value_t = 6)]
    pub key_hold_frames: u32,

    /// seed for RND, for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// print the program listing and exit
    #[arg(long)]
    pub disassemble: bool,

    /// start paused; F5 runs, F10 steps
    #[arg(long)]
    pub paused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Keymap {
    /// 1234/qwer/asdf/zxcv, shaped like the COSMAC keypad
    Conventional,
    /// 0-9 and a-f
    Literal,
}

impl Keymap {
    pub fn table(&self) -> &'static [(char, u8)] {
        match self {
            Keymap::Conventional => &CHIP8_CONVENTIONAL_KEYMAP,
            Keymap::Literal => &CHIP8_LITERAL_KEYMAP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() -> Result<(), clap::Error> {
        let c = Config::try_parse_from(["chip8vm", "roms/ibm.ch8"])?;
        assert_eq!(c.rom, PathBuf::from("roms/ibm.ch8"));
        assert_eq!(c.steps_per_frame, 10);
        assert_eq!(c.frames, None);
        assert_eq!(c.frame_rate, 60);
        assert_eq!(c.keymap, Keymap::Conventional);
        assert_eq!(c.key_hold_frames, 6);
        assert_eq!(c.seed, None);
        assert!(!c.disassemble);
        assert!(!c.paused);
        Ok(())
    }

    #[test]
    fn test_overrides() -> Result<(), clap::Error> {
        let c = Config::try_parse_from([
            "chip8vm",
            "--steps-per-frame",
            "20",
            "--frames",
            "600",
            "--keymap",
            "literal",
            "--seed",
            "42",
            "--disassemble",
            "--paused",
            "game.ch8",
        ])?;
        assert_eq!(c.steps_per_frame, 20);
        assert_eq!(c.frames, Some(600));
        assert_eq!(c.keymap, Keymap::Literal);
        assert_eq!(c.keymap.table()[0xa], ('a', 0x0a));
        assert_eq!(c.seed, Some(42));
        assert!(c.disassemble);
        assert!(c.paused);
        Ok(())
    }

    #[test]
    fn test_rom_required() {
        assert!(Config::try_parse_from(["chip8vm"]).is_err());
    }
}
