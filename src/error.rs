use std::io;

/// Everything that can go wrong while loading or running a CHIP-8 program.
/// None of these are fatal to the host; the caller decides what to do.
#[derive(Debug, thiserror::Error)]
pub enum Chip8Error {
    #[error("unable to read program: {0}")]
    ProgramRead(#[from] io::Error),

    #[error("program is too large (at least {size} bytes), max size is {max_size} bytes")]
    ProgramTooLarge { size: usize, max_size: usize },

    #[error("stack overflow: subroutine call at {pc:#05X} exceeds the call stack")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#05X} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("no such key: {key:#X}")]
    InvalidKey { key: u8 },

    #[error("display or input failure: {0}")]
    Frontend(io::Error),
}

pub type Result<T> = std::result::Result<T, Chip8Error>;
