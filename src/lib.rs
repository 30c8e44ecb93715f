//! A CHIP-8 virtual machine.
//!
//! ## Design
//!
//! * the interpreter is a plain state machine: `step()` runs exactly one
//!   instruction and never sleeps, polls or counts time
//! * opcodes are decoded once into an `Instruction` and matched exhaustively,
//!   both for execution and for disassembly
//! * the framebuffer and keypad live inside the interpreter; the outside
//!   world only reads pixels and only writes keys
//! * timers are plain values; whoever owns the clock counts them down
//! * abstract display and input so can plug alternatives; starting with TUI
//!   in-console
//! * nothing is global, so any number of machines can run side by side
//!
//! Model
//!
//! Environment
//!  |-- display, input, config
//!  |-- interpreter
//!  |    |-- memory (font at 0x000, program at 0x200)
//!  |    |-- framebuffer, keyboard
//!  |    `-- registers, index, stack, timers, rng
//!  `-- main loop, once per frame
//!       |-- interpreter.set_keys(input.poll_keys())
//!       |-- apply run controls (pause, single step, reset)
//!       |-- unless paused
//!       |    |-- interpreter.step() x steps_per_frame
//!       |    `-- count delay and sound timers down
//!       |-- display.draw(interpreter.framebuffer())
//!       `-- sleep until the next frame
pub mod config;
pub mod disassembler;
pub mod display;
pub mod environment;
pub mod error;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod keyboard;
pub mod memory;

pub use error::{Chip8Error, Result};
pub use instruction::Instruction;
pub use interpreter::Chip8Interpreter;
