//! # interpreter
//!
//! The CHIP-8 virtual machine proper. It owns memory, the sixteen V
//! registers, the index register, the call stack, both timers and the
//! program counter, and embeds the framebuffer and keypad.
//!
//! Each call to [`Chip8Interpreter::step`] fetches one big-endian opcode at
//! the program counter, decodes it and applies it in full. Nothing here
//! sleeps, polls or counts time:
//!  * timers are only read and written; whoever drives the clock decrements
//!    them (conventionally at 60Hz)
//!  * `Fx0A` "waits" for a key by leaving the program counter where it is,
//!    so the caller's step loop spins on it until the keypad changes
//!  * call stack faults are reported as errors and the faulting step has no
//!    effect, so the machine stays parked on that instruction
use crate::disassembler::{self, DisassembledLine};
use crate::error::{Chip8Error, Result};
use crate::framebuffer::Framebuffer;
use crate::instruction::Instruction;
use crate::keyboard::Keyboard;
use crate::memory::{self, Chip8MemoryMap, MemoryMap, CHIP8_PROGRAM_ADDR};
use log::{debug, log_enabled, trace, warn, Level};
use std::io;

/// V0-VF
pub const CHIP8_REGISTER_COUNT: usize = 16;

/// return address slots; slot 0 is never written, so calls nest 15 deep
pub const CHIP8_STACK_DEPTH: usize = 16;

/// VF doubles as carry, borrow, shifted-out bit and sprite collision
const FLAG: usize = 0xF;

const INSTRUCTION_BYTES: u16 = 2;
const ADDR_MASK: u16 = 0x0FFF;

pub struct Chip8Interpreter {
    memory: Chip8MemoryMap,
    framebuffer: Framebuffer,
    keyboard: Keyboard,
    registers: [u8; CHIP8_REGISTER_COUNT],
    index: u16,
    program_counter: u16,
    stack: [u16; CHIP8_STACK_DEPTH],
    stack_pointer: u8,
    delay_timer: u8,
    sound_timer: u8,
    rng: fastrand::Rng,
}

impl Default for Chip8Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8Interpreter {
    /// a freshly reset machine with a randomly seeded `RND`
    pub fn new() -> Self {
        Self::with_rng(fastrand::Rng::new())
    }

    /// a freshly reset machine whose `RND` sequence is reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(fastrand::Rng::with_seed(seed))
    }

    fn with_rng(rng: fastrand::Rng) -> Self {
        let mut i = Chip8Interpreter {
            memory: Chip8MemoryMap::new(),
            framebuffer: Framebuffer::new(),
            keyboard: Keyboard::new(),
            registers: [0; CHIP8_REGISTER_COUNT],
            index: 0,
            program_counter: 0,
            stack: [0; CHIP8_STACK_DEPTH],
            stack_pointer: 0,
            delay_timer: 0,
            sound_timer: 0,
            rng,
        };
        i.reset();
        i
    }

    /// back to power-on state: memory and stack zeroed, font installed,
    /// pc at 0x200, screen and keypad cleared
    pub fn reset(&mut self) {
        self.memory.reset();
        self.framebuffer.clear();
        self.keyboard.reset();
        self.registers = [0; CHIP8_REGISTER_COUNT];
        self.index = 0;
        self.program_counter = CHIP8_PROGRAM_ADDR;
        self.stack = [0; CHIP8_STACK_DEPTH];
        self.stack_pointer = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;
    }

    /// Reset, then load a chip8 program at 0x200.
    ///
    /// On failure the error is returned but the machine is still usable: it
    /// stays in its reset state with an empty program region.
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize> {
        self.reset();
        match self.memory.load_program(reader) {
            Ok(len) => {
                debug!("loaded {} byte program at {:#05X}", len, CHIP8_PROGRAM_ADDR);
                Ok(len)
            }
            Err(e) => {
                warn!("program not loaded, continuing with empty memory: {}", e);
                Err(e)
            }
        }
    }

    /// Execute exactly one instruction and return it.
    pub fn step(&mut self) -> Result<Instruction> {
        let pc = self.program_counter;
        let opcode = self.memory.get_word(pc);
        let instruction = Instruction::decode(opcode);
        if log_enabled!(Level::Trace) {
            trace!("{:04X} [{:04X}]: {}", pc, opcode, instruction);
        }
        self.program_counter = self.execute(instruction, pc)?;
        Ok(instruction)
    }

    /// apply one instruction fetched from `pc`; returns where to go next.
    /// errors are raised before any state changes.
    fn execute(&mut self, instruction: Instruction, pc: u16) -> Result<u16> {
        let next = pc.wrapping_add(INSTRUCTION_BYTES) & ADDR_MASK;
        let skip = next.wrapping_add(INSTRUCTION_BYTES) & ADDR_MASK;
        let skip_if = |condition: bool| if condition { skip } else { next };
        let v = &mut self.registers;

        let target = match instruction {
            Instruction::Cls => {
                self.framebuffer.clear();
                next
            }
            Instruction::Ret => {
                if self.stack_pointer == 0 {
                    return Err(Chip8Error::StackUnderflow { pc });
                }
                let addr = self.stack[self.stack_pointer as usize];
                self.stack_pointer -= 1;
                addr
            }
            Instruction::Sys { nnn } | Instruction::Jp { nnn } => nnn,
            Instruction::Call { nnn } => {
                if self.stack_pointer as usize >= CHIP8_STACK_DEPTH - 1 {
                    return Err(Chip8Error::StackOverflow { pc });
                }
                self.stack_pointer += 1;
                self.stack[self.stack_pointer as usize] = next;
                nnn
            }
            Instruction::SeVxByte { x, kk } => skip_if(v[x as usize] == kk),
            Instruction::SneVxByte { x, kk } => skip_if(v[x as usize] != kk),
            Instruction::SeVxVy { x, y } => skip_if(v[x as usize] == v[y as usize]),
            Instruction::SneVxVy { x, y } => skip_if(v[x as usize] != v[y as usize]),
            Instruction::LdVxByte { x, kk } => {
                v[x as usize] = kk;
                next
            }
            Instruction::AddVxByte { x, kk } => {
                v[x as usize] = v[x as usize].wrapping_add(kk);
                next
            }
            Instruction::LdVxVy { x, y } => {
                v[x as usize] = v[y as usize];
                next
            }
            Instruction::Or { x, y } => {
                v[x as usize] |= v[y as usize];
                next
            }
            Instruction::And { x, y } => {
                v[x as usize] &= v[y as usize];
                next
            }
            Instruction::Xor { x, y } => {
                v[x as usize] ^= v[y as usize];
                next
            }
            Instruction::AddVxVy { x, y } => {
                let (sum, carry) = v[x as usize].overflowing_add(v[y as usize]);
                v[x as usize] = sum;
                v[FLAG] = carry as u8;
                next
            }
            Instruction::Sub { x, y } => {
                let (vx, vy) = (v[x as usize], v[y as usize]);
                v[FLAG] = (vx > vy) as u8;
                v[x as usize] = vx.wrapping_sub(vy);
                next
            }
            Instruction::Shr { x } => {
                let vx = v[x as usize];
                v[FLAG] = vx & 0x01;
                v[x as usize] = vx >> 1;
                next
            }
            Instruction::Subn { x, y } => {
                let (vx, vy) = (v[x as usize], v[y as usize]);
                v[FLAG] = (vy > vx) as u8;
                v[x as usize] = vy.wrapping_sub(vx);
                next
            }
            Instruction::Shl { x } => {
                let vx = v[x as usize];
                v[FLAG] = (vx >> 7) & 0x01;
                v[x as usize] = vx << 1;
                next
            }
            Instruction::LdI { nnn } => {
                self.index = nnn;
                next
            }
            Instruction::JpV0 { nnn } => nnn.wrapping_add(v[0] as u16) & ADDR_MASK,
            Instruction::Rnd { x, kk } => {
                v[x as usize] = self.rng.u8(..) & kk;
                next
            }
            Instruction::Drw { x, y, n } => {
                let mut rows = [0u8; 15];
                let sprite = &mut rows[..n as usize];
                self.memory.read(self.index, sprite);
                let collision = self.framebuffer.draw_sprite(v[x as usize], v[y as usize], sprite);
                v[FLAG] = collision as u8;
                next
            }
            Instruction::Skp { x } => skip_if(self.keyboard.is_key_pressed(v[x as usize])),
            Instruction::Sknp { x } => skip_if(!self.keyboard.is_key_pressed(v[x as usize])),
            Instruction::LdVxDt { x } => {
                v[x as usize] = self.delay_timer;
                next
            }
            Instruction::LdVxKey { x } => match self.keyboard.lowest_pressed_key() {
                Some(key) => {
                    v[x as usize] = key;
                    next
                }
                // nothing pressed yet; come back to this instruction
                None => pc,
            },
            Instruction::LdDtVx { x } => {
                self.delay_timer = v[x as usize];
                next
            }
            Instruction::LdStVx { x } => {
                self.sound_timer = v[x as usize];
                next
            }
            Instruction::AddIVx { x } => {
                self.index = self.index.wrapping_add(v[x as usize] as u16);
                next
            }
            Instruction::LdFVx { x } => {
                self.index = memory::font_glyph_addr(v[x as usize]);
                next
            }
            Instruction::LdBVx { x } => {
                let value = v[x as usize];
                self.memory
                    .write(&[value / 100, value / 10 % 10, value % 10], self.index);
                next
            }
            Instruction::LdMemVx { x } => {
                self.memory.write(&v[..=x as usize], self.index);
                next
            }
            Instruction::LdVxMem { x } => {
                self.memory.read(self.index, &mut v[..=x as usize]);
                next
            }
            Instruction::Unknown { opcode } => {
                debug!("ignoring unknown opcode {:04X} at {:04X}", opcode, pc);
                next
            }
        };
        Ok(target)
    }

    /// pixel state for renderers, 0 or 1
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.framebuffer.pixel(x, y)
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// press or release one of the 16 keys
    pub fn set_key(&mut self, key: u8, pressed: bool) -> Result<()> {
        self.keyboard.set_key(key, pressed)
    }

    /// set all 16 keys at once, bit n == key n
    pub fn set_keys(&mut self, mask: u16) {
        self.keyboard.set_mask(mask);
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn set_delay_timer(&mut self, value: u8) {
        self.delay_timer = value;
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn set_sound_timer(&mut self, value: u8) {
        self.sound_timer = value;
    }

    /// Vx; the register index is taken modulo 16
    pub fn register(&self, x: u8) -> u8 {
        self.registers[(x & 0x0F) as usize]
    }

    pub fn set_register(&mut self, x: u8, value: u8) {
        self.registers[(x & 0x0F) as usize] = value;
    }

    pub fn registers(&self) -> &[u8; CHIP8_REGISTER_COUNT] {
        &self.registers
    }

    pub fn index_register(&self) -> u16 {
        self.index
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn stack_pointer(&self) -> u8 {
        self.stack_pointer
    }

    pub fn stack(&self) -> &[u16; CHIP8_STACK_DEPTH] {
        &self.stack
    }

    pub fn memory(&self) -> &[u8] {
        self.memory.as_slice()
    }

    /// which instruction slot of the program region pc points at, for
    /// highlighting a listing; None when pc is below the program region
    pub fn instruction_index(&self) -> Option<u16> {
        self.program_counter
            .checked_sub(CHIP8_PROGRAM_ADDR)
            .map(|offset| offset / INSTRUCTION_BYTES)
    }

    /// mnemonic of the instruction at the program counter
    pub fn disassemble_current(&self) -> String {
        disassembler::disassemble(self.memory.get_word(self.program_counter))
    }

    /// listing of every non-zero word in the program region
    pub fn disassemble_program(&self) -> Vec<DisassembledLine> {
        disassembler::disassemble_program(&self.memory)
    }
}
