use crate::instruction::Instruction;
use crate::memory::{MemoryMap, CHIP8_PROGRAM_ADDR, CHIP8_RAM_SIZE_BYTES};
use std::fmt;

/// text shown for opcodes that don't decode
pub const UNKNOWN_MNEMONIC: &str = "-- Unknown --";

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Cls => write!(f, "CLS"),
            Instruction::Ret => write!(f, "RET"),
            Instruction::Sys { nnn } => write!(f, "SYS  {:X}", nnn),
            Instruction::Jp { nnn } => write!(f, "JMP  {:X}", nnn),
            Instruction::Call { nnn } => write!(f, "CALL {:X}", nnn),
            Instruction::SeVxByte { x, kk } => write!(f, "SE   V{:X}, {:X}", x, kk),
            Instruction::SneVxByte { x, kk } => write!(f, "SNE  V{:X}, {:X}", x, kk),
            Instruction::SeVxVy { x, y } => write!(f, "SE   V{:X}, V{:X}", x, y),
            Instruction::LdVxByte { x, kk } => write!(f, "LD   V{:X}, {:X}", x, kk),
            Instruction::AddVxByte { x, kk } => write!(f, "ADD  V{:X}, {:X}", x, kk),
            Instruction::LdVxVy { x, y } => write!(f, "LD   V{:X}, V{:X}", x, y),
            Instruction::Or { x, y } => write!(f, "OR   V{:X}, V{:X}", x, y),
            Instruction::And { x, y } => write!(f, "AND  V{:X}, V{:X}", x, y),
            Instruction::Xor { x, y } => write!(f, "XOR  V{:X}, V{:X}", x, y),
            Instruction::AddVxVy { x, y } => write!(f, "ADD  V{:X}, V{:X}", x, y),
            Instruction::Sub { x, y } => write!(f, "SUB  V{:X}, V{:X}", x, y),
            Instruction::Shr { x } => write!(f, "SHR  V{:X}", x),
            Instruction::Subn { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Instruction::Shl { x } => write!(f, "SHL  V{:X}", x),
            Instruction::SneVxVy { x, y } => write!(f, "SNE  V{:X}, V{:X}", x, y),
            Instruction::LdI { nnn } => write!(f, "LD   I, {:X}", nnn),
            Instruction::JpV0 { nnn } => write!(f, "JMP  V0, {:X}", nnn),
            Instruction::Rnd { x, kk } => write!(f, "RND  V{:X}, {:X}", x, kk),
            Instruction::Drw { x, y, n } => write!(f, "DRW  V{:X}, V{:X}, {:X}", x, y, n),
            Instruction::Skp { x } => write!(f, "SKP  V{:X}", x),
            Instruction::Sknp { x } => write!(f, "SKNP V{:X}", x),
            Instruction::LdVxDt { x } => write!(f, "LD   V{:X}, DT", x),
            Instruction::LdVxKey { x } => write!(f, "LD   V{:X}, KEY", x),
            Instruction::LdDtVx { x } => write!(f, "LD   DT, V{:X}", x),
            Instruction::LdStVx { x } => write!(f, "LD   ST, V{:X}", x),
            Instruction::AddIVx { x } => write!(f, "ADD  I, V{:X}", x),
            Instruction::LdFVx { x } => write!(f, "LD   F, V{:X}", x),
            Instruction::LdBVx { x } => write!(f, "LD   B, V{:X}", x),
            Instruction::LdMemVx { x } => write!(f, "LD   [I], V{:X}", x),
            Instruction::LdVxMem { x } => write!(f, "LD   V{:X}, [I]", x),
            Instruction::Unknown { .. } => f.write_str(UNKNOWN_MNEMONIC),
        }
    }
}

/// mnemonic for a raw opcode
pub fn disassemble(opcode: u16) -> String {
    Instruction::decode(opcode).to_string()
}

/// one line of a program listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassembledLine {
    pub address: u16,
    pub opcode: u16,
    pub mnemonic: String,
}

impl fmt::Display for DisassembledLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X} [{:04X}]: {}", self.address, self.opcode, self.mnemonic)
    }
}

/// Walk the program region two bytes at a time and disassemble every word
/// that isn't zero. Memory is only read.
pub fn disassemble_program(memory: &impl MemoryMap) -> Vec<DisassembledLine> {
    (CHIP8_PROGRAM_ADDR..CHIP8_RAM_SIZE_BYTES as u16)
        .step_by(2)
        .filter_map(|address| {
            let opcode = memory.get_word(address);
            (opcode != 0).then(|| DisassembledLine {
                address,
                opcode,
                mnemonic: disassemble(opcode),
            })
        })
        .collect()
}
