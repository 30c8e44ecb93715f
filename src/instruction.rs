//! Decoding of raw 16-bit opcodes into [`Instruction`] values.
//!
//! Opcodes are split into four nibbles `(op, x, y, n)` plus the derived
//! 12-bit address `nnn` and 8-bit immediate `kk`, then matched once. The
//! interpreter and the disassembler both work on the decoded value.

/// One of the 35 CHIP-8 instructions, or an opcode we don't know.
///
/// `x` and `y` are register indices (0x0-0xF), `kk` an immediate byte,
/// `nnn` a 12-bit address and `n` a sprite height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 0nnn
    Sys { nnn: u16 },
    /// 1nnn
    Jp { nnn: u16 },
    /// 2nnn
    Call { nnn: u16 },
    /// 3xkk
    SeVxByte { x: u8, kk: u8 },
    /// 4xkk
    SneVxByte { x: u8, kk: u8 },
    /// 5xy0
    SeVxVy { x: u8, y: u8 },
    /// 6xkk
    LdVxByte { x: u8, kk: u8 },
    /// 7xkk
    AddVxByte { x: u8, kk: u8 },
    /// 8xy0
    LdVxVy { x: u8, y: u8 },
    /// 8xy1
    Or { x: u8, y: u8 },
    /// 8xy2
    And { x: u8, y: u8 },
    /// 8xy3
    Xor { x: u8, y: u8 },
    /// 8xy4
    AddVxVy { x: u8, y: u8 },
    /// 8xy5
    Sub { x: u8, y: u8 },
    /// 8xy6
    Shr { x: u8 },
    /// 8xy7
    Subn { x: u8, y: u8 },
    /// 8xyE
    Shl { x: u8 },
    /// 9xy0
    SneVxVy { x: u8, y: u8 },
    /// Annn
    LdI { nnn: u16 },
    /// Bnnn
    JpV0 { nnn: u16 },
    /// Cxkk
    Rnd { x: u8, kk: u8 },
    /// Dxyn
    Drw { x: u8, y: u8, n: u8 },
    /// Ex9E
    Skp { x: u8 },
    /// ExA1
    Sknp { x: u8 },
    /// Fx07
    LdVxDt { x: u8 },
    /// Fx0A
    LdVxKey { x: u8 },
    /// Fx15
    LdDtVx { x: u8 },
    /// Fx18
    LdStVx { x: u8 },
    /// Fx1E
    AddIVx { x: u8 },
    /// Fx29
    LdFVx { x: u8 },
    /// Fx33
    LdBVx { x: u8 },
    /// Fx55
    LdMemVx { x: u8 },
    /// Fx65
    LdVxMem { x: u8 },
    /// anything else; executes as a no-op
    Unknown { opcode: u16 },
}

impl Instruction {
    pub fn decode(opcode: u16) -> Self {
        let op = ((opcode & 0xF000) >> 12) as u8;
        let x = ((opcode & 0x0F00) >> 8) as u8;
        let y = ((opcode & 0x00F0) >> 4) as u8;
        let n = (opcode & 0x000F) as u8;
        let nnn = opcode & 0x0FFF;
        let kk = (opcode & 0x00FF) as u8;

        match (op, x, y, n) {
            (0x0, 0x0, 0xE, 0x0) => Instruction::Cls,
            (0x0, 0x0, 0xE, 0xE) => Instruction::Ret,
            (0x0, _, _, _) => Instruction::Sys { nnn },
            (0x1, _, _, _) => Instruction::Jp { nnn },
            (0x2, _, _, _) => Instruction::Call { nnn },
            (0x3, _, _, _) => Instruction::SeVxByte { x, kk },
            (0x4, _, _, _) => Instruction::SneVxByte { x, kk },
            (0x5, _, _, 0x0) => Instruction::SeVxVy { x, y },
            (0x6, _, _, _) => Instruction::LdVxByte { x, kk },
            (0x7, _, _, _) => Instruction::AddVxByte { x, kk },

            (0x8, _, _, 0x0) => Instruction::LdVxVy { x, y },
            (0x8, _, _, 0x1) => Instruction::Or { x, y },
            (0x8, _, _, 0x2) => Instruction::And { x, y },
            (0x8, _, _, 0x3) => Instruction::Xor { x, y },
            (0x8, _, _, 0x4) => Instruction::AddVxVy { x, y },
            (0x8, _, _, 0x5) => Instruction::Sub { x, y },
            (0x8, _, _, 0x6) => Instruction::Shr { x },
            (0x8, _, _, 0x7) => Instruction::Subn { x, y },
            (0x8, _, _, 0xE) => Instruction::Shl { x },
            (0x9, _, _, 0x0) => Instruction::SneVxVy { x, y },

            (0xA, _, _, _) => Instruction::LdI { nnn },
            (0xB, _, _, _) => Instruction::JpV0 { nnn },
            (0xC, _, _, _) => Instruction::Rnd { x, kk },
            (0xD, _, _, _) => Instruction::Drw { x, y, n },

            (0xE, _, 0x9, 0xE) => Instruction::Skp { x },
            (0xE, _, 0xA, 0x1) => Instruction::Sknp { x },
            (0xF, _, 0x0, 0x7) => Instruction::LdVxDt { x },
            (0xF, _, 0x0, 0xA) => Instruction::LdVxKey { x },
            (0xF, _, 0x1, 0x5) => Instruction::LdDtVx { x },
            (0xF, _, 0x1, 0x8) => Instruction::LdStVx { x },
            (0xF, _, 0x1, 0xE) => Instruction::AddIVx { x },
            (0xF, _, 0x2, 0x9) => Instruction::LdFVx { x },
            (0xF, _, 0x3, 0x3) => Instruction::LdBVx { x },
            (0xF, _, 0x5, 0x5) => Instruction::LdMemVx { x },
            (0xF, _, 0x6, 0x5) => Instruction::LdVxMem { x },
            _ => Instruction::Unknown { opcode },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_fixed_opcodes() {
        assert_eq!(Instruction::decode(0x00E0), Instruction::Cls);
        assert_eq!(Instruction::decode(0x00EE), Instruction::Ret);
        assert_eq!(Instruction::decode(0x00E1), Instruction::Sys { nnn: 0x0E1 });
    }

    #[test]
    fn test_decode_operands() {
        assert_eq!(Instruction::decode(0x1ABC), Instruction::Jp { nnn: 0xABC });
        assert_eq!(
            Instruction::decode(0x3A42),
            Instruction::SeVxByte { x: 0xA, kk: 0x42 }
        );
        assert_eq!(
            Instruction::decode(0xD125),
            Instruction::Drw { x: 1, y: 2, n: 5 }
        );
        assert_eq!(Instruction::decode(0x8AB6), Instruction::Shr { x: 0xA });
        assert_eq!(Instruction::decode(0xF733), Instruction::LdBVx { x: 7 });
    }

    #[test]
    fn test_decode_unknown() {
        for opcode in [0x5121, 0x8008, 0x800F, 0x9001, 0xE000, 0xE19F, 0xF000, 0xFFFF] {
            assert_eq!(
                Instruction::decode(opcode),
                Instruction::Unknown { opcode },
                "{:04X}",
                opcode
            );
        }
    }

    #[test]
    fn test_every_opcode_decodes() {
        // 35 known forms; everything else falls through to Unknown
        let known = (0..=u16::MAX)
            .filter(|op| !matches!(Instruction::decode(*op), Instruction::Unknown { .. }))
            .count();
        // 0nnn/1/2/3/4/6/7/A/B/C/D: 11 * 4096; 5,9: 2 * 256; 8: 9 * 256;
        // E: 2 * 16; F: 9 * 16
        assert_eq!(known, 11 * 4096 + 2 * 256 + 9 * 256 + 2 * 16 + 9 * 16);
    }
}
