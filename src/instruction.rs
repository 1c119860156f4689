//! # instruction
//!
//! Decoding of the 16-bit instruction word. Fields follow the usual
//! notation: `x`/`y` select registers, `kk` is the low byte, `nnn` the low 12
//! bits and `n` the low nibble.

/// The four nibbles of an instruction word, plus the wider fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub b1: u8,
    pub b2: u8,
    pub b3: u8,
    pub b4: u8,
    pub kk: u8,
    pub nnn: u16,
}

impl From<u16> for Opcode {
    fn from(word: u16) -> Self {
        Opcode {
            b1: ((word & 0xf000) >> 12) as u8,
            b2: ((word & 0x0f00) >> 8) as u8,
            b3: ((word & 0x00f0) >> 4) as u8,
            b4: (word & 0x000f) as u8,
            kk: (word & 0x00ff) as u8,
            nnn: word & 0x0fff,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1nnn
    Jp(u16),
    /// 2nnn
    Call(u16),
    /// 3xkk
    SeImm(usize, u8),
    /// 4xkk
    SneImm(usize, u8),
    /// 5xy0
    SeReg(usize, usize),
    /// 6xkk
    LdImm(usize, u8),
    /// 7xkk
    AddImm(usize, u8),
    /// 8xy0
    Ld(usize, usize),
    /// 8xy1
    Or(usize, usize),
    /// 8xy2
    And(usize, usize),
    /// 8xy3
    Xor(usize, usize),
    /// 8xy4
    Add(usize, usize),
    /// 8xy5
    Sub(usize, usize),
    /// 8xy6
    Shr(usize),
    /// 8xy7
    Subn(usize, usize),
    /// 8xyE
    Shl(usize),
    /// 9xy0
    SneReg(usize, usize),
    /// Annn
    LdI(u16),
    /// Bnnn
    JpV0(u16),
    /// Cxkk
    Rnd(usize, u8),
    /// Dxyn
    Drw(usize, usize, u8),
    /// Ex9E
    Skp(usize),
    /// ExA1
    Sknp(usize),
    /// Fx07
    LdFromDelay(usize),
    /// Fx0A
    LdKey(usize),
    /// Fx15
    LdDelay(usize),
    /// Fx18
    LdSound(usize),
    /// Fx1E
    AddI(usize),
    /// Fx29
    LdFont(usize),
    /// Fx33
    Bcd(usize),
    /// Fx55
    Store(usize),
    /// Fx65
    Load(usize),
}

impl Instruction {
    /// None for anything outside the base instruction set
    pub fn decode(word: u16) -> Option<Instruction> {
        use Instruction::*;

        let op = Opcode::from(word);
        let x = op.b2 as usize;
        let y = op.b3 as usize;
        let ins = match (op.b1, op.b4) {
            (0x0, _) => match op.nnn {
                0x0e0 => Cls,
                0x0ee => Ret,
                _ => return None,
            },
            (0x1, _) => Jp(op.nnn),
            (0x2, _) => Call(op.nnn),
            (0x3, _) => SeImm(x, op.kk),
            (0x4, _) => SneImm(x, op.kk),
            (0x5, 0x0) => SeReg(x, y),
            (0x6, _) => LdImm(x, op.kk),
            (0x7, _) => AddImm(x, op.kk),
            (0x8, 0x0) => Ld(x, y),
            (0x8, 0x1) => Or(x, y),
            (0x8, 0x2) => And(x, y),
            (0x8, 0x3) => Xor(x, y),
            (0x8, 0x4) => Add(x, y),
            (0x8, 0x5) => Sub(x, y),
            (0x8, 0x6) => Shr(x),
            (0x8, 0x7) => Subn(x, y),
            (0x8, 0xe) => Shl(x),
            (0x9, 0x0) => SneReg(x, y),
            (0xa, _) => LdI(op.nnn),
            (0xb, _) => JpV0(op.nnn),
            (0xc, _) => Rnd(x, op.kk),
            (0xd, n) => Drw(x, y, n),
            (0xe, _) => match op.kk {
                0x9e => Skp(x),
                0xa1 => Sknp(x),
                _ => return None,
            },
            (0xf, _) => match op.kk {
                0x07 => LdFromDelay(x),
                0x0a => LdKey(x),
                0x15 => LdDelay(x),
                0x18 => LdSound(x),
                0x1e => AddI(x),
                0x29 => LdFont(x),
                0x33 => Bcd(x),
                0x55 => Store(x),
                0x65 => Load(x),
                _ => return None,
            },
            _ => return None,
        };
        Some(ins)
    }
}
