use crate::error::{Result, VmError};
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents a byte-addressable store. Every access is bounds-checked and an
/// out-of-range address is an error rather than a wrap.
pub trait MemoryMap {
    /// how many bytes are addressable
    fn capacity(&self) -> usize;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]>;

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]>;

    /// copy a chunk of bytes in at `origin`, refusing anything that doesn't
    /// fit completely
    fn load(&mut self, data: &[u8], origin: u16) -> Result<()> {
        let max = self.capacity().saturating_sub(origin as usize);
        if data.len() > max {
            return Err(VmError::RomTooLarge {
                size: data.len(),
                max,
            });
        }
        self.get_rw_slice(origin, data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// write unknown len of data into memory at a particular address
    fn load_any(&mut self, reader: &mut impl io::Read, origin: u16) -> Result<()> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load(&buf, origin)
    }

    fn read_byte(&self, addr: u16) -> Result<u8> {
        Ok(self.get_ro_slice(addr, 1)?[0])
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<()> {
        self.get_rw_slice(addr, 1)?[0] = value;
        Ok(())
    }

    /// get a big-endian two-byte word (instruction fetch)
    fn get_word(&self, addr: u16) -> Result<u16> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }
}

/// how much RAM we have
pub const RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const PROGRAM_ADDR: u16 = 0x0200;

/// where the hex digit sprites live, inside the interpreter area
pub const FONT_ADDR: u16 = 0x0050;

/// bytes per font sprite
pub const FONT_SPRITE_LEN: u16 = 5;

/// CHIP-8 memory map:
///   0x0000-0x01ff  interpreter (font sprites at 0x0050)
///   0x0200-0x0fff  program
///
/// the font area is not write-protected; a program that scribbles over it
/// gets what it asked for
pub struct Memory {
    bytes: Box<[u8]>,
}

impl MemoryMap for Memory {
    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]> {
        let range = checked_range(addr, len, self.bytes.len())?;
        Ok(&self.bytes[range])
    }

    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]> {
        let range = checked_range(addr, len, self.bytes.len())?;
        Ok(&mut self.bytes[range])
    }
}

/// errors carry the address the failed access started at
fn checked_range(addr: u16, len: usize, capacity: usize) -> Result<std::ops::Range<usize>> {
    let a = addr as usize;
    if a + len > capacity {
        return Err(VmError::MemoryOutOfBounds { address: a });
    }
    Ok(a..(a + len))
}

impl Memory {
    /// zeroed RAM with the font baked in
    pub fn new() -> Self {
        let mut bytes = vec![0u8; RAM_SIZE_BYTES].into_boxed_slice();
        let font = FONT_ADDR as usize;
        bytes[font..font + FONT.len()].copy_from_slice(&FONT);
        Memory { bytes }
    }

    /// load a CHIP-8 program at 0x200
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<()> {
        self.load_any(reader, PROGRAM_ADDR)
    }

    /// address of the sprite for hex digit `digit`
    pub fn font_sprite_addr(digit: u8) -> u16 {
        (FONT_ADDR + digit as u16 * FONT_SPRITE_LEN) & 0x0fff
    }
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new()
    }
}

const FONT: [u8; 80] = [
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
