use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VmError>;

/// Conditions that stop a VM instance. Unknown opcodes are deliberately not
/// in here; the interpreter logs them and carries on.
#[derive(Debug, Error)]
pub enum VmError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("program is too large ({size} bytes), at most {max} bytes fit")]
    RomTooLarge { size: usize, max: usize },

    #[error("memory access out of bounds at {address:#06x}")]
    MemoryOutOfBounds { address: usize },

    #[error("stack underflow: return at {pc:#06x} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("stack overflow: call nesting exceeds {depth}")]
    StackOverflow { depth: usize },
}
