use crate::error::{Result, VmError};
use crate::memory::PROGRAM_ADDR;

/// VF doubles as the carry/borrow/collision flag
pub const FLAG: usize = 0xf;

/// index register holds 12 significant bits
pub const ADDR_MASK: u16 = 0x0fff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Running,
    Paused,
    /// Fx0A is pending; the key goes into this register
    WaitingForKey(usize),
}

/// Registers, program counter, call stack and timers.
#[derive(Debug, Clone)]
pub struct CpuState {
    pub v: [u8; 16],
    i: u16,
    pub pc: u16,
    stack: Vec<u16>,
    stack_depth: usize,
    pub delay: u8,
    pub sound: u8,
    mode: RunMode,
    // what a pause interrupted
    resume: RunMode,
}

impl CpuState {
    pub fn new(stack_depth: usize) -> Self {
        CpuState {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_ADDR,
            stack: Vec::with_capacity(stack_depth),
            stack_depth,
            delay: 0,
            sound: 0,
            mode: RunMode::Running,
            resume: RunMode::Running,
        }
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn set_i(&mut self, value: u16) {
        self.i = value & ADDR_MASK;
    }

    pub fn set_flag(&mut self, set: bool) {
        self.v[FLAG] = set as u8;
    }

    /// pc += 2, i.e. step over the next instruction
    pub fn skip(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    pub fn push(&mut self, addr: u16) -> Result<()> {
        if self.stack.len() >= self.stack_depth {
            return Err(VmError::StackOverflow {
                depth: self.stack_depth,
            });
        }
        self.stack.push(addr);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16> {
        self.stack
            .pop()
            .ok_or(VmError::StackUnderflow {
                pc: self.pc.wrapping_sub(2),
            })
    }

    pub fn stack(&self) -> &[u16] {
        &self.stack
    }

    /// one 60Hz tick of both timers
    pub fn tick_timers(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn is_paused(&self) -> bool {
        self.mode == RunMode::Paused
    }

    pub fn wait_for_key(&mut self, register: usize) {
        self.mode = RunMode::WaitingForKey(register);
    }

    /// a key arrived: store it and carry on
    pub fn resolve_key(&mut self, key: u8) {
        if let RunMode::WaitingForKey(x) = self.mode {
            self.v[x] = key;
            self.mode = RunMode::Running;
        }
    }

    /// pause, or go back to whatever the pause interrupted
    pub fn toggle_pause(&mut self) {
        if self.mode == RunMode::Paused {
            self.mode = self.resume;
        } else {
            self.resume = self.mode;
            self.mode = RunMode::Paused;
        }
    }
}
