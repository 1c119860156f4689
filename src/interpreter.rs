//! # interpreter
//!
//! One cycle:
//!  1. fetch the big-endian word at pc, pc+1
//!  2. pc += 2, before anything else happens (jumps overwrite the new value)
//!  3. decode; unknown words are logged and skipped
//!  4. execute against the cpu state, memory, framebuffer and keypad
//!
//! One tick (one rendered frame):
//!  1. resolve a pending Fx0A if a key went down
//!  2. up to `instructions_per_tick` cycles while running
//!  3. timers down by one unless paused
//!  4. hand back the framebuffer
use crate::config::Config;
use crate::cpu::{CpuState, RunMode};
use crate::display::{Snapshot, VideoMemory};
use crate::error::Result;
use crate::input::Keypad;
use crate::instruction::Instruction;
use crate::memory::{Memory, MemoryMap};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::io;

pub struct Chip8Interpreter {
    config: Config,
    memory: Memory,
    video: VideoMemory,
    keypad: Keypad,
    cpu: CpuState,
    rng: StdRng,
    // addresses already warned about; a program spinning through junk would
    // otherwise log every cycle
    invalid_at: HashSet<u16>,
}

impl Chip8Interpreter {
    pub fn new(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8Interpreter {
            memory: Memory::new(),
            video: VideoMemory::default(),
            keypad: Keypad::new(),
            cpu: CpuState::new(config.stack_depth),
            rng,
            invalid_at: HashSet::new(),
            config,
        }
    }

    /// fresh VM with `program` already at 0x200
    pub fn with_program(config: Config, mut program: &[u8]) -> Result<Self> {
        let mut vm = Chip8Interpreter::new(config);
        vm.load_program(&mut program)?;
        Ok(vm)
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<()> {
        self.memory.load_program(reader)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cpu(&self) -> &CpuState {
        &self.cpu
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn video(&self) -> &VideoMemory {
        &self.video
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    /// the input collaborator refreshes this once per frame
    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.keypad
    }

    pub fn run_mode(&self) -> RunMode {
        self.cpu.mode()
    }

    pub fn is_paused(&self) -> bool {
        self.cpu.is_paused()
    }

    pub fn toggle_pause(&mut self) {
        self.cpu.toggle_pause();
        log::debug!("run mode now {:?}", self.cpu.mode());
    }

    /// the beeper should be on
    pub fn sound_active(&self) -> bool {
        self.cpu.sound > 0
    }

    /// run one frame's worth of instructions, then tick the timers
    pub fn tick(&mut self) -> Result<Snapshot<'_>> {
        if let RunMode::WaitingForKey(x) = self.cpu.mode() {
            if let Some(key) = self.keypad.take_last_pressed() {
                log::debug!("key {:x} -> v{:x}", key, x);
                self.cpu.resolve_key(key);
            }
        }

        for _ in 0..self.config.instructions_per_tick {
            if self.cpu.mode() != RunMode::Running {
                break;
            }
            self.cycle()?;
        }

        if !self.cpu.is_paused() {
            self.cpu.tick_timers();
        }
        Ok(self.video.snapshot())
    }

    /// fetch, decode and execute a single instruction; does nothing unless
    /// running
    pub fn cycle(&mut self) -> Result<()> {
        if self.cpu.mode() != RunMode::Running {
            return Ok(());
        }
        let pc = self.cpu.pc;
        let word = self.memory.get_word(pc)?;
        self.cpu.pc = pc.wrapping_add(2);

        match Instruction::decode(word) {
            Some(ins) => {
                log::trace!("{:#06x}: {:04x} {:?}", pc, word, ins);
                self.execute(ins)
            }
            None => {
                if self.invalid_at.insert(pc) {
                    log::warn!("invalid opcode {:04x} at {:#06x}", word, pc);
                } else {
                    log::trace!("invalid opcode {:04x} at {:#06x} again", word, pc);
                }
                Ok(())
            }
        }
    }

    fn execute(&mut self, ins: Instruction) -> Result<()> {
        use Instruction::*;

        let cpu = &mut self.cpu;
        match ins {
            Cls => self.video.clear(),
            Ret => cpu.pc = cpu.pop()?,
            Jp(nnn) => cpu.pc = nnn,
            Call(nnn) => {
                cpu.push(cpu.pc)?;
                cpu.pc = nnn;
            }
            SeImm(x, kk) => {
                if cpu.v[x] == kk {
                    cpu.skip();
                }
            }
            SneImm(x, kk) => {
                if cpu.v[x] != kk {
                    cpu.skip();
                }
            }
            SeReg(x, y) => {
                if cpu.v[x] == cpu.v[y] {
                    cpu.skip();
                }
            }
            SneReg(x, y) => {
                if cpu.v[x] != cpu.v[y] {
                    cpu.skip();
                }
            }
            LdImm(x, kk) => cpu.v[x] = kk,
            // never touches VF
            AddImm(x, kk) => cpu.v[x] = cpu.v[x].wrapping_add(kk),
            Ld(x, y) => cpu.v[x] = cpu.v[y],
            Or(x, y) => cpu.v[x] |= cpu.v[y],
            And(x, y) => cpu.v[x] &= cpu.v[y],
            Xor(x, y) => cpu.v[x] ^= cpu.v[y],

            // flag first, then the result; with x == F the result wins
            Add(x, y) => {
                let (sum, carry) = cpu.v[x].overflowing_add(cpu.v[y]);
                cpu.set_flag(carry);
                cpu.v[x] = sum;
            }
            Sub(x, y) => {
                let (vx, vy) = (cpu.v[x], cpu.v[y]);
                cpu.set_flag(vx >= vy);
                cpu.v[x] = vx.wrapping_sub(vy);
            }
            Shr(x) => {
                let vx = cpu.v[x];
                cpu.set_flag(vx & 0x01 == 1);
                cpu.v[x] = vx >> 1;
            }
            Subn(x, y) => {
                let (vx, vy) = (cpu.v[x], cpu.v[y]);
                cpu.set_flag(vy >= vx);
                cpu.v[x] = vy.wrapping_sub(vx);
            }
            Shl(x) => {
                let vx = cpu.v[x];
                cpu.set_flag((vx >> 7) & 0x01 == 1);
                cpu.v[x] = vx << 1;
            }

            LdI(nnn) => cpu.set_i(nnn),
            JpV0(nnn) => cpu.pc = nnn + cpu.v[0] as u16,
            Rnd(x, kk) => cpu.v[x] = self.rng.gen::<u8>() & kk,
            Drw(x, y, n) => {
                let (vx, vy) = (cpu.v[x] as usize, cpu.v[y] as usize);
                let sprite = self.memory.get_ro_slice(cpu.i(), n as usize)?;
                let mut collision = false;
                for (row, bits) in sprite.iter().enumerate() {
                    for col in 0..8 {
                        if bits & (0x80 >> col) != 0 {
                            collision |= self.video.set_pixel(vx + col, vy + row);
                        }
                    }
                }
                cpu.set_flag(collision);
            }
            Skp(x) => {
                if self.keypad.is_down(cpu.v[x]) {
                    cpu.skip();
                }
            }
            Sknp(x) => {
                if !self.keypad.is_down(cpu.v[x]) {
                    cpu.skip();
                }
            }
            LdFromDelay(x) => cpu.v[x] = cpu.delay,
            LdKey(x) => {
                // only a press that happens from here on counts
                self.keypad.clear_last_pressed();
                cpu.wait_for_key(x);
                log::debug!("waiting for a key for v{:x}", x);
            }
            LdDelay(x) => cpu.delay = cpu.v[x],
            LdSound(x) => cpu.sound = cpu.v[x],
            AddI(x) => cpu.set_i(cpu.i() + cpu.v[x] as u16),
            LdFont(x) => cpu.set_i(Memory::font_sprite_addr(cpu.v[x])),
            Bcd(x) => {
                let vx = cpu.v[x];
                self.memory
                    .get_rw_slice(cpu.i(), 3)?
                    .copy_from_slice(&[vx / 100, (vx / 10) % 10, vx % 10]);
            }
            Store(x) => {
                self.memory
                    .get_rw_slice(cpu.i(), x + 1)?
                    .copy_from_slice(&cpu.v[..=x]);
            }
            Load(x) => {
                let bytes = self.memory.get_ro_slice(cpu.i(), x + 1)?;
                cpu.v[..=x].copy_from_slice(bytes);
            }
        }
        Ok(())
    }
}
