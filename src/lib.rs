//! A CHIP-8 virtual machine.
//!
//! ## Design
//!
//! * one owned VM per run; reset means throwing it away and building another
//! * every register write is explicitly 8-bit (and 12-bit for I), never left
//!   to whatever the host integer does
//! * Fx0A doesn't block: it parks the VM in `RunMode::WaitingForKey` and the
//!   scheduler skips cycles until the keypad reports a press, so pause/quit
//!   still work while waiting
//! * N instructions per frame, timers always exactly one step per frame
//! * display, input and sound sit behind traits, so the interpreter doesn't
//!   need to know how any of them work
//!
//! Model
//!
//! Environment
//!  |-- display, input, sound, rom bytes
//!  |-- interpreter(config)
//!  |    |-- memory (font at 0x050, program at 0x200)
//!  |    |-- video memory (64x32, wraps)
//!  |    |-- keypad
//!  |    `-- cpu state (registers, stack, timers, run mode)
//!  `-- main loop, once per frame
//!       |-- input.poll(keypad) -> pause / reset / quit
//!       |-- interpreter.tick() -> framebuffer snapshot
//!       |-- display.draw(snapshot, paused)
//!       |-- sound.update(sound timer > 0)
//!       `-- sleep to the next frame boundary
pub mod config;
pub mod cpu;
pub mod display;
pub mod environment;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod sound;

pub use error::{Result, VmError};
