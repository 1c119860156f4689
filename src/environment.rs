use crate::config::Config;
use crate::display::Display;
use crate::error::VmError;
use crate::input::{Control, Input};
use crate::interpreter::Chip8Interpreter;
use crate::sound::Sound;
use std::error::Error;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Owns the VM and wires it to the outside world: input in, frames and
/// tones out, one tick per frame. Handles pause, reset and quit.
pub struct Environment<'a> {
    rom: Vec<u8>,
    vm: Chip8Interpreter,
    // why the current vm stopped, if it did
    halted: Option<VmError>,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
}

impl<'a> Environment<'a> {
    pub fn new(
        config: Config,
        rom: Vec<u8>,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Result<Self, VmError> {
        let vm = Chip8Interpreter::with_program(config, &rom)?;
        Ok(Environment {
            rom,
            vm,
            halted: None,
            display,
            input,
            sound,
        })
    }

    pub fn vm(&self) -> &Chip8Interpreter {
        &self.vm
    }

    pub fn halted(&self) -> Option<&VmError> {
        self.halted.as_ref()
    }

    /// throw the vm away and start the rom again from scratch
    pub fn reset(&mut self) -> Result<(), VmError> {
        let config = self.vm.config().clone();
        self.vm = Chip8Interpreter::with_program(config, &self.rom)?;
        self.halted = None;
        log::debug!("reset");
        Ok(())
    }

    /// one frame: controls, a vm tick, draw, sound
    pub fn frame(&mut self) -> Result<Flow, Box<dyn Error>> {
        for control in self.input.poll(self.vm.keypad_mut())? {
            match control {
                Control::Pause => self.vm.toggle_pause(),
                Control::Reset => self.reset()?,
                Control::Quit => return Ok(Flow::Quit),
            }
        }

        let paused = self.vm.is_paused();
        if self.halted.is_none() {
            match self.vm.tick() {
                Ok(frame) => self.display.draw(&frame, paused)?,
                Err(e) => {
                    log::error!("vm stopped: {}", e);
                    self.halted = Some(e);
                }
            }
        }
        if self.halted.is_some() {
            // keep showing the last frame until reset or quit
            self.display.draw(&self.vm.video().snapshot(), paused)?;
        }

        let active = self.halted.is_none() && !paused && self.vm.sound_active();
        self.sound.update(active)?;
        Ok(Flow::Continue)
    }

    /// frame after frame, paced to the configured rate, until quit
    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        let frame_time = self.vm.config().frame_duration();
        loop {
            let start = Instant::now();
            if self.frame()? == Flow::Quit {
                break;
            }
            if let Some(rest) = frame_time.checked_sub(start.elapsed()) {
                spin_sleep::sleep(rest);
            }
        }
        self.sound.update(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::RunMode;
    use crate::display::DummyDisplay;
    use crate::input::{DummyFrame, DummyInput};
    use crate::sound::Mute;

    fn config() -> Config {
        Config {
            seed: Some(1),
            ..Config::default()
        }
    }

    fn frames(script: Vec<(Vec<u8>, Vec<Control>)>) -> DummyInput {
        DummyInput::new(
            script
                .into_iter()
                .map(|(keys, controls)| DummyFrame { keys, controls })
                .collect(),
        )
    }

    // v1 = 1; draw "0" at (0, 0); spin
    const DRAW_ROM: [u8; 8] = [0x61, 0x01, 0xa0, 0x50, 0xd0, 0x05, 0x12, 0x06];

    #[test]
    fn test_frame_draws() -> Result<(), Box<dyn Error>> {
        let (mut d, mut i, mut s) = (DummyDisplay::new(), frames(vec![]), Mute::new());
        let mut env = Environment::new(config(), DRAW_ROM.to_vec(), &mut d, &mut i, &mut s)?;
        assert_eq!(env.frame()?, Flow::Continue);
        drop(env);
        assert_eq!(d.frames, 1);
        assert_eq!(d.lit, 14);
        assert!(!d.paused);
        Ok(())
    }

    #[test]
    fn test_pause_and_quit() -> Result<(), Box<dyn Error>> {
        let mut d = DummyDisplay::new();
        let mut i = frames(vec![
            (vec![], vec![Control::Pause]),
            (vec![], vec![Control::Quit]),
        ]);
        let mut s = Mute::new();
        let mut env = Environment::new(config(), DRAW_ROM.to_vec(), &mut d, &mut i, &mut s)?;
        env.frame()?;
        assert!(env.vm().is_paused());
        // nothing ran while paused
        assert_eq!(env.vm().cpu().pc, 0x200);
        assert_eq!(env.frame()?, Flow::Quit);
        drop(env);
        assert!(d.paused);
        Ok(())
    }

    #[test]
    fn test_reset_while_waiting_for_key() -> Result<(), Box<dyn Error>> {
        // v2 = 9; wait for a key into v3
        let rom = vec![0x62, 0x09, 0xf3, 0x0a];
        let mut d = DummyDisplay::new();
        let mut i = frames(vec![(vec![], vec![]), (vec![], vec![Control::Reset])]);
        let mut s = Mute::new();
        let mut env = Environment::new(config(), rom, &mut d, &mut i, &mut s)?;
        env.frame()?;
        assert_eq!(env.vm().run_mode(), RunMode::WaitingForKey(3));
        env.frame()?;
        // fresh vm ran its first frame up to the wait again
        assert_eq!(env.vm().run_mode(), RunMode::WaitingForKey(3));
        assert_eq!(env.vm().cpu().pc, 0x204);
        Ok(())
    }

    #[test]
    fn test_reset_keeps_config() -> Result<(), Box<dyn Error>> {
        let cfg = Config {
            instructions_per_tick: 3,
            stack_depth: 4,
            ..config()
        };
        let mut d = DummyDisplay::new();
        let mut i = frames(vec![(vec![], vec![]), (vec![], vec![Control::Reset])]);
        let mut s = Mute::new();
        // v1 += 1, forever
        let rom = vec![0x71, 0x01, 0x12, 0x00];
        let mut env = Environment::new(cfg.clone(), rom, &mut d, &mut i, &mut s)?;
        env.frame()?;
        assert_eq!(env.vm().cpu().v[1], 2);
        env.frame()?;
        assert_eq!(env.vm().config(), &cfg);
        // the fresh vm still runs three instructions per frame
        assert_eq!(env.vm().cpu().v[1], 2);
        assert_eq!(env.vm().cpu().pc, 0x202);
        Ok(())
    }

    #[test]
    fn test_key_resolves_wait() -> Result<(), Box<dyn Error>> {
        let rom = vec![0xf3, 0x0a, 0x12, 0x02];
        let mut d = DummyDisplay::new();
        let mut i = frames(vec![(vec![], vec![]), (vec![0xe], vec![])]);
        let mut s = Mute::new();
        let mut env = Environment::new(config(), rom, &mut d, &mut i, &mut s)?;
        env.frame()?;
        env.frame()?;
        assert_eq!(env.vm().run_mode(), RunMode::Running);
        assert_eq!(env.vm().cpu().v[3], 0xe);
        Ok(())
    }

    #[test]
    fn test_fatal_error_halts_until_reset() -> Result<(), Box<dyn Error>> {
        // return with nothing on the stack
        let rom = vec![0x00, 0xee];
        let mut d = DummyDisplay::new();
        let mut i = frames(vec![
            (vec![], vec![]),
            (vec![], vec![]),
            (vec![], vec![Control::Reset]),
        ]);
        let mut s = Mute::new();
        let mut env = Environment::new(config(), rom, &mut d, &mut i, &mut s)?;
        env.frame()?;
        assert!(matches!(env.halted(), Some(VmError::StackUnderflow { .. })));
        env.frame()?;
        assert!(env.halted().is_some());
        // reset clears the halt, then the fresh vm trips over the same thing
        env.frame()?;
        assert!(env.halted().is_some());
        drop(env);
        assert_eq!(d.frames, 3);
        Ok(())
    }

    #[test]
    fn test_sound_follows_timer() -> Result<(), Box<dyn Error>> {
        // sound = 2; spin
        let rom = vec![0x61, 0x02, 0xf1, 0x18, 0x12, 0x04];
        let mut d = DummyDisplay::new();
        let mut i = frames(vec![]);
        let mut s = Mute::new();
        let mut env = Environment::new(config(), rom, &mut d, &mut i, &mut s)?;
        env.frame()?;
        // 2 -> 1 after the first tick, still sounding
        assert!(env.vm().sound_active());
        env.frame()?;
        assert!(!env.vm().sound_active());
        drop(env);
        assert!(!s.is_beeping());
        assert_eq!(s.switches, 2);
        Ok(())
    }

    #[test]
    fn test_rom_too_large_rejected() {
        let (mut d, mut i, mut s) = (DummyDisplay::new(), frames(vec![]), Mute::new());
        let res = Environment::new(config(), vec![0; 0xe01], &mut d, &mut i, &mut s);
        assert!(matches!(res, Err(VmError::RomTooLarge { size: 0xe01, max: 0xe00 })));
    }
}
