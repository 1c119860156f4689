use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;

pub const KEY_COUNT: usize = 16;

/// left-hand side of a qwerty keyboard laid over the hex keypad:
///   1 2 3 4      1 2 3 C
///   q w e r  =>  4 5 6 D
///   a s d f      7 8 9 E
///   z x c v      A 0 B F
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// terminals report presses but never releases, so a press counts as held
/// for this many frames
const KEY_HOLD_FRAMES: u8 = 6;

/// State of the 16-key hex keypad as the VM sees it, plus the most recent
/// key-down event (consumed by Fx0A).
#[derive(Debug, Default, Clone)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
    last_pressed: Option<u8>,
}

impl Keypad {
    pub fn new() -> Self {
        Keypad::default()
    }

    pub fn is_down(&self, key: u8) -> bool {
        self.keys[(key & 0x0f) as usize]
    }

    /// a key-down event; always recorded as the latest press
    pub fn press(&mut self, key: u8) {
        let k = key & 0x0f;
        self.keys[k as usize] = true;
        self.last_pressed = Some(k);
    }

    pub fn release(&mut self, key: u8) {
        self.keys[(key & 0x0f) as usize] = false;
    }

    /// level-triggered update for hosts that know real up/down state; only an
    /// up->down transition counts as a press
    pub fn set(&mut self, key: u8, down: bool) {
        if down && !self.is_down(key) {
            self.press(key);
        } else if !down {
            self.release(key);
        }
    }

    pub fn last_pressed(&self) -> Option<u8> {
        self.last_pressed
    }

    pub fn take_last_pressed(&mut self) -> Option<u8> {
        self.last_pressed.take()
    }

    pub fn clear_last_pressed(&mut self) {
        self.last_pressed = None;
    }
}

/// Commands for the controller rather than the VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Pause,
    Reset,
    Quit,
}

/// reads keypresses once per frame
pub trait Input {
    /// bring `keypad` up to date and return any controller commands seen
    /// since the last poll
    fn poll(&mut self, keypad: &mut Keypad) -> Result<Vec<Control>, io::Error>;
}

/// keyboard input from the terminal, using crossterm in raw mode
pub struct TermInput {
    keymap: HashMap<char, u8>,
    held: [u8; KEY_COUNT],
}

impl TermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: [0; KEY_COUNT],
        })
    }

    fn map_key(&self, c: char) -> Option<u8> {
        self.keymap.get(&c.to_ascii_lowercase()).copied()
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn poll(&mut self, keypad: &mut Keypad) -> Result<Vec<Control>, io::Error> {
        let mut controls = Vec::new();
        for h in self.held.iter_mut() {
            *h = h.saturating_sub(1);
        }

        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                match evt.code {
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        controls.push(Control::Quit)
                    }
                    KeyCode::Char(' ') => controls.push(Control::Pause),
                    KeyCode::Enter => controls.push(Control::Reset),
                    KeyCode::Esc => controls.push(Control::Quit),
                    KeyCode::Char(c) => match self.map_key(c) {
                        Some(key) => {
                            keypad.press(key);
                            self.held[key as usize] = KEY_HOLD_FRAMES;
                        }
                        None => log::debug!("can't map {:?} to a keypad key", c),
                    },
                    other => log::trace!("ignoring key {:?}", other),
                }
            }
        }

        for (key, h) in self.held.iter().enumerate() {
            if *h == 0 {
                keypad.release(key as u8);
            }
        }
        Ok(controls)
    }
}

/// one scripted frame of input
#[derive(Debug, Default, Clone)]
pub struct DummyFrame {
    pub keys: Vec<u8>,
    pub controls: Vec<Control>,
}

/// dummy Input implementation for testing: replays frames, then goes quiet
pub struct DummyInput {
    frames: VecDeque<DummyFrame>,
}

impl DummyInput {
    pub fn new(frames: Vec<DummyFrame>) -> Self {
        DummyInput {
            frames: VecDeque::from(frames),
        }
    }
}

impl Input for DummyInput {
    fn poll(&mut self, keypad: &mut Keypad) -> Result<Vec<Control>, io::Error> {
        let frame = self.frames.pop_front().unwrap_or_default();
        for key in 0..KEY_COUNT as u8 {
            keypad.set(key, frame.keys.contains(&key));
        }
        Ok(frame.controls)
    }
}
