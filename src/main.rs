use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;

use chip8vm::config::{
    Config, DEFAULT_FRAME_RATE, DEFAULT_INSTRUCTIONS_PER_TICK, DEFAULT_LOG_FILTER,
    DEFAULT_STACK_DEPTH,
};
use chip8vm::display::{TermDisplay, COLUMNS, ROWS};
use chip8vm::environment::Environment;
use chip8vm::input::TermInput;
use chip8vm::sound::{Mute, SimpleBeep, Sound};

/// Run a CHIP-8 program in the terminal.
///
/// Keys 1234/qwer/asdf/zxcv are the hex keypad; space pauses, enter resets,
/// escape quits. Logging is off unless RUST_LOG is set; it goes to stderr
/// (RUST_LOG=debug chip8vm rom.ch8 2>log).
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// the program to load at 0x200
    rom: PathBuf,

    /// instructions per frame
    #[arg(short, long, default_value_t = DEFAULT_INSTRUCTIONS_PER_TICK)]
    speed: usize,

    /// frames per second; the timers count down at this rate
    #[arg(short, long, default_value_t = DEFAULT_FRAME_RATE)]
    fps: u32,

    /// how deep subroutine calls may nest
    #[arg(long, default_value_t = DEFAULT_STACK_DEPTH)]
    stack_depth: usize,

    /// fixed seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,

    /// use the PC speaker rather than staying silent
    #[arg(long)]
    beep: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();

    let args = Args::parse();
    let rom = match fs::read(&args.rom) {
        Ok(rom) => rom,
        Err(e) => {
            eprintln!("usage: chip8vm <ROM>");
            eprintln!("can't read {}: {}", args.rom.display(), e);
            process::exit(1);
        }
    };
    let config = Config {
        instructions_per_tick: args.speed,
        frame_rate: args.fps,
        stack_depth: args.stack_depth,
        seed: args.seed,
    };

    // initialise
    let mut sound: Box<dyn Sound> = if args.beep {
        Box::new(SimpleBeep::new())
    } else {
        Box::new(Mute::new())
    };
    let mut input = TermInput::new()?;
    let mut display = TermDisplay::new(COLUMNS, ROWS)?;

    let halted = {
        let mut env = Environment::new(config, rom, &mut display, &mut input, sound.as_mut())?;
        env.run()?;
        env.halted().map(|e| e.to_string())
    };

    // put the terminal back before saying anything
    drop(display);
    drop(input);
    if let Some(reason) = halted {
        eprintln!("vm stopped: {}", reason);
    }
    Ok(())
}
