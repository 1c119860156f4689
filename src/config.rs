use std::time::Duration;

/// how many instructions run per rendered frame
pub const DEFAULT_INSTRUCTIONS_PER_TICK: usize = 10;
/// timers and the renderer both run off this clock
pub const DEFAULT_FRAME_RATE: u32 = 60;
/// nesting limit for 2nnn
pub const DEFAULT_STACK_DEPTH: usize = 16;
/// `env_logger` filter when RUST_LOG is unset; stderr shares the terminal
/// with the TUI, so nothing gets through unless asked for
pub const DEFAULT_LOG_FILTER: &str = "off";

/// Runtime knobs for a VM instance. The CLI builds one of these, tests build
/// them directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub instructions_per_tick: usize,
    pub frame_rate: u32,
    pub stack_depth: usize,
    /// fixed seed for Cxkk; entropy when absent
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            instructions_per_tick: DEFAULT_INSTRUCTIONS_PER_TICK,
            frame_rate: DEFAULT_FRAME_RATE,
            stack_depth: DEFAULT_STACK_DEPTH,
            seed: None,
        }
    }
}

impl Config {
    /// wallclock length of one tick
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }
}
