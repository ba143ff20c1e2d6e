//! Timing constants and queue sizes shared by the library and the firmware.

use log::LevelFilter;

/// Length of one integration tick in seconds.
///
/// Can be overridden at build time with `EXPOSURE_STEP_SECS=<n>`.
pub const STEP_SECS: u32 = if let Some(secs) = option_env!("EXPOSURE_STEP_SECS") {
    parse_secs(secs)
} else {
    1
};

pub const DISPLAY_INTERVAL_MS: u32 = 100;
pub const KEYPAD_POLL_MS: u32 = 5;

pub const CHIRP_MS: u32 = 50;
pub const ALERT_TONE_MS: u32 = 1500;
pub const ALERT_PAUSE_MS: u32 = 500;
pub const ALERT_REPEATS: u8 = 3;

/// Symbols the keypad may queue before the state machine drains them.
pub const INPUT_QUEUE_DEPTH: usize = 8;
pub const TONE_QUEUE_DEPTH: usize = 4;
/// Longest keypad entry, control symbol included.
pub const BUFFER_CAPACITY: usize = 16;

/// Consecutive agreeing matrix scans before a key changes state.
pub const DEBOUNCE_SCANS: u8 = 4;

pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;

const fn parse_secs(text: &str) -> u32 {
    let bytes = text.as_bytes();
    assert!(!bytes.is_empty(), "EXPOSURE_STEP_SECS is empty");

    let mut value: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        assert!(byte.is_ascii_digit(), "EXPOSURE_STEP_SECS must be decimal");
        value = value * 10 + (byte - b'0') as u32;
        i += 1;
    }

    assert!(value > 0, "EXPOSURE_STEP_SECS must be positive");
    value
}

/// Timing knobs handed to the long-running tasks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerConfig {
    pub step_secs: u32,
    pub display_interval_ms: u32,
    pub keypad_poll_ms: u32,
    pub chirp_ms: u32,
    pub alert_tone_ms: u32,
    pub alert_pause_ms: u32,
    pub alert_repeats: u8,
}

impl TimerConfig {
    pub const fn new() -> Self {
        Self {
            step_secs: STEP_SECS,
            display_interval_ms: DISPLAY_INTERVAL_MS,
            keypad_poll_ms: KEYPAD_POLL_MS,
            chirp_ms: CHIRP_MS,
            alert_tone_ms: ALERT_TONE_MS,
            alert_pause_ms: ALERT_PAUSE_MS,
            alert_repeats: ALERT_REPEATS,
        }
    }

    /// Tick length in milliseconds, as handed to the delay source.
    pub const fn step_ms(&self) -> u32 {
        self.step_secs.saturating_mul(1000)
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::new()
    }
}
