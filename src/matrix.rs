//! Row/column keypad scanning with per-key debouncing.

use embedded_hal::digital::{InputPin, OutputPin};
use heapless::Deque;

use crate::config::DEBOUNCE_SCANS;
use crate::keypad::{KeyEvent, KeypadSource};

const EVENT_QUEUE: usize = 8;

#[derive(Clone, Copy, Debug, Default)]
struct KeyState {
    pressed: bool,
    streak: u8,
}

impl KeyState {
    /// Returns the new state once `raw` has disagreed with the stable state
    /// for `threshold` scans in a row.
    fn update(&mut self, raw: bool, threshold: u8) -> Option<bool> {
        if raw == self.pressed {
            self.streak = 0;
            return None;
        }
        self.streak = self.streak.saturating_add(1);
        if self.streak < threshold {
            return None;
        }
        self.pressed = raw;
        self.streak = 0;
        Some(raw)
    }
}

/// Keypad wired as driven rows and pulled-up columns. A row is driven low
/// while its columns are read; a low column means the key is down.
pub struct KeyMatrix<R, C, const ROWS: usize, const COLS: usize> {
    rows: [R; ROWS],
    cols: [C; COLS],
    keys: [[KeyState; COLS]; ROWS],
    events: Deque<KeyEvent, EVENT_QUEUE>,
    debounce: u8,
}

impl<R: OutputPin, C: InputPin, const ROWS: usize, const COLS: usize> KeyMatrix<R, C, ROWS, COLS> {
    pub fn new(mut rows: [R; ROWS], cols: [C; COLS]) -> Self {
        for row in rows.iter_mut() {
            drive(row, true);
        }
        Self {
            rows,
            cols,
            keys: [[KeyState::default(); COLS]; ROWS],
            events: Deque::new(),
            debounce: DEBOUNCE_SCANS,
        }
    }

    pub fn with_debounce(mut self, scans: u8) -> Self {
        self.debounce = scans.max(1);
        self
    }

    /// Samples every key once and queues the transitions that settled.
    pub fn scan(&mut self) {
        for (r, row) in self.rows.iter_mut().enumerate() {
            drive(row, false);
            for (c, col) in self.cols.iter_mut().enumerate() {
                let raw = col.is_low().unwrap_or_else(|err| {
                    log::warn!("keypad column pin error: {:?}", err);
                    false
                });
                if let Some(pressed) = self.keys[r][c].update(raw, self.debounce) {
                    let index = (r * COLS + c) as u8;
                    let event = if pressed {
                        KeyEvent::Pressed(index)
                    } else {
                        KeyEvent::Released(index)
                    };
                    if self.events.push_back(event).is_err() {
                        log::warn!("key event queue full, dropping {:?}", event);
                    }
                }
            }
            drive(row, true);
        }
    }

    pub fn release(self) -> ([R; ROWS], [C; COLS]) {
        (self.rows, self.cols)
    }
}

impl<R: OutputPin, C: InputPin, const ROWS: usize, const COLS: usize> KeypadSource
    for KeyMatrix<R, C, ROWS, COLS>
{
    fn poll(&mut self) -> Option<KeyEvent> {
        if self.events.is_empty() {
            self.scan();
        }
        self.events.pop_front()
    }
}

fn drive<R: OutputPin>(row: &mut R, high: bool) {
    let result = if high { row.set_high() } else { row.set_low() };
    if let Err(err) = result {
        log::warn!("keypad row pin error: {:?}", err);
    }
}
