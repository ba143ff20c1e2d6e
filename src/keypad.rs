//! Turns keypad events into queued symbols and feedback chirps.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embedded_hal_async::delay::DelayNs;

use crate::beeper::Beeper;
use crate::config::INPUT_QUEUE_DEPTH;
use crate::symbol::Symbol;

/// Symbols typed but not yet consumed by the state machine.
pub type InputQueue<M> = Channel<M, Symbol, INPUT_QUEUE_DEPTH>;

/// Debounced key transition, carrying the row-major key number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEvent {
    Pressed(u8),
    Released(u8),
}

/// Anything that yields debounced key events.
pub trait KeypadSource {
    fn poll(&mut self) -> Option<KeyEvent>;
}

impl<T: KeypadSource + ?Sized> KeypadSource for &mut T {
    fn poll(&mut self) -> Option<KeyEvent> {
        T::poll(self)
    }
}

pub struct KeypadController<'a, M: RawMutex> {
    input: &'a InputQueue<M>,
    beeper: &'a Beeper<M>,
}

impl<'a, M: RawMutex> KeypadController<'a, M> {
    pub fn new(input: &'a InputQueue<M>, beeper: &'a Beeper<M>) -> Self {
        Self { input, beeper }
    }

    /// Chirps on press and queues the symbol on release. Returns the queued
    /// symbol, if any.
    pub fn handle(&self, event: KeyEvent) -> Option<Symbol> {
        match event {
            KeyEvent::Pressed(_) => {
                self.beeper.chirp();
                None
            }
            KeyEvent::Released(index) => {
                let Some(symbol) = Symbol::from_key_index(index) else {
                    log::warn!("unknown key index {}", index);
                    return None;
                };
                match self.input.try_send(symbol) {
                    Ok(()) => {
                        log::debug!("key {}", symbol);
                        Some(symbol)
                    }
                    Err(_) => {
                        log::warn!("input queue full, dropping {}", symbol);
                        None
                    }
                }
            }
        }
    }

    pub async fn run<K: KeypadSource, D: DelayNs>(
        &self,
        mut keypad: K,
        mut delay: D,
        poll_ms: u32,
    ) -> ! {
        loop {
            if let Some(event) = keypad.poll() {
                self.handle(event);
            }
            delay.delay_ms(poll_ms).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beeper::Tone;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn press_chirps_without_queueing() {
        let input = InputQueue::<NoopRawMutex>::new();
        let beeper = Beeper::new();
        let keypad = KeypadController::new(&input, &beeper);

        assert_eq!(keypad.handle(KeyEvent::Pressed(5)), None);
        assert_eq!(beeper.take_request(), Some(Tone::Chirp));
        assert!(input.is_empty());
    }

    #[test]
    fn release_queues_mapped_symbol() {
        let input = InputQueue::<NoopRawMutex>::new();
        let beeper = Beeper::new();
        let keypad = KeypadController::new(&input, &beeper);

        assert_eq!(keypad.handle(KeyEvent::Released(0)), Some(Symbol::Digit(1)));
        assert_eq!(keypad.handle(KeyEvent::Released(13)), Some(Symbol::Digit(0)));
        assert_eq!(keypad.handle(KeyEvent::Released(14)), Some(Symbol::Hash));
        assert_eq!(beeper.take_request(), None);

        assert_eq!(input.try_receive().ok(), Some(Symbol::Digit(1)));
        assert_eq!(input.try_receive().ok(), Some(Symbol::Digit(0)));
        assert_eq!(input.try_receive().ok(), Some(Symbol::Hash));
    }

    #[test]
    fn unknown_index_is_ignored() {
        let input = InputQueue::<NoopRawMutex>::new();
        let beeper = Beeper::new();
        let keypad = KeypadController::new(&input, &beeper);

        assert_eq!(keypad.handle(KeyEvent::Released(16)), None);
        assert!(input.is_empty());
    }

    #[test]
    fn full_queue_drops_symbol() {
        let input = InputQueue::<NoopRawMutex>::new();
        let beeper = Beeper::new();
        let keypad = KeypadController::new(&input, &beeper);

        for _ in 0..INPUT_QUEUE_DEPTH {
            assert!(keypad.handle(KeyEvent::Released(4)).is_some());
        }
        assert_eq!(keypad.handle(KeyEvent::Released(4)), None);
    }
}
