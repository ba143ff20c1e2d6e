//! Buzzer feedback. Callers queue tones and return immediately; a single
//! long-running task plays them one after another.
//!
//! Chirps go through a bounded queue and are dropped when it is full. The
//! alert is posted on its own signal, so queued chirps can never block it,
//! and it plays before any chirp still waiting.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_futures::select::{select, Either};
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

use crate::config::{TimerConfig, TONE_QUEUE_DEPTH};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    /// Short keypress feedback.
    Chirp,
    /// Repeated long tone announcing the target was reached.
    Alert,
}

#[derive(Clone, Copy, Default)]
struct AlertCount {
    issued: u32,
    completed: u32,
}

/// Tone requests shared between the requesting tasks and the player.
pub struct Beeper<M: RawMutex> {
    chirps: Channel<M, Tone, TONE_QUEUE_DEPTH>,
    alert_pending: Signal<M, ()>,
    alerts: Mutex<M, Cell<AlertCount>>,
    finished: Signal<M, ()>,
}

impl<M: RawMutex> Beeper<M> {
    pub const fn new() -> Self {
        Self {
            chirps: Channel::new(),
            alert_pending: Signal::new(),
            alerts: Mutex::new(Cell::new(AlertCount {
                issued: 0,
                completed: 0,
            })),
            finished: Signal::new(),
        }
    }

    /// Queues a keypress chirp. Returns `false` if the queue was full and the
    /// chirp was dropped.
    pub fn chirp(&self) -> bool {
        match self.chirps.try_send(Tone::Chirp) {
            Ok(()) => true,
            Err(_) => {
                log::warn!("tone queue full, dropping chirp");
                false
            }
        }
    }

    /// Requests the alert pattern and hands back a handle that resolves once
    /// it has played.
    ///
    /// Alerts requested before the player picks one up share one playback.
    pub fn alert(&self) -> AlertHandle<'_, M> {
        let ticket = self.alerts.lock(|alerts| {
            let mut count = alerts.get();
            count.issued = count.issued.wrapping_add(1);
            alerts.set(count);
            count.issued
        });
        self.alert_pending.signal(());
        AlertHandle {
            beeper: self,
            ticket,
        }
    }

    /// Removes the next pending tone without playing it. A pending alert
    /// comes before queued chirps.
    pub fn take_request(&self) -> Option<Tone> {
        if self.alert_pending.try_take().is_some() {
            return Some(Tone::Alert);
        }
        self.chirps.try_receive().ok()
    }

    async fn next_request(&self) -> Tone {
        match select(self.alert_pending.wait(), self.chirps.receive()).await {
            Either::First(()) => Tone::Alert,
            Either::Second(tone) => tone,
        }
    }

    fn issued_alerts(&self) -> u32 {
        self.alerts.lock(|alerts| alerts.get().issued)
    }

    fn completed_alerts(&self) -> u32 {
        self.alerts.lock(|alerts| alerts.get().completed)
    }

    /// Marks every alert issued up to `covered` as played.
    fn finish(&self, covered: Option<u32>) {
        if let Some(covered) = covered {
            self.alerts.lock(|alerts| {
                let mut count = alerts.get();
                count.completed = covered;
                alerts.set(count);
            });
        }
        self.finished.signal(());
    }
}

impl<M: RawMutex> Default for Beeper<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Completion handle of one queued alert.
pub struct AlertHandle<'a, M: RawMutex> {
    beeper: &'a Beeper<M>,
    ticket: u32,
}

impl<M: RawMutex> AlertHandle<'_, M> {
    pub fn is_finished(&self) -> bool {
        self.beeper.completed_alerts() >= self.ticket
    }

    /// Waits until this alert has played to the end.
    ///
    /// Only one task may wait on a given beeper at a time.
    pub async fn finished(self) {
        while !self.is_finished() {
            self.beeper.finished.wait().await;
        }
    }
}

/// Drives the buzzer pin for queued tones.
pub struct Buzzer<P, D> {
    pin: P,
    delay: D,
    config: TimerConfig,
}

impl<P: OutputPin, D: DelayNs> Buzzer<P, D> {
    pub fn new(pin: P, delay: D, config: TimerConfig) -> Self {
        Self { pin, delay, config }
    }

    pub async fn run<M: RawMutex>(&mut self, beeper: &Beeper<M>) -> ! {
        loop {
            self.serve_one(beeper).await;
        }
    }

    /// Waits for the next request and plays it.
    pub async fn serve_one<M: RawMutex>(&mut self, beeper: &Beeper<M>) {
        let tone = beeper.next_request().await;
        let covered = (tone == Tone::Alert).then(|| beeper.issued_alerts());
        log::debug!("playing {:?}", tone);
        self.play(tone).await;
        beeper.finish(covered);
    }

    pub async fn play(&mut self, tone: Tone) {
        match tone {
            Tone::Chirp => self.beep(self.config.chirp_ms).await,
            Tone::Alert => {
                for _ in 0..self.config.alert_repeats {
                    self.beep(self.config.alert_tone_ms).await;
                    self.delay.delay_ms(self.config.alert_pause_ms).await;
                }
            }
        }
    }

    async fn beep(&mut self, ms: u32) {
        self.set(true);
        self.delay.delay_ms(ms).await;
        self.set(false);
    }

    fn set(&mut self, on: bool) {
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if let Err(err) = result {
            log::warn!("buzzer pin error: {:?}", err);
        }
    }

    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }
}
