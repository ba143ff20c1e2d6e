//! The Configure → Measure → Summary control loop.

use core::convert::Infallible;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::delay::DelayNs;

use crate::alarm::AlarmLatch;
use crate::beeper::{AlertHandle, Beeper};
use crate::config::TimerConfig;
use crate::editor::{Edit, Entry};
use crate::error::ExposureError;
use crate::integrator::{Exposure, LightIntegrator};
use crate::keypad::InputQueue;
use crate::sensor::LightSensor;
use crate::session::{Phase, SharedSession};

pub struct ExposureMachine<'a, M: RawMutex, S, D> {
    session: &'a SharedSession<M>,
    input: &'a InputQueue<M>,
    beeper: &'a Beeper<M>,
    sensor: &'a Mutex<M, S>,
    delay: D,
    integrator: LightIntegrator,
    latch: AlarmLatch,
    alert: Option<AlertHandle<'a, M>>,
    step_ms: u32,
}

impl<'a, M: RawMutex, S: LightSensor, D: DelayNs> ExposureMachine<'a, M, S, D> {
    pub fn new(
        session: &'a SharedSession<M>,
        input: &'a InputQueue<M>,
        beeper: &'a Beeper<M>,
        sensor: &'a Mutex<M, S>,
        delay: D,
        config: &TimerConfig,
    ) -> Self {
        Self {
            session,
            input,
            beeper,
            sensor,
            delay,
            integrator: LightIntegrator::new(config.step_secs),
            latch: AlarmLatch::new(),
            alert: None,
            step_ms: config.step_ms(),
        }
    }

    /// Cycles through the phases forever. Returns only when a phase fails.
    pub async fn run(&mut self) -> Result<Infallible, ExposureError<S::Error>> {
        loop {
            self.advance().await?;
        }
    }

    /// Runs the current phase to completion and moves to the next one.
    pub async fn advance(&mut self) -> Result<Phase, ExposureError<S::Error>> {
        let phase = self.session.phase();
        let next = match phase {
            Phase::Configure => self.configure().await,
            Phase::Measure => self.measure().await?,
            Phase::Summary => self.summary().await,
        };
        self.session.update(|session| session.phase = next);
        log::info!("{:?} -> {:?}", phase, next);
        Ok(next)
    }

    /// Completion handle of the alert sounded during the last measurement.
    pub fn take_alert(&mut self) -> Option<AlertHandle<'a, M>> {
        self.alert.take()
    }

    pub fn alarm_fired(&self) -> bool {
        self.latch.is_fired()
    }

    async fn configure(&mut self) -> Phase {
        self.session.update(|session| {
            session.entry = Entry::seeded(session.target);
        });

        loop {
            let symbol = self.input.receive().await;
            let (edit, entry) = self.session.update(|session| {
                let edit = session.entry.push(symbol);
                if let Ok(Edit::Preview(value) | Edit::Commit(value)) = edit {
                    session.target = value;
                }
                (edit, session.entry.clone())
            });
            log::debug!("key {} -> entry {:?}", symbol, entry.as_str());

            match edit {
                Ok(Edit::Commit(target)) => {
                    log::info!("exposure target set to {}", target);
                    return Phase::Measure;
                }
                Ok(Edit::Preview(_) | Edit::Empty) => {}
                Err(err) => log::warn!("ignoring key {}: {}", symbol, err),
            }
        }
    }

    async fn measure(&mut self) -> Result<Phase, ExposureError<S::Error>> {
        self.latch.rearm();
        self.alert = None;
        let target = self.session.update(|session| {
            session.exposure = Exposure::default();
            session.target
        });
        let integrator = self.integrator;

        while self.input.is_empty() {
            let reading = self
                .sensor
                .lock()
                .await
                .read()
                .map_err(ExposureError::Sensor)?;
            let exposure = self.session.update(|session| {
                integrator.tick(&mut session.exposure, target, reading);
                session.exposure
            });
            log::debug!(
                "reading {} accumulated {} after {}s",
                reading,
                exposure.accumulated,
                exposure.elapsed_secs
            );

            self.delay.delay_ms(self.step_ms).await;

            if !self.input.is_empty() {
                break;
            }
            if !self.latch.is_fired() && exposure.exceeds(target) {
                log::info!("target {} reached after {}s", target, exposure.elapsed_secs);
                self.alert = self.latch.fire(self.beeper);
            }
        }

        self.drain_input();
        Ok(Phase::Summary)
    }

    async fn summary(&mut self) -> Phase {
        let _ = self.input.receive().await;
        self.drain_input();
        Phase::Configure
    }

    fn drain_input(&mut self) {
        while self.input.try_receive().is_ok() {}
        self.session.update(|session| session.entry.clear());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beeper::Tone;
    use crate::symbol::Symbol;
    use crate::testing::VirtualDelay;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use std::vec::Vec;

    type Queue = InputQueue<NoopRawMutex>;

    struct Script {
        readings: Vec<f32>,
        next: usize,
    }

    impl Script {
        fn new(readings: &[f32]) -> Self {
            Self {
                readings: readings.to_vec(),
                next: 0,
            }
        }
    }

    #[derive(Debug, PartialEq)]
    struct Unplugged;

    impl LightSensor for Script {
        type Error = Unplugged;

        fn read(&mut self) -> Result<f32, Unplugged> {
            let reading = self.readings.get(self.next).copied().ok_or(Unplugged)?;
            self.next += 1;
            Ok(reading)
        }
    }

    /// Virtual clock that types `symbol` once `at` ticks have elapsed.
    struct KeyAfter<'q> {
        clock: VirtualDelay,
        input: &'q Queue,
        at: u32,
        symbol: Symbol,
    }

    impl DelayNs for KeyAfter<'_> {
        async fn delay_ns(&mut self, ns: u32) {
            self.clock.delay_ns(ns).await;
            if self.clock.calls() == self.at {
                self.input.try_send(self.symbol).unwrap();
            }
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.clock.delay_ms(ms).await;
            if self.clock.calls() == self.at {
                self.input.try_send(self.symbol).unwrap();
            }
        }
    }

    struct Rig {
        session: SharedSession<NoopRawMutex>,
        input: Queue,
        beeper: Beeper<NoopRawMutex>,
        sensor: Mutex<NoopRawMutex, Script>,
    }

    impl Rig {
        fn new(readings: &[f32]) -> Self {
            Self {
                session: SharedSession::new(),
                input: Queue::new(),
                beeper: Beeper::new(),
                sensor: Mutex::new(Script::new(readings)),
            }
        }

        fn machine<D: DelayNs>(&self, delay: D) -> ExposureMachine<'_, NoopRawMutex, Script, D> {
            ExposureMachine::new(
                &self.session,
                &self.input,
                &self.beeper,
                &self.sensor,
                delay,
                &TimerConfig::default(),
            )
        }

        fn type_keys(&self, keys: &str) {
            for c in keys.chars() {
                self.input.try_send(Symbol::from_char(c).unwrap()).unwrap();
            }
        }

        fn alerts(&self) -> usize {
            core::iter::from_fn(|| self.beeper.take_request())
                .filter(|tone| *tone == Tone::Alert)
                .count()
        }
    }

    #[test]
    fn configure_commits_typed_target() {
        let rig = Rig::new(&[]);
        let mut machine = rig.machine(VirtualDelay::default());

        rig.type_keys("10#");
        assert_eq!(block_on(machine.advance()), Ok(Phase::Measure));

        let session = rig.session.session();
        assert_eq!(session.phase, Phase::Measure);
        assert_eq!(session.target, 10);
        assert!(session.entry.is_empty());
    }

    #[test]
    fn configure_edits_before_commit() {
        let rig = Rig::new(&[]);
        let mut machine = rig.machine(VirtualDelay::default());

        rig.type_keys("12*5A#");
        assert_eq!(block_on(machine.advance()), Ok(Phase::Measure));
        assert_eq!(rig.session.snapshot().target, 15);
    }

    #[test]
    fn delete_all_restarts_from_zero() {
        let rig = Rig::new(&[]);
        let mut machine = rig.machine(VirtualDelay::default());

        rig.type_keys("99D4#");
        block_on(machine.advance()).unwrap();
        assert_eq!(rig.session.snapshot().target, 4);
    }

    #[test]
    fn alarm_fires_once_when_target_passed() {
        let rig = Rig::new(&[3.0, 4.0, 5.0, 6.0, 7.0]);
        let delay = KeyAfter {
            clock: VirtualDelay::default(),
            input: &rig.input,
            at: 5,
            symbol: Symbol::Digit(5),
        };
        let mut machine = rig.machine(delay);

        rig.type_keys("10#");
        block_on(machine.advance()).unwrap();
        assert_eq!(block_on(machine.advance()), Ok(Phase::Summary));

        let snapshot = rig.session.snapshot();
        assert_eq!(snapshot.phase, Phase::Summary);
        assert_eq!(snapshot.exposure.accumulated, 25.0);
        assert_eq!(snapshot.exposure.elapsed_secs, 5);
        assert!(machine.alarm_fired());
        assert!(machine.take_alert().is_some());
        assert_eq!(rig.alerts(), 1);
        assert!(rig.input.is_empty());
    }

    #[test]
    fn alarm_sounds_while_chirps_are_pending() {
        let rig = Rig::new(&[6.0, 6.0, 6.0]);
        let delay = KeyAfter {
            clock: VirtualDelay::default(),
            input: &rig.input,
            at: 3,
            symbol: Symbol::Digit(1),
        };
        let mut machine = rig.machine(delay);

        rig.type_keys("10#");
        block_on(machine.advance()).unwrap();
        while rig.beeper.chirp() {}
        assert_eq!(block_on(machine.advance()), Ok(Phase::Summary));

        assert!(machine.alarm_fired());
        assert_eq!(rig.beeper.take_request(), Some(Tone::Alert));
    }

    #[test]
    fn keypress_interrupts_before_target() {
        let rig = Rig::new(&[3.0, 4.0, 5.0]);
        let delay = KeyAfter {
            clock: VirtualDelay::default(),
            input: &rig.input,
            at: 2,
            symbol: Symbol::Digit(5),
        };
        let mut machine = rig.machine(delay);

        rig.type_keys("10#");
        block_on(machine.advance()).unwrap();
        assert_eq!(block_on(machine.advance()), Ok(Phase::Summary));

        let exposure = rig.session.snapshot().exposure;
        assert_eq!(exposure.accumulated, 7.0);
        assert_eq!(exposure.elapsed_secs, 2);
        assert!(!machine.alarm_fired());
        assert_eq!(rig.alerts(), 0);
    }

    #[test]
    fn summary_returns_to_configure_seeded_with_target() {
        let rig = Rig::new(&[1.0]);
        let delay = KeyAfter {
            clock: VirtualDelay::default(),
            input: &rig.input,
            at: 1,
            symbol: Symbol::Hash,
        };
        let mut machine = rig.machine(delay);

        rig.type_keys("42#");
        block_on(machine.advance()).unwrap();
        block_on(machine.advance()).unwrap();

        rig.type_keys("7");
        assert_eq!(block_on(machine.advance()), Ok(Phase::Configure));
        assert!(rig.input.is_empty());

        rig.type_keys("#");
        assert_eq!(block_on(machine.advance()), Ok(Phase::Measure));
        assert_eq!(rig.session.snapshot().target, 42);
    }

    #[test]
    fn sensor_failure_stops_the_loop() {
        let rig = Rig::new(&[]);
        let mut machine = rig.machine(VirtualDelay::default());

        rig.type_keys("5#");
        block_on(machine.advance()).unwrap();
        assert_eq!(
            block_on(machine.run()).unwrap_err(),
            ExposureError::Sensor(Unplugged)
        );
    }
}
