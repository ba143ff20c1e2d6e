//! Periodic text rendering of the session. Reads only.

use core::fmt::{self, Write};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::delay::DelayNs;
use heapless::String;

use crate::sensor::LightSensor;
use crate::session::{Phase, SharedSession, Snapshot};

pub type Line = String<64>;

/// Sink for rendered lines.
pub trait TextDisplay {
    fn show(&mut self, line: &str);
}

impl<T: TextDisplay + ?Sized> TextDisplay for &mut T {
    fn show(&mut self, line: &str) {
        T::show(self, line)
    }
}

struct Value(Option<f32>);

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value:.1}"),
            None => f.write_str("--"),
        }
    }
}

/// Configure shows the live reading and the target being typed. Measure and
/// Summary show accumulated dose, elapsed seconds and the remaining estimate.
pub fn render(snapshot: &Snapshot, reading: Option<f32>) -> Line {
    let mut line = Line::new();
    let exposure = &snapshot.exposure;
    // Overlong values are cut off at the line capacity.
    let _ = match snapshot.phase {
        Phase::Configure => write!(line, "{}\t{}", Value(reading), snapshot.target),
        Phase::Measure | Phase::Summary => write!(
            line,
            "{}\t{}\t{}",
            Value(Some(exposure.accumulated)),
            exposure.elapsed_secs,
            Value(exposure.remaining)
        ),
    };
    line
}

pub struct Presenter<'a, M: RawMutex, S> {
    session: &'a SharedSession<M>,
    sensor: &'a Mutex<M, S>,
}

impl<'a, M: RawMutex, S: LightSensor> Presenter<'a, M, S> {
    pub fn new(session: &'a SharedSession<M>, sensor: &'a Mutex<M, S>) -> Self {
        Self { session, sensor }
    }

    /// Renders the current session once.
    pub async fn refresh<T: TextDisplay>(&self, display: &mut T) {
        let snapshot = self.session.snapshot();
        let reading = match snapshot.phase {
            Phase::Configure => match self.sensor.lock().await.read() {
                Ok(reading) => Some(reading),
                Err(err) => {
                    log::debug!("display reading failed: {:?}", err);
                    None
                }
            },
            Phase::Measure | Phase::Summary => None,
        };
        display.show(&render(&snapshot, reading));
    }

    pub async fn run<T: TextDisplay, D: DelayNs>(
        &self,
        mut display: T,
        mut delay: D,
        interval_ms: u32,
    ) -> ! {
        loop {
            self.refresh(&mut display).await;
            delay.delay_ms(interval_ms).await;
        }
    }
}
