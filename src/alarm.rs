use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::beeper::{AlertHandle, Beeper};

/// Sounds the alert at most once per measurement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AlarmLatch {
    fired: bool,
}

impl AlarmLatch {
    pub const fn new() -> Self {
        Self { fired: false }
    }

    pub fn is_fired(&self) -> bool {
        self.fired
    }

    /// Allows one more alert. Called when a measurement starts.
    pub fn rearm(&mut self) {
        self.fired = false;
    }

    /// Requests the alert unless it already fired since the last [`rearm`].
    ///
    /// [`rearm`]: AlarmLatch::rearm
    pub fn fire<'b, M: RawMutex>(&mut self, beeper: &'b Beeper<M>) -> Option<AlertHandle<'b, M>> {
        if self.fired {
            return None;
        }
        self.fired = true;
        Some(beeper.alert())
    }
}
