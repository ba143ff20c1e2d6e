//! State shared by the control loop and the display.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::editor::Entry;
use crate::integrator::Exposure;

/// Mode of the control loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Typing the exposure target.
    Configure,
    /// Integrating light towards the target.
    Measure,
    /// Holding the result of the last measurement.
    Summary,
}

impl Phase {
    pub const fn next(self) -> Self {
        match self {
            Phase::Configure => Phase::Measure,
            Phase::Measure => Phase::Summary,
            Phase::Summary => Phase::Configure,
        }
    }
}

/// Everything the state machine owns.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub phase: Phase,
    /// Committed target, or the live preview while in [`Phase::Configure`].
    pub target: u32,
    pub exposure: Exposure,
    pub entry: Entry,
}

impl Session {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Configure,
            target: 0,
            exposure: Exposure {
                accumulated: 0.0,
                elapsed_secs: 0,
                remaining: None,
            },
            entry: Entry::new(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            target: self.target,
            exposure: self.exposure,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Consistent copy of the fields the display renders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snapshot {
    pub phase: Phase,
    pub target: u32,
    pub exposure: Exposure,
}

/// [`Session`] behind a blocking mutex. Locks are never held across an await.
pub struct SharedSession<M: RawMutex> {
    inner: Mutex<M, RefCell<Session>>,
}

impl<M: RawMutex> SharedSession<M> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Session::new())),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.inner.lock(|session| session.borrow().snapshot())
    }

    pub fn phase(&self) -> Phase {
        self.inner.lock(|session| session.borrow().phase)
    }

    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        self.inner.lock(|session| f(&mut session.borrow_mut()))
    }

    /// Clone of the whole session, editing entry included.
    pub fn session(&self) -> Session {
        self.inner.lock(|session| session.borrow().clone())
    }
}

impl<M: RawMutex> Default for SharedSession<M> {
    fn default() -> Self {
        Self::new()
    }
}
