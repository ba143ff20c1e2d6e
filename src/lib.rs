//! Light-integrating exposure timer.
//!
//! The user types a target light dose on a 4x4 keypad. The timer then adds up
//! ambient light readings once per tick until the dose passes the target,
//! sounds the buzzer, and holds the result on screen until the next keypress.
//!
//! The library is hardware independent: sensors, pins and delays come in
//! through `embedded-hal` traits and [`sensor::LightSensor`], and every task
//! shares state through `embassy-sync` primitives parameterised over a
//! [`RawMutex`](embassy_sync::blocking_mutex::raw::RawMutex).
//!
//! - [`machine`] runs the Configure → Measure → Summary cycle.
//! - [`keypad`] queues symbols from key releases and chirps on presses.
//! - [`display`] renders a read-only snapshot of the session.
//! - [`beeper`] plays chirps and the alert from a tone queue.

#![cfg_attr(not(test), no_std)]

pub mod alarm;
pub mod beeper;
pub mod config;
pub mod display;
pub mod editor;
pub mod error;
pub mod integrator;
pub mod keypad;
pub mod machine;
pub mod matrix;
pub mod sensor;
pub mod session;
pub mod symbol;

#[cfg(test)]
mod testing;

pub use alarm::AlarmLatch;
pub use beeper::{AlertHandle, Beeper, Buzzer, Tone};
pub use config::TimerConfig;
pub use display::{Presenter, TextDisplay};
pub use editor::{Edit, Entry};
pub use error::{EditError, ExposureError};
pub use integrator::{Exposure, LightIntegrator};
pub use keypad::{InputQueue, KeyEvent, KeypadController, KeypadSource};
pub use machine::ExposureMachine;
pub use matrix::KeyMatrix;
pub use sensor::LightSensor;
pub use session::{Phase, Session, SharedSession, Snapshot};
pub use symbol::Symbol;
