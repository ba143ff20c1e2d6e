use thiserror::Error;

use crate::symbol::Symbol;

/// Keypad entries the editor refuses. The offending symbol is dropped and
/// editing continues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("symbol {0} is not part of a number")]
    InvalidSymbol(Symbol),
    #[error("enter pressed with no digits")]
    EmptyEntry,
    #[error("entry exceeds the largest exposure target")]
    Overflow,
    #[error("entry buffer is full")]
    BufferFull,
}

/// Failures that stop the control loop.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ExposureError<E> {
    #[error("light sensor read failed: {0:?}")]
    Sensor(E),
}
