//! Editing rules for the exposure target typed on the keypad.
//!
//! Every rule looks only at the trailing symbol of the entry. Applying the
//! rules again to an entry they already produced leaves it unchanged.

use core::fmt::Write;

use heapless::String;

use crate::config::BUFFER_CAPACITY;
use crate::error::EditError;
use crate::symbol::Symbol;

/// Result of interpreting the entry after a symbol was appended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edit {
    /// Nothing left to interpret.
    Empty,
    /// Entry still being typed, the value is the live target.
    Preview(u32),
    /// `#` accepted the value. The entry has been cleared.
    Commit(u32),
}

/// In-progress keypad entry. Holds only keypad symbols.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Entry {
    text: String<BUFFER_CAPACITY>,
}

impl Entry {
    pub const fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Entry pre-filled with the decimal form of `target`.
    pub fn seeded(target: u32) -> Self {
        let mut entry = Self::new();
        // u32::MAX has 10 digits, well below the capacity.
        let _ = write!(entry.text, "{target}");
        entry
    }

    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    fn last_symbol(&self) -> Option<Symbol> {
        self.text.chars().last().and_then(Symbol::from_char)
    }

    /// Appends `symbol` and applies the editing rules to it.
    ///
    /// A full entry still takes `D`, `*` and `#`, with the same outcome as if
    /// the symbol had fit. Digits and letters are refused with `BufferFull`.
    pub fn push(&mut self, symbol: Symbol) -> Result<Edit, EditError> {
        if self.text.push(symbol.as_char()).is_ok() {
            return self.apply();
        }

        match symbol {
            Symbol::D => {
                self.text.clear();
                let _ = self.text.push('0');
            }
            // The star cancels out with the symbol before it.
            Symbol::Star => {
                self.text.pop();
            }
            Symbol::Hash => return self.commit(),
            _ => return Err(EditError::BufferFull),
        }
        self.preview()
    }

    /// Interprets the trailing symbol.
    ///
    /// `D` resets the entry to `0`, `*` removes itself and the symbol before
    /// it, `#` commits everything before it. Digits are previewed. Rejected
    /// symbols are removed again, leaving the entry as it was before the push.
    pub fn apply(&mut self) -> Result<Edit, EditError> {
        let Some(last) = self.last_symbol() else {
            return Ok(Edit::Empty);
        };

        match last {
            Symbol::D => {
                self.text.clear();
                let _ = self.text.push('0');
            }
            Symbol::Star => {
                let keep = self.text.len().saturating_sub(2);
                self.text.truncate(keep);
            }
            Symbol::Hash => {
                self.text.pop();
                return self.commit();
            }
            Symbol::Digit(_) => {}
            Symbol::A | Symbol::B | Symbol::C => {
                self.text.pop();
                return Err(EditError::InvalidSymbol(last));
            }
        }

        self.preview()
    }

    fn commit(&mut self) -> Result<Edit, EditError> {
        if self.text.is_empty() {
            return Err(EditError::EmptyEntry);
        }
        let value = parse(self.as_str())?;
        self.text.clear();
        Ok(Edit::Commit(value))
    }

    fn preview(&mut self) -> Result<Edit, EditError> {
        if self.text.is_empty() {
            return Ok(Edit::Empty);
        }

        match parse(self.as_str()) {
            Ok(value) => Ok(Edit::Preview(value)),
            Err(err) => {
                self.text.pop();
                Err(err)
            }
        }
    }
}

fn parse(digits: &str) -> Result<u32, EditError> {
    digits
        .chars()
        .filter_map(Symbol::from_char)
        .try_fold(0u32, |value, symbol| {
            let Symbol::Digit(digit) = symbol else {
                return Err(EditError::InvalidSymbol(symbol));
            };
            value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u32::from(digit)))
                .ok_or(EditError::Overflow)
        })
}
