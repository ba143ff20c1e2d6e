use core::fmt;

/// A keypad symbol after matrix index resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    Digit(u8),
    /// `*`, deletes the previous symbol.
    Star,
    /// `#`, commits the entry.
    Hash,
    A,
    B,
    C,
    /// Clears the entry back to `0`.
    D,
}

/// Layout of the 4x4 membrane keypad, indexed by `row * 4 + column`.
pub const KEY_MAP: [Symbol; 16] = [
    Symbol::Digit(1),
    Symbol::Digit(2),
    Symbol::Digit(3),
    Symbol::A,
    Symbol::Digit(4),
    Symbol::Digit(5),
    Symbol::Digit(6),
    Symbol::B,
    Symbol::Digit(7),
    Symbol::Digit(8),
    Symbol::Digit(9),
    Symbol::C,
    Symbol::Star,
    Symbol::Digit(0),
    Symbol::Hash,
    Symbol::D,
];

impl Symbol {
    pub fn from_key_index(index: u8) -> Option<Self> {
        KEY_MAP.get(usize::from(index)).copied()
    }

    pub fn from_char(c: char) -> Option<Self> {
        let symbol = match c {
            '0'..='9' => Symbol::Digit(c as u8 - b'0'),
            '*' => Symbol::Star,
            '#' => Symbol::Hash,
            'A' => Symbol::A,
            'B' => Symbol::B,
            'C' => Symbol::C,
            'D' => Symbol::D,
            _ => return None,
        };
        Some(symbol)
    }

    pub fn as_char(self) -> char {
        match self {
            Symbol::Digit(d) => char::from(b'0' + d % 10),
            Symbol::Star => '*',
            Symbol::Hash => '#',
            Symbol::A => 'A',
            Symbol::B => 'B',
            Symbol::C => 'C',
            Symbol::D => 'D',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
