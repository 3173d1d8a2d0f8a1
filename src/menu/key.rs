use std::fmt;

/// One keypad symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Digit(u8),
    Star,
    Pound,
}

impl Key {
    /// Parse a keypad symbol (`0`-`9`, `*`, `#`).
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '0'..='9' => Some(Key::Digit(ch as u8 - b'0')),
            '*' => Some(Key::Star),
            '#' => Some(Key::Pound),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Key::Digit(d) => char::from(b'0' + d.min(9)),
            Key::Star => '*',
            Key::Pound => '#',
        }
    }

    pub fn is_digit(self) -> bool {
        matches!(self, Key::Digit(_))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// True when every character of `sequence` is a keypad symbol.
pub fn is_key_sequence(sequence: &str) -> bool {
    !sequence.is_empty() && sequence.chars().all(|ch| Key::from_char(ch).is_some())
}
