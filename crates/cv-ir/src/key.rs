//! Physical key identifiers.

use core::fmt;

/// A physical keyboard key as the game sees it.
///
/// `shifted` marks keys that need the Shift modifier held (the 36-key
/// layout plays sharps as Shift + the natural's key). Two actions on
/// the same base character with different `shifted` flags are distinct
/// keys for held-key tracking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Key {
    /// Base character on the keyboard
    pub ch: char,
    /// Whether Shift must be held
    pub shifted: bool,
}

impl Key {
    /// Plain unshifted key.
    pub const fn plain(ch: char) -> Self {
        Self { ch, shifted: false }
    }

    /// Shift + key combination.
    pub const fn shifted(ch: char) -> Self {
        Self { ch, shifted: true }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.shifted {
            write!(f, "Shift+{}", self.ch.to_ascii_uppercase())
        } else {
            write!(f, "{}", self.ch.to_ascii_uppercase())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifted_and_plain_are_distinct() {
        assert_ne!(Key::plain('a'), Key::shifted('a'));
    }

    #[test]
    fn display_formats() {
        assert_eq!(Key::plain('q').to_string(), "Q");
        assert_eq!(Key::shifted('f').to_string(), "Shift+F");
    }
}
