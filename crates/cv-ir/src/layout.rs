//! Instrument layout and mapping policy selectors.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Which in-game instrument layout the keymap targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Full 3-octave chromatic piano plus C2/C6 extremes (22 keys)
    #[default]
    Keys22,
    /// Two rows of naturals, C4-C6 (15 keys)
    Keys15Double,
    /// Three rows of five naturals, C4-C6 (15 keys)
    Keys15Triple,
    /// Chromatic 8-key percussion, C4-G4
    Drums,
    /// C-major 8-key xylophone, C4-C5
    Xylophone,
    /// Three chromatic octaves where sharps are Shift + natural (36 keys)
    Keys36,
}

impl Layout {
    pub const ALL: [Layout; 6] = [
        Layout::Keys22,
        Layout::Keys15Double,
        Layout::Keys15Triple,
        Layout::Drums,
        Layout::Xylophone,
        Layout::Keys36,
    ];

    /// Percussion layouts have fixed tables and never transpose.
    pub fn supports_transpose(self) -> bool {
        !matches!(self, Layout::Drums | Layout::Xylophone)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layout::Keys22 => "22-key (full)",
            Layout::Keys15Double => "15-key (double row)",
            Layout::Keys15Triple => "15-key (triple row)",
            Layout::Drums => "conga/cajon (8-key)",
            Layout::Xylophone => "xylophone (8-key)",
            Layout::Keys36 => "36-key (shift sharps)",
        };
        f.write_str(name)
    }
}

/// What to do with sharps on layouts that only have natural keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharpPolicy {
    /// Drop the note entirely
    #[default]
    Skip,
    /// Play the natural immediately below instead
    Snap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percussion_never_transposes() {
        assert!(!Layout::Drums.supports_transpose());
        assert!(!Layout::Xylophone.supports_transpose());
        assert!(Layout::Keys22.supports_transpose());
    }

    #[test]
    fn layout_serde_round_trip() {
        for layout in Layout::ALL {
            let json = serde_json::to_string(&layout).unwrap();
            let back: Layout = serde_json::from_str(&json).unwrap();
            assert_eq!(layout, back);
        }
    }
}
