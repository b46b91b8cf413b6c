//! 15-key layouts: naturals only, no dedicated sharp keys.
//!
//! Double row: two octave rows C4-B5 plus a C6 extreme.
//! Triple row: three rows of five keys flowing continuously C4-C6.
//!
//! Sharps follow the [`SharpPolicy`]: skipped entirely or snapped to
//! the natural immediately below.

use crate::{fold_into_range, sharp_to_natural, SHARP_OFFSETS};
use cv_ir::{Key, SharpPolicy};

// --- double row ---

const DOUBLE_MID: [(u8, char); 7] = [
    (0, 'a'),
    (2, 's'),
    (4, 'd'),
    (5, 'f'),
    (7, 'g'),
    (9, 'h'),
    (11, 'j'),
];
const DOUBLE_HIGH: [(u8, char); 7] = [
    (0, 'q'),
    (2, 'w'),
    (4, 'e'),
    (5, 'r'),
    (7, 't'),
    (9, 'y'),
    (11, 'u'),
];
const DOUBLE_EXTENDED_HIGH: char = 'i'; // C6

const MIDI_MID_START: i32 = 60; // C4
const MIDI_HIGH_START: i32 = 72; // C5
const MIDI_EXTENDED_HIGH: i32 = 84; // C6

/// Map a pitch on the 15-key double row layout.
pub fn map_15_double(pitch: u8, transpose: bool, sharp: SharpPolicy) -> Option<Key> {
    let mut p = pitch as i32;
    if p < MIDI_MID_START || p > MIDI_EXTENDED_HIGH {
        if !transpose {
            return None;
        }
        p = fold_into_range(p, MIDI_MID_START, MIDI_EXTENDED_HIGH);
    }

    if p == MIDI_EXTENDED_HIGH {
        return Some(Key::plain(DOUBLE_EXTENDED_HIGH));
    }

    let mut offset = (p % 12) as u8;
    if SHARP_OFFSETS.contains(&offset) {
        match sharp {
            SharpPolicy::Skip => return None,
            SharpPolicy::Snap => offset = sharp_to_natural(offset),
        }
    }

    let row = if p >= MIDI_HIGH_START { &DOUBLE_HIGH } else { &DOUBLE_MID };
    row.iter()
        .find(|(o, _)| *o == offset)
        .map(|(_, ch)| Key::plain(*ch))
}

// --- triple row ---

/// Direct note table: rows Y-P, H-;, N-/ flowing C4 to C6.
const TRIPLE_MAP: [(i32, char); 15] = [
    (60, 'y'),
    (62, 'u'),
    (64, 'i'),
    (65, 'o'),
    (67, 'p'),
    (69, 'h'),
    (71, 'j'),
    (72, 'k'),
    (74, 'l'),
    (76, ';'),
    (77, 'n'),
    (79, 'm'),
    (81, ','),
    (83, '.'),
    (84, '/'),
];

/// Map a pitch on the 15-key triple row layout.
pub fn map_15_triple(pitch: u8, transpose: bool, sharp: SharpPolicy) -> Option<Key> {
    let mut p = pitch as i32;
    if p < MIDI_MID_START || p > MIDI_EXTENDED_HIGH {
        if !transpose {
            return None;
        }
        p = fold_into_range(p, MIDI_MID_START, MIDI_EXTENDED_HIGH);
    }

    let offset = (p % 12) as u8;
    if SHARP_OFFSETS.contains(&offset) {
        match sharp {
            SharpPolicy::Skip => return None,
            // Shift the pitch down to its natural, then look it up.
            SharpPolicy::Snap => p = p - offset as i32 + sharp_to_natural(offset) as i32,
        }
    }

    TRIPLE_MAP
        .iter()
        .find(|(note, _)| *note == p)
        .map(|(_, ch)| Key::plain(*ch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_row_naturals() {
        assert_eq!(map_15_double(60, false, SharpPolicy::Skip), Some(Key::plain('a')));
        assert_eq!(map_15_double(72, false, SharpPolicy::Skip), Some(Key::plain('q')));
        assert_eq!(map_15_double(84, false, SharpPolicy::Skip), Some(Key::plain('i')));
    }

    #[test]
    fn double_row_skips_sharps_by_default() {
        assert_eq!(map_15_double(61, false, SharpPolicy::Skip), None); // C#4
        assert_eq!(map_15_double(78, false, SharpPolicy::Skip), None); // F#5
    }

    #[test]
    fn double_row_snaps_sharps_down() {
        // C#4 snaps to C4, A#5 snaps to A5
        assert_eq!(map_15_double(61, false, SharpPolicy::Snap), Some(Key::plain('a')));
        assert_eq!(map_15_double(82, false, SharpPolicy::Snap), Some(Key::plain('y')));
    }

    #[test]
    fn double_row_out_of_range() {
        assert_eq!(map_15_double(59, false, SharpPolicy::Skip), None);
        assert_eq!(map_15_double(48, true, SharpPolicy::Skip), Some(Key::plain('a')));
    }

    #[test]
    fn triple_row_flows_across_rows() {
        assert_eq!(map_15_triple(60, false, SharpPolicy::Skip), Some(Key::plain('y')));
        assert_eq!(map_15_triple(69, false, SharpPolicy::Skip), Some(Key::plain('h')));
        assert_eq!(map_15_triple(77, false, SharpPolicy::Skip), Some(Key::plain('n')));
        assert_eq!(map_15_triple(84, false, SharpPolicy::Skip), Some(Key::plain('/')));
    }

    #[test]
    fn triple_row_sharp_policies() {
        assert_eq!(map_15_triple(63, false, SharpPolicy::Skip), None); // D#4
        assert_eq!(map_15_triple(63, false, SharpPolicy::Snap), Some(Key::plain('u'))); // → D4
    }

    #[test]
    fn triple_row_transpose() {
        assert_eq!(map_15_triple(96, false, SharpPolicy::Skip), None);
        assert_eq!(map_15_triple(96, true, SharpPolicy::Skip), Some(Key::plain('/'))); // C7 → C6
    }
}
