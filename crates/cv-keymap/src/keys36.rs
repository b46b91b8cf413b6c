//! 36-key layout: three octaves of naturals where sharps are played
//! as Shift + the natural's key.
//!
//! - low octave C3-B3 (48-59): z x c v b n m
//! - mid octave C4-B4 (60-71): a s d f g h j
//! - high octave C5-B5 (72-83): q w e r t y u

use crate::{fold_into_range, SHARP_OFFSETS};
use cv_ir::Key;

const LOW: [(u8, char); 7] = [
    (0, 'z'),
    (2, 'x'),
    (4, 'c'),
    (5, 'v'),
    (7, 'b'),
    (9, 'n'),
    (11, 'm'),
];
const MID: [(u8, char); 7] = [
    (0, 'a'),
    (2, 's'),
    (4, 'd'),
    (5, 'f'),
    (7, 'g'),
    (9, 'h'),
    (11, 'j'),
];
const HIGH: [(u8, char); 7] = [
    (0, 'q'),
    (2, 'w'),
    (4, 'e'),
    (5, 'r'),
    (7, 't'),
    (9, 'y'),
    (11, 'u'),
];

const MIDI_LOW_START: i32 = 48; // C3
const MIDI_MID_START: i32 = 60; // C4
const MIDI_HIGH_START: i32 = 72; // C5
const MIDI_HIGH_END: i32 = 83; // B5

/// Map a pitch on the 36-key layout. Sharps come back `shifted`.
pub fn map_36(pitch: u8, transpose: bool) -> Option<Key> {
    let mut p = pitch as i32;
    if p < MIDI_LOW_START || p > MIDI_HIGH_END {
        if !transpose {
            return None;
        }
        p = fold_into_range(p, MIDI_LOW_START, MIDI_HIGH_END);
    }

    let offset = (p % 12) as u8;
    let is_sharp = SHARP_OFFSETS.contains(&offset);
    // A sharp borrows the key of the natural below it.
    let natural = if is_sharp { offset - 1 } else { offset };

    let table = if p >= MIDI_HIGH_START {
        &HIGH
    } else if p >= MIDI_MID_START {
        &MID
    } else {
        &LOW
    };
    let ch = table.iter().find(|(o, _)| *o == natural).map(|(_, ch)| *ch)?;
    Some(if is_sharp { Key::shifted(ch) } else { Key::plain(ch) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naturals_per_octave() {
        assert_eq!(map_36(48, false), Some(Key::plain('z'))); // C3
        assert_eq!(map_36(60, false), Some(Key::plain('a'))); // C4
        assert_eq!(map_36(72, false), Some(Key::plain('q'))); // C5
        assert_eq!(map_36(83, false), Some(Key::plain('u'))); // B5
    }

    #[test]
    fn sharps_are_shifted_naturals() {
        assert_eq!(map_36(61, false), Some(Key::shifted('a'))); // C#4
        assert_eq!(map_36(54, false), Some(Key::shifted('v'))); // F#3
        assert_eq!(map_36(82, false), Some(Key::shifted('y'))); // A#5
    }

    #[test]
    fn out_of_range_behavior() {
        assert_eq!(map_36(47, false), None);
        assert_eq!(map_36(84, false), None);
        assert_eq!(map_36(36, true), Some(Key::plain('z'))); // C2 → C3
        assert_eq!(map_36(84, true), Some(Key::plain('q'))); // C6 → C5
    }
}
