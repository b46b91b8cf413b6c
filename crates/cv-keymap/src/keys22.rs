//! 22-key full piano layout.
//!
//! Three chromatic octaves plus two extremes. MIDI 60 = middle C sits
//! in the middle octave:
//! - C2 (36): `,` (lowest playable note)
//! - low octave C3-B3 (48-59): `l . ; ' / o 0 p - [ = ]`
//! - mid octave C4-B4 (60-71): `z s x d c v g b h n j m`
//! - high octave C5-B5 (72-83): `q 2 w 3 e r 5 t 6 y 7 u`
//! - C6 (84): `i` (highest playable note)

use crate::fold_into_range;
use cv_ir::Key;

const LOW: [char; 12] = ['l', '.', ';', '\'', '/', 'o', '0', 'p', '-', '[', '=', ']'];
const MID: [char; 12] = ['z', 's', 'x', 'd', 'c', 'v', 'g', 'b', 'h', 'n', 'j', 'm'];
const HIGH: [char; 12] = ['q', '2', 'w', '3', 'e', 'r', '5', 't', '6', 'y', '7', 'u'];

const EXTENDED_LOW: char = ',';
const EXTENDED_HIGH: char = 'i';

const MIDI_EXTENDED_LOW: i32 = 36; // C2
const MIDI_LOW_START: i32 = 48; // C3
const MIDI_MID_START: i32 = 60; // C4
const MIDI_HIGH_START: i32 = 72; // C5
const MIDI_EXTENDED_HIGH: i32 = 84; // C6

/// Map a pitch on the 22-key layout.
///
/// With `transpose` set, out-of-range pitches fold into [36, 84] by
/// octaves; otherwise they drop. The C2 extreme only answers for C
/// pitches, so most of the 36-47 range is unplayable.
pub fn map_22(pitch: u8, transpose: bool) -> Option<Key> {
    let mut p = pitch as i32;
    if p < MIDI_EXTENDED_LOW || p > MIDI_EXTENDED_HIGH {
        if !transpose {
            return None;
        }
        p = fold_into_range(p, MIDI_EXTENDED_LOW, MIDI_EXTENDED_HIGH);
    }

    if p == MIDI_EXTENDED_LOW {
        return Some(Key::plain(EXTENDED_LOW));
    }
    if p == MIDI_EXTENDED_HIGH {
        return Some(Key::plain(EXTENDED_HIGH));
    }
    // Between the extremes only C3 and up has real keys.
    if p < MIDI_LOW_START {
        return None;
    }

    let offset = (p % 12) as usize;
    let table = if p >= MIDI_HIGH_START {
        &HIGH
    } else if p >= MIDI_MID_START {
        &MID
    } else {
        &LOW
    };
    Some(Key::plain(table[offset]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn octave_anchors() {
        assert_eq!(map_22(48, false), Some(Key::plain('l'))); // C3
        assert_eq!(map_22(60, false), Some(Key::plain('z'))); // C4, middle C
        assert_eq!(map_22(72, false), Some(Key::plain('q'))); // C5
    }

    #[test]
    fn black_keys() {
        assert_eq!(map_22(54, false), Some(Key::plain('0'))); // F#3
        assert_eq!(map_22(56, false), Some(Key::plain('-'))); // G#3
        assert_eq!(map_22(61, false), Some(Key::plain('s'))); // C#4
    }

    #[test]
    fn extremes() {
        assert_eq!(map_22(36, false), Some(Key::plain(','))); // C2
        assert_eq!(map_22(84, false), Some(Key::plain('i'))); // C6
    }

    #[test]
    fn gap_between_extended_low_and_low_octave() {
        // 37-47 has no physical keys
        assert_eq!(map_22(40, false), None);
    }

    #[test]
    fn out_of_range_drops_without_transpose() {
        assert_eq!(map_22(24, false), None);
        assert_eq!(map_22(96, false), None);
    }

    #[test]
    fn transpose_folds_by_octaves() {
        assert_eq!(map_22(24, true), Some(Key::plain(','))); // C1 → C2
        assert_eq!(map_22(96, true), Some(Key::plain('i'))); // C7 → C6
    }

    #[test]
    fn transpose_leaves_in_range_alone() {
        assert_eq!(map_22(60, true), map_22(60, false));
    }
}
