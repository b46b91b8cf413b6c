//! Fixed-table 8-key percussion layouts. Neither transposes.

use cv_ir::Key;

/// Chromatic conga/cajon table, C4-G4 → top row YUIO, bottom row HJKL.
const DRUMS: [(u8, char); 8] = [
    (60, 'y'), // low conga (open)
    (61, 'u'), // low conga (muted)
    (62, 'i'), // conga (open)
    (63, 'o'), // conga (slap)
    (64, 'h'), // high conga (open)
    (65, 'j'), // high timbale
    (66, 'k'), // low timbale
    (67, 'l'), // high agogo
];

/// C-major xylophone bars, C4-C5 → home row A-K.
const XYLOPHONE: [(u8, char); 8] = [
    (60, 'a'),
    (62, 's'),
    (64, 'd'),
    (65, 'f'),
    (67, 'g'),
    (69, 'h'),
    (71, 'j'),
    (72, 'k'),
];

/// Map a pitch on the drum layout.
pub fn map_drums(pitch: u8) -> Option<Key> {
    DRUMS
        .iter()
        .find(|(note, _)| *note == pitch)
        .map(|(_, ch)| Key::plain(*ch))
}

/// Map a pitch on the xylophone layout (naturals only).
pub fn map_xylophone(pitch: u8) -> Option<Key> {
    XYLOPHONE
        .iter()
        .find(|(note, _)| *note == pitch)
        .map(|(_, ch)| Key::plain(*ch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drums_full_chromatic_range() {
        assert_eq!(map_drums(60), Some(Key::plain('y')));
        assert_eq!(map_drums(63), Some(Key::plain('o')));
        assert_eq!(map_drums(67), Some(Key::plain('l')));
    }

    #[test]
    fn drums_outside_range() {
        assert_eq!(map_drums(59), None);
        assert_eq!(map_drums(68), None);
    }

    #[test]
    fn xylophone_naturals_only() {
        assert_eq!(map_xylophone(60), Some(Key::plain('a')));
        assert_eq!(map_xylophone(72), Some(Key::plain('k')));
        assert_eq!(map_xylophone(61), None); // C#4 has no bar
    }
}
