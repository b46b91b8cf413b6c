//! Pitch-to-key mapping tables.
//!
//! One module per instrument layout. Every mapper is a pure function
//! from MIDI pitch to an optional [`Key`]; a `None` means the note is
//! unplayable under the chosen layout and policy and will be dropped
//! by the timeline builder (surfaced to the UI only as reduced
//! compatibility, never as an error).

mod keys15;
mod keys22;
mod keys36;
mod percussion;

pub use keys15::{map_15_double, map_15_triple};
pub use keys22::map_22;
pub use keys36::map_36;
pub use percussion::{map_drums, map_xylophone};

use cv_ir::{Key, Layout, Note, SharpPolicy};

/// Note offsets within an octave that are sharps (black keys).
pub(crate) const SHARP_OFFSETS: [u8; 5] = [1, 3, 6, 8, 10];

/// Snap a sharp offset to the natural immediately below it.
pub(crate) fn sharp_to_natural(offset: u8) -> u8 {
    debug_assert!(SHARP_OFFSETS.contains(&offset));
    offset - 1
}

/// Fold `pitch` into `[low, high]` by whole octaves.
pub(crate) fn fold_into_range(mut pitch: i32, low: i32, high: i32) -> i32 {
    while pitch < low {
        pitch += 12;
    }
    while pitch > high {
        pitch -= 12;
    }
    pitch
}

/// A selected mapping configuration, usable as the pure pitch→key
/// function the engine consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mapping {
    pub layout: Layout,
    pub transpose: bool,
    pub sharp_policy: SharpPolicy,
}

impl Mapping {
    pub fn new(layout: Layout, transpose: bool, sharp_policy: SharpPolicy) -> Self {
        Self { layout, transpose, sharp_policy }
    }

    /// Resolve one pitch under this configuration.
    pub fn map(&self, pitch: u8) -> Option<Key> {
        map_note(self.layout, pitch, self.transpose, self.sharp_policy)
    }
}

/// Resolve a MIDI pitch to a key for the given layout and policies.
pub fn map_note(layout: Layout, pitch: u8, transpose: bool, sharp: SharpPolicy) -> Option<Key> {
    match layout {
        Layout::Keys22 => map_22(pitch, transpose),
        Layout::Keys15Double => map_15_double(pitch, transpose, sharp),
        Layout::Keys15Triple => map_15_triple(pitch, transpose, sharp),
        // Fixed-table percussion ignores both policies.
        Layout::Drums => map_drums(pitch),
        Layout::Xylophone => map_xylophone(pitch),
        Layout::Keys36 => map_36(pitch, transpose),
    }
}

/// How many of `notes` are playable under the given configuration.
///
/// Returned as `(playable, total)` for the UI's compatibility display.
pub fn compatibility(
    notes: &[Note],
    layout: Layout,
    transpose: bool,
    sharp: SharpPolicy,
) -> (usize, usize) {
    let playable = notes
        .iter()
        .filter(|n| map_note(layout, n.pitch, transpose, sharp).is_some())
        .count();
    (playable, notes.len())
}
