//! Note-to-action timeline building.
//!
//! Walks the note list through a pitch→key mapping, producing the
//! sorted [`Timeline`] the dispatcher consumes for playback.

use cv_ir::{Key, KeyAction, Note, Timeline};

/// Build a timeline from notes and a mapping function.
///
/// Each mappable note becomes a press at its onset and a release at
/// its end, tied together by a fresh group id. Notes the mapping
/// rejects are dropped silently; they only show up as reduced
/// compatibility in the UI, never as an error or a timing shift for
/// the notes around them.
///
/// The result is sorted by `(time, kind)` with presses first at equal
/// timestamps, so notes sharing an onset form a chord the dispatcher
/// can fire back-to-back.
pub fn build_timeline<F>(notes: &[Note], map: F) -> Timeline
where
    F: Fn(u8) -> Option<Key>,
{
    let mut actions = Vec::with_capacity(notes.len() * 2);
    let mut group: u32 = 0;

    for note in notes {
        let Some(key) = map(note.pitch) else {
            continue;
        };
        actions.push(KeyAction::press(note.start, key, group));
        actions.push(KeyAction::release(note.end(), key, group));
        group += 1;
    }

    Timeline::new(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_ir::ActionKind;

    /// Identity mapping: pitch n → plain key with that code point.
    fn identity(pitch: u8) -> Option<Key> {
        Some(Key::plain(pitch as char))
    }

    #[test]
    fn two_actions_per_mapped_note() {
        let notes = vec![
            Note::new(60, 0.0, 0.5),
            Note::new(62, 1.0, 0.5),
            Note::new(64, 2.0, 0.5),
        ];
        let t = build_timeline(&notes, identity);
        assert_eq!(t.len(), 2 * notes.len());
        assert!(t.is_well_formed());
    }

    #[test]
    fn unmapped_notes_drop_without_shifting_others() {
        let notes = vec![
            Note::new(60, 0.0, 0.5),
            Note::new(1, 0.2, 0.5), // unmapped
            Note::new(62, 1.0, 0.5),
        ];
        let t = build_timeline(&notes, |p| if p < 10 { None } else { identity(p) });

        assert_eq!(t.len(), 4);
        assert_eq!(t.actions()[0].time, 0.0);
        // The dropped note leaves the later note's timing untouched.
        assert_eq!(t.actions()[2].time, 1.0);
    }

    #[test]
    fn chord_presses_share_time() {
        let notes = vec![Note::new(60, 0.0, 0.5), Note::new(62, 0.0, 0.5)];
        let t = build_timeline(&notes, identity);

        let a = t.actions();
        assert_eq!(a[0].kind, ActionKind::Press);
        assert_eq!(a[1].kind, ActionKind::Press);
        assert_eq!(a[0].time, a[1].time);
        assert_eq!(a[2].kind, ActionKind::Release);
        assert_eq!(a[3].kind, ActionKind::Release);
        assert_eq!(a[2].time, 0.5);
        assert_eq!(a[3].time, 0.5);
        assert_ne!(a[0].group, a[1].group);
    }

    #[test]
    fn press_precedes_release_at_shared_boundary() {
        // Second note starts exactly when the first ends.
        let notes = vec![Note::new(60, 0.0, 1.0), Note::new(62, 1.0, 1.0)];
        let t = build_timeline(&notes, identity);

        let a = t.actions();
        assert_eq!(a[1].time, 1.0);
        assert_eq!(a[1].kind, ActionKind::Press);
        assert_eq!(a[2].time, 1.0);
        assert_eq!(a[2].kind, ActionKind::Release);
    }

    #[test]
    fn every_press_pairs_with_one_release() {
        let notes = vec![
            Note::new(60, 0.0, 2.0),
            Note::new(60, 0.5, 0.25),
            Note::new(64, 0.5, 1.0),
        ];
        let t = build_timeline(&notes, identity);
        assert!(t.is_well_formed());
    }

    #[test]
    fn empty_and_all_unmapped_yield_empty_timeline() {
        assert!(build_timeline(&[], identity).is_empty());

        let notes = vec![Note::new(60, 0.0, 0.5)];
        assert!(build_timeline(&notes, |_| None).is_empty());
    }

    #[test]
    fn real_layout_mapping() {
        use cv_ir::{Layout, SharpPolicy};
        let notes = vec![
            Note::new(60, 0.0, 0.5), // middle C → 'z'
            Note::new(61, 0.5, 0.5), // C#4 → 's'
            Note::new(20, 1.0, 0.5), // out of range, dropped
        ];
        let t = build_timeline(&notes, |p| {
            cv_keymap::map_note(Layout::Keys22, p, false, SharpPolicy::Skip)
        });

        assert_eq!(t.len(), 4);
        assert_eq!(t.actions()[0].key, Key::plain('z'));
    }
}
