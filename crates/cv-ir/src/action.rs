//! Scheduled key actions derived from notes.

use crate::key::Key;

/// Press or release of one key.
///
/// Ordering matters: at equal timestamps a Press sorts before a
/// Release so a retriggered key always sees its new press first (the
/// dispatcher resolves the conflict by force-releasing).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    Press,
    Release,
}

/// A single scheduled press or release, derived once from a note and
/// never mutated afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyAction {
    /// Seconds from song start (virtual time, speed-independent)
    pub time: f64,
    /// Which key to actuate
    pub key: Key,
    /// Press or release
    pub kind: ActionKind,
    /// Ties a Press to its matching Release; one id per retained note.
    /// Actions sharing a timestamp form a chord regardless of group.
    pub group: u32,
}

impl KeyAction {
    pub fn press(time: f64, key: Key, group: u32) -> Self {
        Self { time, key, kind: ActionKind::Press, group }
    }

    pub fn release(time: f64, key: Key, group: u32) -> Self {
        Self { time, key, kind: ActionKind::Release, group }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_sorts_before_release() {
        assert!(ActionKind::Press < ActionKind::Release);
    }

    #[test]
    fn constructors_set_kind() {
        let k = Key::plain('z');
        assert_eq!(KeyAction::press(0.0, k, 1).kind, ActionKind::Press);
        assert_eq!(KeyAction::release(0.5, k, 1).kind, ActionKind::Release);
    }
}
