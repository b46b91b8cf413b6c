//! The ordered key-action sequence for one score under one mapping.

use crate::action::{ActionKind, KeyAction};

/// An immutable, time-ordered sequence of key actions.
///
/// Built once per (score, layout, transpose, sharp policy) tuple and
/// shared read-only with the dispatch worker. Times are in virtual
/// seconds; playback speed is applied by the clock, never baked in
/// here, which is what lets the cache ignore speed changes.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    actions: Vec<KeyAction>,
}

impl Timeline {
    /// Build a timeline, sorting actions by `(time, kind)` with Press
    /// before Release at equal timestamps. The sort is stable so
    /// chord members keep their note order.
    pub fn new(mut actions: Vec<KeyAction>) -> Self {
        actions.sort_by(|a, b| {
            a.time
                .partial_cmp(&b.time)
                .unwrap_or(core::cmp::Ordering::Equal)
                .then(a.kind.cmp(&b.kind))
        });
        Self { actions }
    }

    pub fn actions(&self) -> &[KeyAction] {
        &self.actions
    }

    pub fn get(&self, index: usize) -> Option<&KeyAction> {
        self.actions.get(index)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Timestamp of the final action, 0.0 when empty.
    pub fn end_time(&self) -> f64 {
        self.actions.last().map(|a| a.time).unwrap_or(0.0)
    }

    /// Index range of the chord starting at `index`: every subsequent
    /// action scheduled at exactly the same time.
    pub fn chord_range(&self, index: usize) -> core::ops::Range<usize> {
        let Some(first) = self.actions.get(index) else {
            return index..index;
        };
        let mut end = index + 1;
        while self
            .actions
            .get(end)
            .is_some_and(|a| a.time == first.time)
        {
            end += 1;
        }
        index..end
    }

    /// Check the press/release pairing invariant: every Press has
    /// exactly one Release with the same group, no earlier than it.
    pub fn is_well_formed(&self) -> bool {
        for a in &self.actions {
            if a.kind != ActionKind::Press {
                continue;
            }
            let releases: Vec<_> = self
                .actions
                .iter()
                .filter(|b| b.kind == ActionKind::Release && b.group == a.group)
                .collect();
            if releases.len() != 1 || releases[0].time < a.time {
                return false;
            }
        }
        true
    }
}
