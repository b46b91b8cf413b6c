//! Single-slot timeline cache.

use std::sync::Arc;

use cv_ir::{Key, Layout, Note, SharpPolicy, Timeline};

use crate::builder::build_timeline;

/// Everything a timeline's content depends on. Speed is deliberately
/// absent: timelines are in virtual time and speed is a clock rate,
/// so speed changes never invalidate the slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheKey {
    /// Score identity (source path or synthetic name)
    pub score: String,
    pub layout: Layout,
    pub transpose: bool,
    pub sharp_policy: SharpPolicy,
}

/// Memoizes the most recently built timeline.
///
/// Only one song plays at a time, so a single slot suffices: a key
/// match returns the cached timeline untouched, any mismatch (new
/// score, layout, transpose, or sharp policy) rebuilds and replaces
/// the slot wholesale.
#[derive(Default)]
pub struct TimelineCache {
    slot: Option<(CacheKey, Arc<Timeline>)>,
    builds: u64,
}

impl TimelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the timeline for `key`, building it only on a key miss.
    pub fn get_or_build<F>(&mut self, key: CacheKey, notes: &[Note], map: F) -> Arc<Timeline>
    where
        F: Fn(u8) -> Option<Key>,
    {
        if let Some((cached_key, timeline)) = &self.slot {
            if *cached_key == key {
                return Arc::clone(timeline);
            }
        }

        let timeline = Arc::new(build_timeline(notes, map));
        self.builds += 1;
        self.slot = Some((key, Arc::clone(&timeline)));
        timeline
    }

    /// How many times a timeline has been built. Exposed so tests can
    /// verify the no-rebuild property.
    pub fn builds(&self) -> u64 {
        self.builds
    }

    /// Drop the slot entirely.
    pub fn clear(&mut self) {
        self.slot = None;
    }
}
