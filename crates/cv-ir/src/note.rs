//! Decoded note events and the score that owns them.

/// A single decoded note with absolute timing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Note {
    /// MIDI pitch (0-127, 60 = middle C)
    pub pitch: u8,
    /// Onset in seconds from song start
    pub start: f64,
    /// Length in seconds
    pub duration: f64,
}

impl Note {
    /// Create a note.
    pub fn new(pitch: u8, start: f64, duration: f64) -> Self {
        Self { pitch, start, duration }
    }

    /// Time at which the note stops sounding.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// An ordered, immutable sequence of notes for one loaded song.
///
/// Notes are ordered by `start`; ties keep their original file order so
/// that chords stay grouped. The `source` string identifies where the
/// score came from (usually the file path) and doubles as the cache
/// identity for derived timelines.
#[derive(Clone, Debug, Default)]
pub struct Score {
    notes: Vec<Note>,
    source: String,
}

impl Score {
    /// Build a score from notes already ordered by start time.
    pub fn new(source: impl Into<String>, notes: Vec<Note>) -> Self {
        Self { notes, source: source.into() }
    }

    /// Identity of the score's origin (file path or synthetic name).
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Total duration in seconds: end of the last note, not its onset.
    pub fn duration(&self) -> f64 {
        self.notes.last().map(Note::end).unwrap_or(0.0)
    }

    /// Notes whose onset lies in `[from, from + lookahead]`.
    ///
    /// Used for preview rendering; cheap enough to call from an
    /// observer thread at any time.
    pub fn notes_within(&self, from: f64, lookahead: f64) -> Vec<Note> {
        let end = from + lookahead;
        self.notes
            .iter()
            .skip_while(|n| n.start < from)
            .take_while(|n| n.start <= end)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_end_of_last_note() {
        let score = Score::new(
            "test",
            vec![Note::new(60, 0.0, 1.0), Note::new(62, 2.0, 1.0)],
        );
        // End of the last note, not merely its onset.
        assert_eq!(score.duration(), 3.0);
    }

    #[test]
    fn empty_score_has_zero_duration() {
        assert_eq!(Score::default().duration(), 0.0);
    }

    #[test]
    fn notes_within_respects_window() {
        let score = Score::new(
            "test",
            vec![
                Note::new(60, 0.0, 0.5),
                Note::new(62, 1.0, 0.5),
                Note::new(64, 2.0, 0.5),
                Note::new(65, 5.0, 0.5),
            ],
        );

        let upcoming = score.notes_within(0.5, 2.0);
        assert_eq!(upcoming.len(), 2);
        assert_eq!(upcoming[0].pitch, 62);
        assert_eq!(upcoming[1].pitch, 64);
    }

    #[test]
    fn notes_within_includes_window_edges() {
        let score = Score::new("test", vec![Note::new(60, 1.0, 0.5)]);
        assert_eq!(score.notes_within(1.0, 0.0).len(), 1);
        assert_eq!(score.notes_within(0.0, 1.0).len(), 1);
    }
}
