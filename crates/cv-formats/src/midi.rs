//! Standard MIDI File → flat note list.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use cv_ir::{Note, Score};
use midly::{MetaMessage, MidiMessage, Smf, TrackEventKind};

use crate::FormatError;

/// Fallback pulses-per-quarter-note when the header uses SMPTE timing.
const DEFAULT_PPQ: u32 = 480;
/// Default tempo: 500_000 µs per quarter note = 120 BPM.
const DEFAULT_US_PER_QN: u32 = 500_000;

/// Decode MIDI bytes into a score.
///
/// All tracks are merged into one chronological note list. Delta ticks
/// are converted to absolute seconds using the running tempo (tempo
/// meta events apply from their own position onward). `NoteOn` with
/// velocity 0 counts as `NoteOff`. Timestamps are quantized to whole
/// microseconds so simultaneous file events compare exactly equal.
///
/// A file with zero notes is not an error; it decodes to an empty
/// score and playback of it is a no-op.
pub fn load_midi(source: impl Into<String>, data: &[u8]) -> Result<Score, FormatError> {
    let smf = Smf::parse(data).map_err(|e| FormatError::InvalidMidi(e.to_string()))?;

    let ppq = match smf.header.timing {
        midly::Timing::Metrical(t) => t.as_int() as u32,
        _ => DEFAULT_PPQ,
    };

    // Flatten every track to (absolute tick, event) and merge-sort.
    // The sort is stable, so events sharing a tick keep file order and
    // chords stay grouped.
    let mut merged: Vec<(u64, TrackEventKind)> = Vec::new();
    for track in &smf.tracks {
        let mut abs_tick: u64 = 0;
        for ev in track {
            abs_tick += ev.delta.as_int() as u64;
            merged.push((abs_tick, ev.kind));
        }
    }
    merged.sort_by_key(|(tick, _)| *tick);

    let mut notes: Vec<Note> = Vec::new();
    // pitch → (start seconds, index into notes) for open notes
    let mut active: HashMap<u8, (f64, usize)> = HashMap::new();

    let mut us_per_qn = DEFAULT_US_PER_QN as f64;
    let mut last_tick: u64 = 0;
    let mut now_us: f64 = 0.0;

    for (tick, kind) in merged {
        now_us += (tick - last_tick) as f64 * us_per_qn / ppq as f64;
        last_tick = tick;
        let now = (now_us.round() as u64) as f64 / 1_000_000.0;

        match kind {
            TrackEventKind::Meta(MetaMessage::Tempo(t)) => {
                us_per_qn = t.as_int() as f64;
            }
            TrackEventKind::Midi { message, .. } => match message {
                MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                    let pitch = key.as_int();
                    active.insert(pitch, (now, notes.len()));
                    // Duration is filled in when the off event arrives.
                    notes.push(Note::new(pitch, now, 0.0));
                }
                MidiMessage::NoteOff { key, .. } | MidiMessage::NoteOn { key, .. } => {
                    let pitch = key.as_int();
                    if let Some((start, idx)) = active.remove(&pitch) {
                        notes[idx].duration = now - start;
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    if !active.is_empty() {
        log::warn!("{} note(s) never received a note-off", active.len());
    }

    notes.sort_by(|a, b| {
        a.start
            .partial_cmp(&b.start)
            .unwrap_or(core::cmp::Ordering::Equal)
    });
    Ok(Score::new(source, notes))
}

/// Read and decode a MIDI file from disk.
pub fn load_midi_file(path: &Path) -> Result<Score, FormatError> {
    let data = fs::read(path)?;
    load_midi(path.display().to_string(), &data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::{
        num::{u15, u24, u28, u4, u7},
        Format, Header, Timing, TrackEvent,
    };

    /// Build an in-memory single-track SMF from (delta, kind) pairs.
    fn smf_bytes(events: Vec<(u32, TrackEventKind<'static>)>) -> Vec<u8> {
        let header = Header::new(Format::SingleTrack, Timing::Metrical(u15::new(480)));
        let mut smf = Smf::new(header);
        let track: Vec<TrackEvent> = events
            .into_iter()
            .map(|(delta, kind)| TrackEvent { delta: u28::new(delta), kind })
            .chain(std::iter::once(TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            }))
            .collect();
        smf.tracks.push(track);
        let mut out = Vec::new();
        smf.write(&mut out).unwrap();
        out
    }

    fn note_on(key: u8, vel: u8) -> TrackEventKind<'static> {
        TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOn { key: u7::new(key), vel: u7::new(vel) },
        }
    }

    fn note_off(key: u8) -> TrackEventKind<'static> {
        TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOff { key: u7::new(key), vel: u7::new(0) },
        }
    }

    #[test]
    fn decodes_single_note_with_duration() {
        // 480 ticks at 120 BPM = one quarter note = 0.5s
        let bytes = smf_bytes(vec![(0, note_on(60, 64)), (480, note_off(60))]);
        let score = load_midi("test", &bytes).unwrap();

        assert_eq!(score.len(), 1);
        let n = score.notes()[0];
        assert_eq!(n.pitch, 60);
        assert_eq!(n.start, 0.0);
        assert!((n.duration - 0.5).abs() < 1e-6);
    }

    #[test]
    fn velocity_zero_note_on_ends_note() {
        let bytes = smf_bytes(vec![(0, note_on(60, 64)), (480, note_on(60, 0))]);
        let score = load_midi("test", &bytes).unwrap();
        assert!((score.notes()[0].duration - 0.5).abs() < 1e-6);
    }

    #[test]
    fn chord_notes_share_exact_start() {
        let bytes = smf_bytes(vec![
            (0, note_on(60, 64)),
            (0, note_on(64, 64)),
            (480, note_off(60)),
            (0, note_off(64)),
        ]);
        let score = load_midi("test", &bytes).unwrap();
        assert_eq!(score.len(), 2);
        assert_eq!(score.notes()[0].start, score.notes()[1].start);
    }

    #[test]
    fn tempo_change_applies_from_its_position() {
        // First quarter at 120 BPM (0.5s), then 60 BPM (1.0s per quarter)
        let bytes = smf_bytes(vec![
            (0, note_on(60, 64)),
            (480, note_off(60)),
            (0, TrackEventKind::Meta(MetaMessage::Tempo(u24::new(1_000_000)))),
            (0, note_on(62, 64)),
            (480, note_off(62)),
        ]);
        let score = load_midi("test", &bytes).unwrap();

        assert!((score.notes()[0].duration - 0.5).abs() < 1e-6);
        assert!((score.notes()[1].start - 0.5).abs() < 1e-6);
        assert!((score.notes()[1].duration - 1.0).abs() < 1e-6);
    }

    #[test]
    fn empty_file_decodes_to_empty_score() {
        let bytes = smf_bytes(vec![]);
        let score = load_midi("test", &bytes).unwrap();
        assert!(score.is_empty());
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            load_midi("test", b"not a midi file"),
            Err(FormatError::InvalidMidi(_))
        ));
    }
}
