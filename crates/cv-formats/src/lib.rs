//! MIDI decoding for clavio.
//!
//! Turns a Standard MIDI File into a flat, time-ordered [`Score`]
//! (`cv_ir::Score`) with absolute second timestamps. Tempo meta
//! events are honored; everything else that is not a note is ignored.

mod midi;

pub use midi::{load_midi, load_midi_file};

use std::io;
use thiserror::Error;

/// Error type for score decoding.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Not a parseable Standard MIDI File
    #[error("invalid MIDI file: {0}")]
    InvalidMidi(String),
    /// I/O error reading the file
    #[error("failed to read file: {0}")]
    Io(#[from] io::Error),
}
