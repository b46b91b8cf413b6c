//! Core types for clavio.
//!
//! This crate defines the data model shared by the rest of the
//! workspace: decoded notes, mapped key actions, the action timeline,
//! and the playback state machine. The MIDI decoder emits notes, the
//! keymap crate turns pitches into keys, and the engine consumes the
//! resulting timeline.

mod action;
mod key;
mod layout;
mod note;
mod state;
mod timeline;

pub use action::{ActionKind, KeyAction};
pub use key::Key;
pub use layout::{Layout, SharpPolicy};
pub use note::{Note, Score};
pub use state::PlaybackState;
pub use timeline::Timeline;
