//! Playback engine for clavio.
//!
//! Converts note lists into key-action timelines, drives them against
//! a pausable speed-scaled clock, and dispatches press/release actions
//! through a [`KeyActuator`] capability without ever leaving a key
//! stuck down.

mod actuator;
mod builder;
mod cache;
mod clock;
mod dispatch;

pub use actuator::{
    ActuatorError, AlwaysFocused, FocusMonitor, KeyActuator, KeyCall, LoggingActuator,
    NullActuator, RecordingActuator,
};
pub use builder::build_timeline;
pub use cache::{CacheKey, TimelineCache};
pub use clock::{Clock, SystemTimeSource, TimeSource, MAX_SPEED, MIN_SPEED};
pub use dispatch::{
    DispatchShared, Dispatcher, EngineCommand, HeldKeys, RunOutcome, POLL_INTERVAL,
};
