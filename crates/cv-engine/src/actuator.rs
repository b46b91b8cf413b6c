//! Capability traits the engine drives side effects through.

use std::sync::Mutex;
use std::time::Instant;

use cv_ir::Key;
use thiserror::Error;

/// A single failed press or release. Non-fatal: the dispatcher logs
/// it, surfaces it to observers, and moves on to the next action.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ActuatorError(pub String);

/// Performs the physical key press/release side effect.
///
/// Implementations wrap whatever injection backend the platform
/// offers; the engine only assumes that each call is independently
/// fallible and that press/release pairs are not atomic.
pub trait KeyActuator: Send + Sync {
    fn press(&self, key: Key) -> Result<(), ActuatorError>;
    fn release(&self, key: Key) -> Result<(), ActuatorError>;
}

/// Reports whether the target application currently has input focus.
/// The dispatcher auto-suspends while focus is lost.
pub trait FocusMonitor: Send + Sync {
    fn has_focus(&self) -> bool;
}

/// Focus monitor for platforms without window detection: playback
/// never suspends.
pub struct AlwaysFocused;

impl FocusMonitor for AlwaysFocused {
    fn has_focus(&self) -> bool {
        true
    }
}

/// Actuator that does nothing. Useful as a stand-in when no injection
/// backend is wired up.
pub struct NullActuator;

impl KeyActuator for NullActuator {
    fn press(&self, _key: Key) -> Result<(), ActuatorError> {
        Ok(())
    }

    fn release(&self, _key: Key) -> Result<(), ActuatorError> {
        Ok(())
    }
}

/// Actuator that logs every action instead of injecting it. Drives
/// the CLI's dry-run mode.
pub struct LoggingActuator;

impl KeyActuator for LoggingActuator {
    fn press(&self, key: Key) -> Result<(), ActuatorError> {
        log::info!("press {key}");
        Ok(())
    }

    fn release(&self, key: Key) -> Result<(), ActuatorError> {
        log::info!("release {key}");
        Ok(())
    }
}

/// One recorded actuator call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCall {
    Press(Key),
    Release(Key),
}

/// Actuator that records every call with a wall-clock timestamp.
/// Test double for the dispatch and controller tests.
#[derive(Default)]
pub struct RecordingActuator {
    calls: Mutex<Vec<(KeyCall, Instant)>>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls in dispatch order, without timestamps.
    pub fn calls(&self) -> Vec<KeyCall> {
        self.calls.lock().unwrap().iter().map(|(c, _)| *c).collect()
    }

    /// Calls with the instant each was made.
    pub fn timed_calls(&self) -> Vec<(KeyCall, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().unwrap().is_empty()
    }
}

impl KeyActuator for RecordingActuator {
    fn press(&self, key: Key) -> Result<(), ActuatorError> {
        self.calls
            .lock()
            .unwrap()
            .push((KeyCall::Press(key), Instant::now()));
        Ok(())
    }

    fn release(&self, key: Key) -> Result<(), ActuatorError> {
        self.calls
            .lock()
            .unwrap()
            .push((KeyCall::Release(key), Instant::now()));
        Ok(())
    }
}
