//! The dispatch loop: walks a timeline against the clock and fires
//! key actions through the actuator.
//!
//! Runs on a dedicated worker thread. All waits are sliced so an
//! external stop request is honored within the polling granularity,
//! and every exit path (completion, stop, panic) goes through a guard
//! that releases anything still held, so no key stays stuck.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use cv_ir::{ActionKind, Key, KeyAction, Timeline};

use crate::actuator::{FocusMonitor, KeyActuator};
use crate::clock::{Clock, SystemTimeSource};

/// Granularity of every interruptible wait.
pub const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Minimum spacing between actuator calls of different chords. The
/// game drops inputs that arrive faster than this, so tighter MIDI
/// timing is traded for registration reliability. Actions inside one
/// chord fire back-to-back.
const MIN_ACTION_GAP: Duration = Duration::from_millis(50);

/// Keys pressed but not yet released, each tagged with the group id
/// of the note that pressed it. A retrigger hands the key to the new
/// group, which lets the old note's stale release be recognized and
/// skipped.
///
/// Owned by the dispatch worker; the controller shares it only to run
/// the emergency release path. Invariant: empty whenever playback
/// is stopped.
#[derive(Default)]
pub struct HeldKeys {
    keys: HashMap<Key, u32>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: Key) -> bool {
        self.keys.contains_key(&key)
    }

    /// Group id of the note currently holding `key`, if any.
    pub fn owner(&self, key: Key) -> Option<u32> {
        self.keys.get(&key).copied()
    }

    pub fn insert(&mut self, key: Key, group: u32) {
        self.keys.insert(key, group);
    }

    pub fn remove(&mut self, key: Key) -> bool {
        self.keys.remove(&key).is_some()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Release every held key, best-effort: an actuator error is
    /// logged and the remaining keys are still attempted. The set is
    /// empty afterwards regardless.
    pub fn release_all(&mut self, actuator: &dyn KeyActuator) {
        for (key, _) in self.keys.drain() {
            if let Err(e) = actuator.release(key) {
                log::error!("forced release failed for {key}: {e}");
            }
        }
    }
}

/// Lock that survives a poisoned mutex: the emergency release path
/// must still work after a panicking worker.
pub(crate) fn lock_held(held: &Mutex<HeldKeys>) -> MutexGuard<'_, HeldKeys> {
    held.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Commands the controller can push into a running dispatcher.
#[derive(Clone, Copy, Debug)]
pub enum EngineCommand {
    SetSpeed(f64),
}

/// State the dispatcher publishes for observers on other threads.
#[derive(Default)]
pub struct DispatchShared {
    stop: AtomicBool,
    suspended: AtomicBool,
    position_bits: AtomicU64,
    last_error: Mutex<String>,
}

impl DispatchShared {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the dispatcher to abort at its next suspension point.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Re-arm for a fresh run.
    pub fn reset(&self) {
        self.stop.store(false, Ordering::Relaxed);
        self.suspended.store(false, Ordering::Relaxed);
        self.set_position(0.0);
    }

    /// Whether playback is focus-suspended (diagnostic; not a
    /// playback state change).
    pub fn suspended(&self) -> bool {
        self.suspended.load(Ordering::Relaxed)
    }

    fn set_suspended(&self, v: bool) {
        self.suspended.store(v, Ordering::Relaxed);
    }

    /// Current virtual position in seconds.
    pub fn position(&self) -> f64 {
        f64::from_bits(self.position_bits.load(Ordering::Relaxed))
    }

    pub(crate) fn set_position(&self, secs: f64) {
        self.position_bits.store(secs.to_bits(), Ordering::Relaxed);
    }

    /// Most recent non-fatal failure message, empty if none.
    pub fn last_error(&self) -> String {
        self.last_error.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn set_last_error(&self, msg: String) {
        if let Ok(mut slot) = self.last_error.lock() {
            *slot = msg;
        }
    }
}

/// How a dispatch run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The whole timeline was dispatched
    Completed,
    /// An external stop aborted the run
    Stopped,
}

/// Walks one timeline to completion or abort.
pub struct Dispatcher<'a> {
    timeline: &'a Timeline,
    clock: Clock<SystemTimeSource>,
    actuator: &'a dyn KeyActuator,
    focus: &'a dyn FocusMonitor,
    held: &'a Mutex<HeldKeys>,
    shared: &'a DispatchShared,
    commands: &'a Receiver<EngineCommand>,
    /// Wall-clock instant of the previous chord's last actuator call
    last_call: Option<Instant>,
}

impl<'a> Dispatcher<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timeline: &'a Timeline,
        actuator: &'a dyn KeyActuator,
        focus: &'a dyn FocusMonitor,
        held: &'a Mutex<HeldKeys>,
        shared: &'a DispatchShared,
        commands: &'a Receiver<EngineCommand>,
        speed: f64,
    ) -> Self {
        let mut clock = Clock::new(SystemTimeSource::new());
        clock.set_speed(speed);
        Self {
            timeline,
            clock,
            actuator,
            focus,
            held,
            shared,
            commands,
            last_call: None,
        }
    }

    /// Run the timeline. Dispatch order is exactly timeline order; no
    /// action is skipped or reordered, only delayed by the spacing
    /// gate or focus suspension.
    pub fn run(&mut self) -> RunOutcome {
        let _cleanup = ReleaseGuard { held: self.held, actuator: self.actuator };

        if self.timeline.is_empty() {
            return RunOutcome::Completed;
        }

        self.clock.resume();
        let mut cursor = 0;

        while cursor < self.timeline.len() {
            if self.shared.stop_requested() {
                return RunOutcome::Stopped;
            }
            self.drain_commands();

            if !self.focus.has_focus() && !self.wait_for_focus() {
                return RunOutcome::Stopped;
            }

            let chord = self.timeline.chord_range(cursor);
            let due = self.timeline.actions()[cursor].time;
            if !self.wait_until(due) {
                return RunOutcome::Stopped;
            }
            if !self.enforce_gap() {
                return RunOutcome::Stopped;
            }

            for idx in chord.clone() {
                self.dispatch(self.timeline.actions()[idx]);
            }
            self.last_call = Some(Instant::now());
            self.shared.set_position(self.clock.elapsed());
            cursor = chord.end;
        }

        // Every release was dispatched, so nothing should be held.
        // Repair rather than trust if that ever fails to hold.
        let mut held = lock_held(self.held);
        if !held.is_empty() {
            log::warn!("{} key(s) still held at timeline end", held.len());
            held.release_all(self.actuator);
        }
        RunOutcome::Completed
    }

    /// Sleep in bounded slices until virtual time reaches `due`.
    /// Returns false on stop. Never oversleeps the target by more
    /// than the polling granularity.
    fn wait_until(&mut self, due: f64) -> bool {
        loop {
            let pos = self.clock.elapsed();
            self.shared.set_position(pos);
            let wait = due - pos;
            if wait <= 0.0 {
                return true;
            }
            if self.shared.stop_requested() {
                return false;
            }
            if !self.focus.has_focus() && !self.wait_for_focus() {
                return false;
            }
            self.drain_commands();

            let real = Duration::from_secs_f64(wait / self.clock.speed());
            thread::sleep(real.min(POLL_INTERVAL));
        }
    }

    /// Pause the clock until focus returns. Returns false on stop.
    fn wait_for_focus(&mut self) -> bool {
        self.clock.pause();
        self.shared.set_suspended(true);
        log::debug!("target window lost focus, suspending dispatch");

        let resumed = loop {
            if self.shared.stop_requested() {
                break false;
            }
            if self.focus.has_focus() {
                break true;
            }
            self.drain_commands();
            thread::sleep(POLL_INTERVAL);
        };

        self.shared.set_suspended(false);
        if resumed {
            log::debug!("focus regained, resuming dispatch");
            self.clock.resume();
        }
        resumed
    }

    /// Hold off until 50ms have passed since the previous chord's
    /// calls. Returns false on stop.
    fn enforce_gap(&mut self) -> bool {
        let Some(last) = self.last_call else {
            return true;
        };
        loop {
            let since = last.elapsed();
            if since >= MIN_ACTION_GAP {
                return true;
            }
            if self.shared.stop_requested() {
                return false;
            }
            thread::sleep((MIN_ACTION_GAP - since).min(POLL_INTERVAL));
        }
    }

    fn drain_commands(&mut self) {
        while let Ok(cmd) = self.commands.try_recv() {
            match cmd {
                EngineCommand::SetSpeed(factor) => self.clock.set_speed(factor),
            }
        }
    }

    /// Fire one action. Actuator failures are logged and surfaced but
    /// never abort the run. Held-key bookkeeping only trusts calls
    /// that succeeded, so the final cleanup retries anything dubious.
    fn dispatch(&mut self, action: KeyAction) {
        let mut held = lock_held(self.held);
        match action.kind {
            ActionKind::Press => {
                if held.remove(action.key) {
                    // Same-key retrigger: release first so the game
                    // sees a fresh press instead of a double-press.
                    log::debug!("retrigger on {}, forcing release", action.key);
                    if let Err(e) = self.actuator.release(action.key) {
                        log::error!("retrigger release failed for {}: {e}", action.key);
                    }
                }
                match self.actuator.press(action.key) {
                    Ok(()) => {
                        held.insert(action.key, action.group);
                    }
                    Err(e) => {
                        log::error!("key press failed for {}: {e}", action.key);
                        self.shared
                            .set_last_error(format!("key simulation failed: {e}"));
                    }
                }
            }
            ActionKind::Release => {
                // A release only applies while its own note holds the
                // key. After a retrigger the key belongs to the new
                // group and the old note's release is stale.
                if held.owner(action.key) != Some(action.group) {
                    return;
                }
                match self.actuator.release(action.key) {
                    Ok(()) => {
                        held.remove(action.key);
                    }
                    Err(e) => {
                        // Stays in the held set; release_all retries.
                        log::error!("key release failed for {}: {e}", action.key);
                        self.shared
                            .set_last_error(format!("key simulation failed: {e}"));
                    }
                }
            }
        }
    }
}

/// Releases everything still held when the dispatcher exits by any
/// path, including a panic unwinding the worker.
struct ReleaseGuard<'a> {
    held: &'a Mutex<HeldKeys>,
    actuator: &'a dyn KeyActuator,
}

impl Drop for ReleaseGuard<'_> {
    fn drop(&mut self) {
        let mut held = lock_held(self.held);
        if !held.is_empty() {
            log::warn!("releasing {} held key(s) on dispatch exit", held.len());
            held.release_all(self.actuator);
        }
    }
}
