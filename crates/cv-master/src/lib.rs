//! Headless playback controller for clavio.
//!
//! Provides a unified API for loading scores, configuring the mapping,
//! and running playback that both the CLI and any future UI can share.
//! Owns the dispatch worker thread; everything here is called from the
//! controlling thread.

mod config;

use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use cv_engine::{
    CacheKey, DispatchShared, Dispatcher, EngineCommand, HeldKeys, KeyActuator, FocusMonitor,
    RunOutcome, TimelineCache, MAX_SPEED, MIN_SPEED, POLL_INTERVAL,
};
use cv_keymap::Mapping;

// Re-export common types so callers don't need the lower crates directly.
pub use cv_formats::FormatError;
pub use cv_ir::{Layout, PlaybackState, Score, SharpPolicy, Timeline};

pub use config::{Config, ConfigError};

/// Number of countdown ticks before dispatch begins.
pub const COUNTDOWN_TICKS: u8 = 3;
/// Wall-clock interval between countdown ticks.
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

/// Playback controller. Owns a score, the mapping settings, and the
/// dispatch worker while one is running.
pub struct Player {
    score: Option<Score>,
    layout: Layout,
    transpose: bool,
    sharp_policy: SharpPolicy,
    speed: f64,
    cache: TimelineCache,
    actuator: Arc<dyn KeyActuator>,
    focus: Arc<dyn FocusMonitor>,
    held: Arc<Mutex<HeldKeys>>,
    shared: Arc<DispatchShared>,
    state: Arc<AtomicU8>,
    countdown: Arc<AtomicU8>,
    worker: Option<WorkerHandle>,
}

struct WorkerHandle {
    commands: Sender<EngineCommand>,
    thread: Option<JoinHandle<()>>,
}

impl Player {
    pub fn new(actuator: Arc<dyn KeyActuator>, focus: Arc<dyn FocusMonitor>) -> Self {
        Self {
            score: None,
            layout: Layout::default(),
            transpose: false,
            sharp_policy: SharpPolicy::default(),
            speed: 1.0,
            cache: TimelineCache::new(),
            actuator,
            focus,
            held: Arc::new(Mutex::new(HeldKeys::new())),
            shared: Arc::new(DispatchShared::new()),
            state: Arc::new(AtomicU8::new(PlaybackState::Stopped.to_u8())),
            countdown: Arc::new(AtomicU8::new(0)),
            worker: None,
        }
    }

    // --- Score management ---

    pub fn score(&self) -> Option<&Score> {
        self.score.as_ref()
    }

    /// Load a Standard MIDI File from disk, replacing any current
    /// score. Running playback is stopped first.
    pub fn load_midi_file(&mut self, path: &Path) -> Result<(), FormatError> {
        self.stop();
        self.score = Some(cv_formats::load_midi_file(path)?);
        Ok(())
    }

    /// Install an already-decoded score.
    pub fn load_score(&mut self, score: Score) {
        self.stop();
        self.score = Some(score);
    }

    // --- Mapping and speed settings ---

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Mapping changes stop playback first: a timeline is never
    /// swapped under a live cursor.
    pub fn set_layout(&mut self, layout: Layout) {
        self.stop();
        self.layout = layout;
    }

    pub fn transpose(&self) -> bool {
        self.transpose
    }

    pub fn set_transpose(&mut self, transpose: bool) {
        self.stop();
        self.transpose = transpose;
    }

    pub fn sharp_policy(&self) -> SharpPolicy {
        self.sharp_policy
    }

    pub fn set_sharp_policy(&mut self, policy: SharpPolicy) {
        self.stop();
        self.sharp_policy = policy;
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Change playback speed, clamped to the supported range. Applies
    /// live to a running dispatch without rebuilding anything.
    pub fn set_speed(&mut self, factor: f64) {
        self.speed = factor.clamp(MIN_SPEED, MAX_SPEED);
        if let Some(worker) = &self.worker {
            let _ = worker.commands.send(EngineCommand::SetSpeed(self.speed));
        }
    }

    /// `(playable, total)` note counts for the loaded score under the
    /// current mapping settings.
    pub fn compatibility(&self) -> Option<(usize, usize)> {
        let score = self.score.as_ref()?;
        Some(cv_keymap::compatibility(
            score.notes(),
            self.layout,
            self.transpose,
            self.sharp_policy,
        ))
    }

    /// Apply persisted settings.
    pub fn apply_config(&mut self, config: &Config) {
        self.layout = config.layout;
        self.transpose = config.transpose;
        self.sharp_policy = config.sharp_policy;
        self.set_speed(config.speed);
    }

    // --- Playback ---

    /// Start playback of the loaded score: countdown first, then the
    /// dispatch loop on a worker thread. A no-op while a run is
    /// already in progress, with no score, or when nothing in the
    /// score is mappable.
    pub fn play(&mut self) {
        let Some(score) = self.score.clone() else {
            log::info!("play requested with no score loaded");
            return;
        };
        if self.is_playing() {
            return;
        }

        let mapping = Mapping::new(self.layout, self.transpose, self.sharp_policy);
        let key = CacheKey {
            score: score.source().to_string(),
            layout: self.layout,
            transpose: self.transpose,
            sharp_policy: self.sharp_policy,
        };
        let timeline = self
            .cache
            .get_or_build(key, score.notes(), move |p| mapping.map(p));
        if timeline.is_empty() {
            log::info!("no playable notes under the current mapping");
            return;
        }

        self.shared.reset();
        transition(&self.state, PlaybackState::CountingDown);

        let (tx, rx) = crossbeam_channel::unbounded();
        let ctx = WorkerContext {
            timeline,
            actuator: Arc::clone(&self.actuator),
            focus: Arc::clone(&self.focus),
            held: Arc::clone(&self.held),
            shared: Arc::clone(&self.shared),
            state: Arc::clone(&self.state),
            countdown: Arc::clone(&self.countdown),
            speed: self.speed,
        };
        let thread = thread::spawn(move || worker_thread(ctx, rx));

        self.worker = Some(WorkerHandle { commands: tx, thread: Some(thread) });
    }

    /// Stop playback and join the worker. Returns with every key
    /// released, the position back at zero, and the state machine at
    /// Stopped.
    pub fn stop(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            self.shared.request_stop();
            if let Some(handle) = worker.thread.take() {
                let _ = handle.join();
            }
            self.shared.reset();
        }
    }

    /// Force-release anything held right now, playback or not. The
    /// escape hatch for a wedged game window.
    pub fn release_all_keys(&self) {
        let mut held = self
            .held
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !held.is_empty() {
            log::warn!("emergency release of {} key(s)", held.len());
            held.release_all(&*self.actuator);
        }
    }

    // --- Observation ---

    pub fn state(&self) -> PlaybackState {
        PlaybackState::from_u8(self.state.load(Ordering::Relaxed))
    }

    pub fn is_playing(&self) -> bool {
        self.state() != PlaybackState::Stopped
    }

    /// Current virtual position in seconds.
    pub fn position(&self) -> f64 {
        self.shared.position()
    }

    /// Total duration of the loaded score in seconds, 0.0 when none.
    pub fn duration(&self) -> f64 {
        self.score.as_ref().map(Score::duration).unwrap_or(0.0)
    }

    /// Notes starting within `lookahead` seconds of the current
    /// position. Preview data for a status display.
    pub fn upcoming_notes(&self, lookahead: f64) -> Vec<cv_ir::Note> {
        self.score
            .as_ref()
            .map(|s| s.notes_within(self.position(), lookahead))
            .unwrap_or_default()
    }

    /// Countdown ticks remaining, 0 once dispatch has begun.
    pub fn countdown_remaining(&self) -> u8 {
        self.countdown.load(Ordering::Relaxed)
    }

    /// Whether playback is focus-suspended.
    pub fn suspended(&self) -> bool {
        self.shared.suspended()
    }

    /// Most recent non-fatal dispatch failure, empty if none.
    pub fn last_error(&self) -> String {
        self.shared.last_error()
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
        self.release_all_keys();
    }
}

struct WorkerContext {
    timeline: Arc<Timeline>,
    actuator: Arc<dyn KeyActuator>,
    focus: Arc<dyn FocusMonitor>,
    held: Arc<Mutex<HeldKeys>>,
    shared: Arc<DispatchShared>,
    state: Arc<AtomicU8>,
    countdown: Arc<AtomicU8>,
    speed: f64,
}

fn worker_thread(ctx: WorkerContext, commands: crossbeam_channel::Receiver<EngineCommand>) {
    // Drop guard so the Stopped transition happens on every exit
    // path, including a panic unwinding out of the dispatcher. The
    // dispatcher's own guard has already released held keys by then.
    let _reset = StopOnExit { state: &ctx.state };

    if run_countdown(&ctx) {
        transition(&ctx.state, PlaybackState::Playing);
        let mut dispatcher = Dispatcher::new(
            &ctx.timeline,
            &*ctx.actuator,
            &*ctx.focus,
            &ctx.held,
            &ctx.shared,
            &commands,
            ctx.speed,
        );
        match dispatcher.run() {
            RunOutcome::Completed => log::info!("playback finished"),
            RunOutcome::Stopped => log::info!("playback stopped"),
        }
    }
}

struct StopOnExit<'a> {
    state: &'a AtomicU8,
}

impl Drop for StopOnExit<'_> {
    fn drop(&mut self) {
        transition(self.state, PlaybackState::Stopped);
    }
}

/// Tick down before dispatching so the user can switch to the game
/// window. Sliced waits keep stop responsive. Returns false if a stop
/// arrived during the countdown.
fn run_countdown(ctx: &WorkerContext) -> bool {
    for remaining in (1..=COUNTDOWN_TICKS).rev() {
        ctx.countdown.store(remaining, Ordering::Relaxed);
        log::info!("starting in {remaining}...");

        let mut waited = Duration::ZERO;
        while waited < COUNTDOWN_INTERVAL {
            if ctx.shared.stop_requested() {
                ctx.countdown.store(0, Ordering::Relaxed);
                return false;
            }
            thread::sleep(POLL_INTERVAL);
            waited += POLL_INTERVAL;
        }
    }
    ctx.countdown.store(0, Ordering::Relaxed);
    true
}

/// Apply a state transition, enforcing the legal edge set.
fn transition(state: &AtomicU8, to: PlaybackState) {
    let from = PlaybackState::from_u8(state.load(Ordering::Relaxed));
    if from == to {
        return;
    }
    if !from.can_transition_to(to) {
        log::warn!("illegal state transition {from:?} -> {to:?}, ignoring");
        return;
    }
    state.store(to.to_u8(), Ordering::Relaxed);
}
