//! Pausable, speed-scaled virtual clock.

use std::time::Instant;

/// Slowest allowed playback speed.
pub const MIN_SPEED: f64 = 0.25;
/// Fastest allowed playback speed.
pub const MAX_SPEED: f64 = 1.5;

/// Source of monotonic wall-clock seconds.
///
/// Production uses [`SystemTimeSource`]; clock tests drive a manual
/// source so timing behavior is deterministic.
pub trait TimeSource {
    /// Seconds elapsed from an arbitrary fixed epoch.
    fn now(&self) -> f64;
}

/// `Instant`-backed time source.
pub struct SystemTimeSource {
    start: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Maps wall-clock time to virtual playback position.
///
/// Virtual time advances as `real_elapsed_since_resume * speed`,
/// accumulated across pause/resume cycles. Speed changes apply from
/// the moment of the call; already-elapsed virtual time is never
/// rescaled, which is what keeps cached timelines speed-independent.
pub struct Clock<T: TimeSource> {
    source: T,
    /// Virtual seconds accumulated before the last resume
    accumulated: f64,
    /// Source time at the last resume (meaningless while paused)
    anchor: f64,
    speed: f64,
    running: bool,
}

impl<T: TimeSource> Clock<T> {
    /// A paused clock at position zero, speed 1.0.
    pub fn new(source: T) -> Self {
        Self {
            source,
            accumulated: 0.0,
            anchor: 0.0,
            speed: 1.0,
            running: false,
        }
    }

    /// Current virtual position in seconds.
    pub fn elapsed(&self) -> f64 {
        if self.running {
            self.accumulated + (self.source.now() - self.anchor) * self.speed
        } else {
            self.accumulated
        }
    }

    /// Freeze virtual time. Idempotent.
    pub fn pause(&mut self) {
        if self.running {
            self.accumulated = self.elapsed();
            self.running = false;
        }
    }

    /// Re-anchor to the current wall clock and run. Time spent paused
    /// is never counted. Idempotent.
    pub fn resume(&mut self) {
        if !self.running {
            self.anchor = self.source.now();
            self.running = true;
        }
    }

    /// Change the playback rate, clamped to `[MIN_SPEED, MAX_SPEED]`.
    /// Takes effect from now; no retroactive rescaling.
    pub fn set_speed(&mut self, factor: f64) {
        // Fold virtual time elapsed at the old rate in first.
        self.accumulated = self.elapsed();
        self.anchor = self.source.now();
        self.speed = factor.clamp(MIN_SPEED, MAX_SPEED);
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Manually advanced time source for deterministic tests.
    #[derive(Clone)]
    struct ManualTime(Rc<Cell<f64>>);

    impl ManualTime {
        fn new() -> Self {
            Self(Rc::new(Cell::new(0.0)))
        }

        fn advance(&self, secs: f64) {
            self.0.set(self.0.get() + secs);
        }
    }

    impl TimeSource for ManualTime {
        fn now(&self) -> f64 {
            self.0.get()
        }
    }

    fn manual_clock() -> (Clock<ManualTime>, ManualTime) {
        let time = ManualTime::new();
        (Clock::new(time.clone()), time)
    }

    #[test]
    fn starts_paused_at_zero() {
        let (clock, time) = manual_clock();
        time.advance(5.0);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn advances_at_unit_speed() {
        let (mut clock, time) = manual_clock();
        clock.resume();
        time.advance(2.0);
        assert_eq!(clock.elapsed(), 2.0);
    }

    #[test]
    fn pause_freezes_and_resume_reanchors() {
        let (mut clock, time) = manual_clock();
        clock.resume();
        time.advance(1.0);
        clock.pause();
        time.advance(10.0); // ignored while paused
        assert_eq!(clock.elapsed(), 1.0);

        clock.resume();
        time.advance(0.5);
        assert_eq!(clock.elapsed(), 1.5);
    }

    #[test]
    fn speed_scales_virtual_time() {
        let (mut clock, time) = manual_clock();
        clock.set_speed(0.5);
        clock.resume();
        time.advance(4.0);
        assert_eq!(clock.elapsed(), 2.0);
    }

    #[test]
    fn speed_change_is_not_retroactive() {
        let (mut clock, time) = manual_clock();
        clock.resume();
        time.advance(2.0); // 2.0 virtual at 1.0x
        clock.set_speed(0.5);
        time.advance(2.0); // +1.0 virtual at 0.5x
        assert_eq!(clock.elapsed(), 3.0);
    }

    #[test]
    fn speed_is_clamped_not_rejected() {
        let (mut clock, _) = manual_clock();
        clock.set_speed(10.0);
        assert_eq!(clock.speed(), MAX_SPEED);
        clock.set_speed(0.0);
        assert_eq!(clock.speed(), MIN_SPEED);
    }

    #[test]
    fn pause_resume_accumulates_across_cycles() {
        let (mut clock, time) = manual_clock();
        for _ in 0..3 {
            clock.resume();
            time.advance(1.0);
            clock.pause();
            time.advance(100.0);
        }
        assert_eq!(clock.elapsed(), 3.0);
    }
}
