//! The timing gate: moves only count when made close to a beat.
//!
//! Nothing here listens to audio. The presentation layer reports the playback position of the track and the
//! [`BeatTracker`] turns that into the time of the latest beat.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Seconds between two beats.
pub fn beat_period(bpm: f32) -> f64 {
    60.0 / bpm as f64
}

/// Distance from `now` to the nearer of the latest beat and the one before it, in seconds.
pub fn beat_distance(now: f64, beat_time: f64, bpm: f32) -> f64 {
    let current = (now - beat_time).abs();
    let previous = (now - (beat_time - beat_period(bpm))).abs();
    current.min(previous)
}

/// Whether an input at `now` falls strictly within `threshold` seconds of a beat.
pub fn is_on_beat(now: f64, beat_time: f64, bpm: f32, threshold: f32) -> bool {
    beat_distance(now, beat_time, bpm) < threshold as f64
}

/// The index of the beat a playback position falls in.
pub fn beat_index(position: f64, bpm: f32) -> i64 {
    (position * bpm as f64 / 60.0).floor() as i64
}

/// Follows a playing track and remembers when the latest beat started.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BeatTracker {
    bpm: f32,
    position: Option<f64>,
    beat_time: f64,
}

impl BeatTracker {
    /// A tracker for a track at `bpm`, with no position seen yet.
    pub fn new(bpm: f32) -> Self {
        Self { bpm, position: None, beat_time: 0.0 }
    }

    /// Wall time at which the latest beat was noticed.
    pub fn beat_time(&self) -> f64 {
        self.beat_time
    }

    /// Report that the track is at `position` seconds at wall time `now`.
    ///
    /// Returns `true` when a new beat started since the previous report. The first report only primes the tracker.
    pub fn observe(&mut self, position: f64, now: f64) -> bool {
        let crossed = self.position
            .is_some_and(|previous| beat_index(previous, self.bpm) != beat_index(position, self.bpm));
        if crossed {
            self.beat_time = now;
        }
        self.position = Some(position);
        crossed
    }

    /// Forget the track position, as when the music restarts.
    pub fn reset(&mut self) {
        self.position = None;
    }
}

/// The wall time source used by the rhythm gate, in seconds.
pub trait Clock {
    /// Current time in seconds from an arbitrary origin.
    fn now(&self) -> f64;
}

/// Seconds since the clock was created.
#[derive(Copy, Clone, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// A clock driven by its owner, e.g. from a game loop's frame time. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    time: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Jump to `now`.
    pub fn set(&self, now: f64) {
        self.time.set(now);
    }

    /// Move the time forward by `seconds`.
    pub fn advance(&self, seconds: f64) {
        self.time.set(self.time.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.time.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_around_beat() {
        // 120 bpm: beats every half second
        assert!(is_on_beat(10.1, 10.0, 120.0, 0.25));
        assert!(is_on_beat(9.9, 10.0, 120.0, 0.25));
        assert!(!is_on_beat(10.25, 10.0, 120.0, 0.25));
        assert!(!is_on_beat(10.3, 10.0, 120.0, 0.1));
        // early for the next beat, measured against the previous one
        assert!(is_on_beat(9.45, 10.0, 120.0, 0.1));
    }

    #[test]
    fn tracker_marks_new_beats() {
        let mut tracker = BeatTracker::new(120.0);
        assert!(!tracker.observe(0.1, 5.0));
        assert!(!tracker.observe(0.4, 5.3));
        assert!(tracker.observe(0.55, 5.45));
        assert_eq!(tracker.beat_time(), 5.45);
        assert!(!tracker.observe(0.9, 5.8));
        tracker.reset();
        assert!(!tracker.observe(3.0, 8.0));
    }

    #[test]
    fn manual_clock_is_shared() {
        let clock = ManualClock::default();
        let handle = clock.clone();
        handle.set(2.0);
        handle.advance(0.5);
        assert_eq!(clock.now(), 2.5);
    }
}
