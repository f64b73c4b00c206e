//! Frame timing and fixed-interval ticks.
//!
//! [`FrameClock`] turns wall-clock instants into per-frame elapsed/delta
//! values. [`Interval`] converts those deltas into discrete ticks at a fixed
//! period, which is how the grid trail decays without a separate timer thread.
//!
//! # Example
//!
//! ```ignore
//! use backdrop::time::FrameClock;
//!
//! let mut clock = FrameClock::new();
//!
//! // In your redraw handler:
//! let time = clock.tick();
//! backdrop.update(&time);
//! ```

use std::time::{Duration, Instant};

/// Timing values for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since the clock started.
    pub elapsed: f32,
    /// Seconds since the previous frame, after clamping and scaling.
    pub delta: f32,
    /// Frames ticked so far, starting at 1 for the first tick.
    pub frame: u64,
}

/// Per-frame clock.
///
/// Deltas are clamped to `max_delta` so that a long stall (hidden window,
/// debugger pause) is treated as one ordinary frame.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    frame_count: u64,
    max_delta: f32,
    /// Fixed delta time for deterministic updates (optional).
    fixed_delta: Option<f32>,
    /// Time scale multiplier (1.0 = normal speed).
    time_scale: f32,
}

impl FrameClock {
    /// Default upper bound on a single frame's delta, in seconds.
    pub const DEFAULT_MAX_DELTA: f32 = 0.1;

    /// Create a new clock starting from now.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a clock whose origin is `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last_frame: start,
            elapsed_secs: 0.0,
            frame_count: 0,
            max_delta: Self::DEFAULT_MAX_DELTA,
            fixed_delta: None,
            time_scale: 1.0,
        }
    }

    /// Advance to the current instant.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advance to `now`. Instants earlier than the previous frame yield a zero delta.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let raw_delta = now.saturating_duration_since(self.last_frame).as_secs_f32();
        let delta = self
            .fixed_delta
            .unwrap_or_else(|| raw_delta.min(self.max_delta))
            * self.time_scale;

        self.last_frame = now.max(self.last_frame);
        self.elapsed_secs += delta;
        self.frame_count += 1;

        FrameTime {
            elapsed: self.elapsed_secs,
            delta,
            frame: self.frame_count,
        }
    }

    /// Scaled seconds accumulated so far.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Total frames ticked.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Wall-clock time since the clock was created.
    #[inline]
    pub fn wall_elapsed(&self) -> Duration {
        self.last_frame.duration_since(self.start)
    }

    /// Set the upper bound applied to measured deltas.
    pub fn set_max_delta(&mut self, max_delta: f32) {
        self.max_delta = max_delta.max(0.0);
    }

    /// Set a fixed delta time for deterministic updates.
    ///
    /// Pass `None` to use real frame timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    /// Set time scale multiplier. Negative values clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Current time scale multiplier.
    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-period tick source fed by frame deltas.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    accumulated: Duration,
}

impl Interval {
    /// Create an interval. A zero period never fires.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            accumulated: Duration::ZERO,
        }
    }

    /// Convenience constructor from milliseconds.
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// The tick period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Add `dt` and return how many ticks became due.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if self.period.is_zero() {
            return 0;
        }
        self.accumulated += dt;
        let mut ticks = 0;
        while self.accumulated >= self.period {
            self.accumulated -= self.period;
            ticks += 1;
        }
        ticks
    }

    /// Drop any partially accumulated time.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }
}
