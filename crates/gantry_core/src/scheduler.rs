//! # Fixed-Step Scheduler
//!
//! Turns variable frame deltas into a whole number of fixed simulation
//! steps. The remainder carries to the next frame, so the phase machine
//! always sees the same step size no matter how the host paces rendering.
//!
//! ## Catch-up bound
//!
//! A single frame delta is clamped to `max_frame_delta` before it is
//! accumulated. A tab that was backgrounded for an hour therefore costs at
//! most `max_frame_delta / step` ticks on its first frame back.
//!
//! Time is kept as integer nanoseconds (`Duration`) so tick counts are exact:
//! five seconds at 60 Hz is 300 ticks, never 299.

use std::time::Duration;

/// Frame and tick counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Frames fed to `advance`.
    pub frames: u64,
    /// Ticks executed.
    pub ticks: u64,
    /// Frames whose delta exceeded `max_frame_delta`.
    pub clamped_frames: u64,
    /// Frames with a negative or non-finite delta.
    pub rejected_frames: u64,
    /// Most ticks drained by a single frame.
    pub max_ticks_per_frame: u32,
}

/// Fixed-timestep accumulator.
#[derive(Clone, Debug)]
pub struct FixedStepScheduler {
    /// Size of one simulation step.
    step: Duration,
    /// Longest frame delta honoured.
    max_frame_delta: Duration,
    /// Time not yet consumed by a tick.
    accumulator: Duration,
    /// Counters.
    stats: SchedulerStats,
}

impl FixedStepScheduler {
    /// Creates a scheduler running `tick_rate` steps per second.
    ///
    /// `tick_rate` of zero is treated as one.
    #[must_use]
    pub fn new(tick_rate: u32, max_frame_delta: Duration) -> Self {
        let step = Duration::from_micros(1_000_000 / u64::from(tick_rate.max(1)));

        Self {
            step,
            max_frame_delta: max_frame_delta.max(step),
            accumulator: Duration::ZERO,
            stats: SchedulerStats::default(),
        }
    }

    /// Size of one step.
    #[must_use]
    pub const fn step(&self) -> Duration {
        self.step
    }

    /// Size of one step in seconds.
    #[must_use]
    pub fn step_secs(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Time carried to the next frame.
    #[must_use]
    pub const fn accumulator(&self) -> Duration {
        self.accumulator
    }

    /// Counters since construction.
    #[must_use]
    pub const fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Drops carried time (used when resuming from a pause).
    pub fn reset_accumulator(&mut self) {
        self.accumulator = Duration::ZERO;
    }

    /// Accumulates one frame and calls `on_tick` once per whole step due.
    ///
    /// Returns the number of ticks run.
    pub fn advance(&mut self, frame_delta_secs: f32, mut on_tick: impl FnMut()) -> u32 {
        self.stats.frames += 1;

        let delta = match Duration::try_from_secs_f32(frame_delta_secs) {
            Ok(delta) => delta,
            Err(_) => {
                self.stats.rejected_frames += 1;
                tracing::warn!("Ignoring invalid frame delta {}", frame_delta_secs);
                Duration::ZERO
            }
        };

        let delta = if delta > self.max_frame_delta {
            self.stats.clamped_frames += 1;
            tracing::debug!(
                "Frame delta {:?} clamped to {:?}",
                delta,
                self.max_frame_delta
            );
            self.max_frame_delta
        } else {
            delta
        };

        self.accumulator += delta;

        let mut ticks = 0u32;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            on_tick();
            ticks += 1;
        }

        self.stats.ticks += u64::from(ticks);
        self.stats.max_ticks_per_frame = self.stats.max_ticks_per_frame.max(ticks);
        ticks
    }
}
