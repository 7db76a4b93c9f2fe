//! Frame timing and rate sampling.
//!
//! A `FrameClock` counts loop iterations and emits one sample per elapsed
//! sampling window (1.0 second by default). Two interchangeable sampling
//! strategies run over the same counters: frames-per-window (`tick`) and
//! average milliseconds-per-frame (`tick_processing_time`).

use std::time::{Duration, Instant};

/// Per-frame clock emitting periodic rate samples.
///
/// Mutated once per loop iteration; the counter and the window start time
/// are reset together whenever the sampling interval elapses.
pub struct FrameClock {
    /// Start of the current sampling window
    window_start: Instant,
    /// Frames counted since the window started
    frames: u32,
    /// Sampling window length (1.0 s by default)
    sample_interval: Duration,
}

impl FrameClock {
    /// Create a clock with the default 1.0 second sampling window
    pub fn new() -> Self {
        Self::with_interval(Duration::from_secs(1))
    }

    /// Create a clock with a custom sampling window
    ///
    /// Mainly useful for tests, which would otherwise wait a full second
    /// per sample.
    pub fn with_interval(sample_interval: Duration) -> Self {
        Self {
            window_start: Instant::now(),
            frames: 0,
            sample_interval,
        }
    }

    /// Count one frame; emit the frame count once per elapsed window.
    ///
    /// Returns `Some(frame_count)` exactly once per completed window,
    /// regardless of how often it is called within the window, then resets
    /// both the counter and the window start time.
    pub fn tick(&mut self) -> Option<u32> {
        self.advance().map(|(frames, _elapsed)| frames)
    }

    /// Count one frame; emit the average milliseconds-per-frame once per
    /// elapsed window.
    ///
    /// Same counters and reset behavior as [`tick`](Self::tick), alternate
    /// sampling strategy.
    pub fn tick_processing_time(&mut self) -> Option<f64> {
        self.advance()
            .map(|(frames, elapsed)| elapsed.as_secs_f64() * 1000.0 / frames as f64)
    }

    /// Shared advance logic: count the frame, close the window if elapsed.
    fn advance(&mut self) -> Option<(u32, Duration)> {
        self.frames += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed >= self.sample_interval {
            let frames = self.frames;
            self.frames = 0;
            self.window_start = Instant::now();
            Some((frames, elapsed))
        } else {
            None
        }
    }

    // ===== ACCESSORS =====

    /// Frames counted in the current (incomplete) window
    pub fn frames_in_window(&self) -> u32 {
        self.frames
    }

    /// The configured sampling window length
    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
