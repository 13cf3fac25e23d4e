//! Timing helpers for grid builds and field updates.
use std::time::Instant;
use tracing::trace;

/// Measures the time until it is dropped and reports it at `trace` level.
pub struct ProfilerScope {
    start: Instant,
    name: &'static str,
}

impl ProfilerScope {
    pub fn new(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    /// Elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ProfilerScope {
    fn drop(&mut self) {
        trace!("{} took {:.3} ms", self.name, self.elapsed_ms());
    }
}

/// Duration of the most recent tick plus a running average.
#[derive(Debug, Clone, Default)]
pub struct FrameTimer {
    last_frame_time_ms: f64,
    total_ms: f64,
    frames: u64,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, time_ms: f64) {
        self.last_frame_time_ms = time_ms;
        self.total_ms += time_ms;
        self.frames += 1;
    }

    pub fn last_frame_time_ms(&self) -> f64 {
        self.last_frame_time_ms
    }

    /// Mean tick duration, 0 before the first record.
    pub fn average_frame_time_ms(&self) -> f64 {
        if self.frames == 0 {
            0.0
        } else {
            self.total_ms / self.frames as f64
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
