//! Frame timing utilities

use std::time::Instant;

/// Wall-clock frame timer
///
/// Produces the elapsed time between consecutive `tick` calls. The value is
/// reported as measured; bounding catch-up work is the scene's job.
pub struct FrameClock {
    last_frame: Instant,
    delta_time: f32,
    total_time: f64,
    frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a new clock starting now
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance to a new frame and return the elapsed seconds since the last one
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.delta_time = elapsed.as_secs_f32();
        self.total_time += elapsed.as_secs_f64();
        self.frame_count += 1;
        self.delta_time
    }

    /// Seconds measured by the most recent `tick`
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Total seconds across all ticks
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Number of ticks so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average frames per second since creation
    pub fn average_fps(&self) -> f64 {
        if self.total_time > 0.0 {
            self.frame_count as f64 / self.total_time
        } else {
            0.0
        }
    }
}
