//! Frame clock for the animation loop.
//!
//! The animator is written per frame (smoothing factors are per-frame
//! weights), but the shimmer, twinkle and drift effects need wall-clock
//! seconds. [`FrameClock`] provides both: call [`FrameClock::tick`] once per
//! rendered frame, or [`FrameClock::advance`] to step a simulated frame with
//! a fixed delta (headless runs and tests).
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//! loop {
//!     let t = clock.tick();
//!     scene.frame(t, Instant::now());
//! }
//! ```

use std::time::{Duration, Instant};

/// Elapsed time, frame count and FPS for the render loop.
#[derive(Debug)]
pub struct FrameClock {
    /// When the last real frame occurred.
    last_frame: Instant,
    /// Seconds of animation time since start.
    elapsed: f32,
    /// Seconds of animation time covered by the last frame.
    delta: f32,
    /// Total frames since start.
    frame_count: u64,
    /// Measured frames per second (updated periodically).
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    /// While paused, animation time stands still.
    paused: bool,
    /// Animation speed multiplier (1.0 = real time).
    time_scale: f32,
}

impl FrameClock {
    /// Create a clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            elapsed: 0.0,
            delta: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
            time_scale: 1.0,
        }
    }

    /// Record a real frame. Returns the elapsed animation time in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.advance(raw_delta)
    }

    /// Step one frame of `delta` seconds without consulting the wall clock.
    /// Returns the elapsed animation time in seconds.
    pub fn advance(&mut self, delta: f32) -> f32 {
        self.frame_count += 1;
        self.delta = if self.paused { 0.0 } else { delta * self.time_scale };
        self.elapsed += self.delta;
        self.elapsed
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Set the animation speed multiplier. Negative values clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
