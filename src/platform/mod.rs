//! Platform abstraction layer
//!
//! Turns wall-clock timestamps into simulation deltas and watches frame
//! times so slow devices can drop to a cheaper quality tier.

use crate::consts::MAX_DT;
use crate::settings::QualityPreset;

/// Frames in the rolling average window
pub const FRAME_WINDOW: usize = 60;
/// Average frame time (ms) above which quality steps down
pub const SLOW_FRAME_MS: f32 = 20.0;

/// Result of one `FrameClock::frame` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStep {
    /// Seconds to advance the simulation by
    pub dt: f32,
    /// Set when this frame triggered a quality downgrade
    pub downgraded: Option<QualityPreset>,
}

/// Frame pacing and automatic quality downgrade
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    frame_times: [f32; FRAME_WINDOW],
    frame_index: usize,
    filled: usize,
    max_dt: f32,
    auto_quality: bool,
    quality: QualityPreset,
}

impl FrameClock {
    pub fn new(quality: QualityPreset, auto_quality: bool) -> Self {
        Self {
            last_ms: None,
            frame_times: [0.0; FRAME_WINDOW],
            frame_index: 0,
            filled: 0,
            max_dt: MAX_DT,
            auto_quality,
            quality,
        }
    }

    pub fn with_max_dt(mut self, max_dt: f32) -> Self {
        self.max_dt = max_dt.max(0.0);
        self
    }

    pub fn quality(&self) -> QualityPreset {
        self.quality
    }

    /// Average of the recorded frame times in ms (0 before any sample)
    pub fn average_ms(&self) -> f32 {
        if self.filled == 0 {
            return 0.0;
        }
        self.frame_times[..self.filled].iter().sum::<f32>() / self.filled as f32
    }

    pub fn fps(&self) -> u32 {
        let avg = self.average_ms();
        if avg <= 0.0 { 0 } else { (1000.0 / avg).round() as u32 }
    }

    /// Record a frame at `now_ms` (monotonic milliseconds). The first call
    /// only sets the reference point and yields `dt = 0`.
    pub fn frame(&mut self, now_ms: f64) -> FrameStep {
        let elapsed_ms = match self.last_ms {
            Some(last) => (now_ms - last).max(0.0) as f32,
            None => 0.0,
        };
        let first = self.last_ms.is_none();
        self.last_ms = Some(now_ms);
        if first || !elapsed_ms.is_finite() {
            return FrameStep {
                dt: 0.0,
                downgraded: None,
            };
        }

        self.frame_times[self.frame_index] = elapsed_ms;
        self.frame_index = (self.frame_index + 1) % FRAME_WINDOW;
        self.filled = (self.filled + 1).min(FRAME_WINDOW);

        let mut downgraded = None;
        if self.auto_quality && self.filled == FRAME_WINDOW && self.average_ms() > SLOW_FRAME_MS {
            if let Some(lower) = self.quality.downgrade() {
                log::info!(
                    "avg frame {:.1} ms, quality {} -> {}",
                    self.average_ms(),
                    self.quality.as_str(),
                    lower.as_str()
                );
                self.quality = lower;
                downgraded = Some(lower);
            }
            self.reset_window();
        }

        FrameStep {
            dt: (elapsed_ms / 1000.0).min(self.max_dt),
            downgraded,
        }
    }

    /// Forget timing history, e.g. after the page was hidden
    pub fn reset(&mut self) {
        self.last_ms = None;
        self.reset_window();
    }

    fn reset_window(&mut self) {
        self.frame_times = [0.0; FRAME_WINDOW];
        self.frame_index = 0;
        self.filled = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dt_clamped() {
        let mut clock = FrameClock::new(QualityPreset::High, false);
        assert_eq!(clock.frame(1000.0).dt, 0.0);
        assert!((clock.frame(1016.0).dt - 0.016).abs() < 1e-6);
        // Tab came back after five seconds
        assert!((clock.frame(6016.0).dt - MAX_DT).abs() < 1e-6);
        // Clock went backwards
        assert_eq!(clock.frame(5000.0).dt, 0.0);
    }

    #[test]
    fn test_slow_frames_downgrade_one_step() {
        let mut clock = FrameClock::new(QualityPreset::High, true);
        let mut t = 0.0;
        clock.frame(t);
        let mut hits = Vec::new();
        for _ in 0..FRAME_WINDOW {
            t += 25.0;
            if let Some(q) = clock.frame(t).downgraded {
                hits.push(q);
            }
        }
        assert_eq!(hits, vec![QualityPreset::Medium]);
        assert_eq!(clock.average_ms(), 0.0);

        for _ in 0..FRAME_WINDOW * 2 {
            t += 25.0;
            clock.frame(t);
        }
        assert_eq!(clock.quality(), QualityPreset::Low);
    }

    #[test]
    fn test_fast_frames_keep_quality() {
        let mut clock = FrameClock::new(QualityPreset::High, true);
        let mut t = 0.0;
        for _ in 0..200 {
            clock.frame(t);
            t += 16.0;
        }
        assert_eq!(clock.quality(), QualityPreset::High);
        assert_eq!(clock.fps(), 63);
    }

    #[test]
    fn test_disabled_auto_quality() {
        let mut clock = FrameClock::new(QualityPreset::Medium, false);
        let mut t = 0.0;
        for _ in 0..200 {
            clock.frame(t);
            t += 40.0;
        }
        assert_eq!(clock.quality(), QualityPreset::Medium);
    }
}
