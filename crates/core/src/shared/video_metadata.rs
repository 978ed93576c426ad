use std::path::PathBuf;

use super::constants::{FALLBACK_FPS, MAX_TIME_BASE_DENOMINATOR};
use super::frame::FrameSize;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Exact stream rate as `(numerator, denominator)`, e.g. `(30000, 1001)`.
    pub frame_rate: Option<(i32, i32)>,
    pub total_frames: usize,
    /// Container or stream duration in seconds; 0.0 when unknown.
    pub duration_sec: f64,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    pub fn frame_size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }

    /// The stream's frame rate, or a fixed fallback for streams that omit it.
    pub fn effective_fps(&self) -> f64 {
        if self.fps.is_finite() && self.fps > 0.0 {
            self.fps
        } else {
            FALLBACK_FPS
        }
    }

    /// Frame rate as a fraction for encoder time bases.
    ///
    /// Prefers the exact stream rate so NTSC rates stay in sync with
    /// stream-copied audio; otherwise rounds the effective rate.
    pub fn rational_fps(&self) -> (i32, i32) {
        match self.frame_rate {
            Some((num, den)) if num > 0 && den > 0 && num <= MAX_TIME_BASE_DENOMINATOR => (num, den),
            _ => (self.effective_fps().round().max(1.0) as i32, 1),
        }
    }

    /// Best duration estimate: the reported duration, else frames / fps.
    pub fn estimated_duration(&self) -> f64 {
        if self.duration_sec > 0.0 {
            self.duration_sec
        } else if self.fps > 0.0 {
            self.total_frames as f64 / self.fps
        } else {
            0.0
        }
    }
}
