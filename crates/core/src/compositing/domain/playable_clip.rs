use crate::shared::frame::Frame;

/// How a clip's footage was fitted to its requested window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillMode {
    /// Footage was at least as long as the window and is cut at its end.
    Trim,
    /// Footage was shorter and repeats from its first frame.
    Loop,
}

/// Decoded clip footage that plays for exactly `duration` seconds.
///
/// Holds only the distinct source frames; `frame_at` maps any time in the
/// window onto them, wrapping around when looping.
#[derive(Clone, Debug)]
pub struct PlayableClip {
    clip_id: String,
    frames: Vec<Frame>,
    fps: f64,
    duration: f64,
    mode: FillMode,
}

impl PlayableClip {
    /// `frames` must be non-empty and `fps` positive.
    pub fn new(clip_id: &str, frames: Vec<Frame>, fps: f64, duration: f64, mode: FillMode) -> Self {
        debug_assert!(!frames.is_empty(), "playable clip needs at least one frame");
        debug_assert!(fps > 0.0, "playable clip needs a positive frame rate");
        Self {
            clip_id: clip_id.to_string(),
            frames,
            fps,
            duration,
            mode,
        }
    }

    pub fn clip_id(&self) -> &str {
        &self.clip_id
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn mode(&self) -> FillMode {
        self.mode
    }

    pub fn source_frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Seconds of distinct footage before the clip would repeat.
    pub fn loop_period(&self) -> f64 {
        self.frames.len() as f64 / self.fps
    }

    /// The frame shown `t` seconds into the window (clamped to the window).
    pub fn frame_at(&self, t: f64) -> &Frame {
        let slots = ((self.duration * self.fps).ceil() as usize).max(1);
        let t = t.clamp(0.0, self.duration);
        let slot = ((t * self.fps).floor() as usize).min(slots - 1);
        &self.frames[slot % self.frames.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::FrameSize;
    use approx::assert_relative_eq;

    fn numbered_frames(count: usize) -> Vec<Frame> {
        (0..count)
            .map(|i| Frame::solid(FrameSize::new(2, 2), [i as u8; 3], i))
            .collect()
    }

    #[test]
    fn test_trim_maps_time_to_source_frame() {
        let clip = PlayableClip::new("b1", numbered_frames(30), 10.0, 3.0, FillMode::Trim);
        assert_eq!(clip.frame_at(0.0).index(), 0);
        assert_eq!(clip.frame_at(1.25).index(), 12);
        assert_eq!(clip.frame_at(2.99).index(), 29);
    }

    #[test]
    fn test_end_of_window_shows_last_slot() {
        let clip = PlayableClip::new("b1", numbered_frames(30), 10.0, 3.0, FillMode::Trim);
        assert_eq!(clip.frame_at(3.0).index(), 29);
        assert_eq!(clip.frame_at(50.0).index(), 29);
        assert_eq!(clip.frame_at(-1.0).index(), 0);
    }

    #[test]
    fn test_loop_wraps_to_start() {
        // 2s of footage stretched over 5s.
        let clip = PlayableClip::new("b1", numbered_frames(20), 10.0, 5.0, FillMode::Loop);
        assert_relative_eq!(clip.duration(), 5.0);
        assert_relative_eq!(clip.loop_period(), 2.0);
        assert_eq!(clip.frame_at(1.9).index(), 19);
        assert_eq!(clip.frame_at(2.0).index(), 0);
        assert_eq!(clip.frame_at(4.5).index(), 5);
    }

    #[test]
    fn test_single_frame_clip_holds() {
        let clip = PlayableClip::new("still", numbered_frames(1), 25.0, 4.0, FillMode::Loop);
        assert_eq!(clip.frame_at(3.7).index(), 0);
    }
}
