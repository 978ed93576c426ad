use thiserror::Error;

use crate::catalog::domain::clip_asset::ClipAsset;
use crate::compositing::domain::frame_resizer::FrameResizer;
use crate::compositing::domain::playable_clip::{FillMode, PlayableClip};
use crate::shared::frame::FrameSize;
use crate::video::domain::video_reader::ReaderFactory;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("clip '{clip_id}' is unusable: {reason}")]
    AssetUnusable { clip_id: String, reason: String },
}

impl NormalizeError {
    fn unusable(clip: &ClipAsset, reason: impl Into<String>) -> Self {
        Self::AssetUnusable {
            clip_id: clip.id.clone(),
            reason: reason.into(),
        }
    }
}

/// Fits a clip's footage to its scheduled window.
///
/// Footage at least as long as the window is trimmed; shorter footage is
/// looped from its first frame. Only the frames needed for one pass over
/// `min(known_duration, requested)` are decoded, and with an output size set
/// each frame is resized as it is decoded.
pub struct DurationNormalizer {
    reader_factory: ReaderFactory,
    output: Option<(FrameResizer, FrameSize)>,
}

impl DurationNormalizer {
    pub fn new(reader_factory: ReaderFactory) -> Self {
        Self {
            reader_factory,
            output: None,
        }
    }

    pub fn with_output(mut self, resizer: FrameResizer, size: FrameSize) -> Self {
        self.output = Some((resizer, size));
        self
    }

    pub fn normalize(&self, clip: &ClipAsset, requested: f64) -> Result<PlayableClip, NormalizeError> {
        if !(requested > 0.0) {
            return Err(NormalizeError::unusable(clip, "requested duration must be positive"));
        }
        if !(clip.known_duration > 0.0) {
            return Err(NormalizeError::unusable(clip, "clip has no playable footage"));
        }

        let mut reader = (self.reader_factory)();
        let metadata = reader
            .open(&clip.source_path)
            .map_err(|e| NormalizeError::unusable(clip, e.to_string()))?;
        if !(metadata.fps > 0.0) {
            reader.close();
            return Err(NormalizeError::unusable(clip, "clip has no frame rate"));
        }
        let fps = metadata.fps;

        let window = clip.known_duration.min(requested);
        let needed = ((window * fps).ceil() as usize).max(1);

        let mut frames = Vec::with_capacity(needed);
        let mut decode_error = None;
        for result in reader.frames().take(needed) {
            match result {
                Ok(frame) => frames.push(match &self.output {
                    Some((resizer, size)) => resizer.resize(&frame, *size),
                    None => frame,
                }),
                Err(e) => {
                    decode_error = Some(e.to_string());
                    break;
                }
            }
        }
        reader.close();

        if frames.is_empty() {
            let reason = decode_error.unwrap_or_else(|| "clip decoded to no frames".to_string());
            return Err(NormalizeError::unusable(clip, reason));
        }
        if let Some(e) = decode_error {
            log::warn!(
                "Clip '{}' stopped decoding after {} frames: {e}",
                clip.id,
                frames.len()
            );
        }

        let mode = if clip.known_duration >= requested && frames.len() >= needed {
            FillMode::Trim
        } else {
            FillMode::Loop
        };

        // Re-number so frame indices are positions within the playable clip.
        for (i, frame) in frames.iter_mut().enumerate() {
            frame.set_index(i);
        }

        let playable = PlayableClip::new(&clip.id, frames, fps, requested, mode);
        if playable.mode() == FillMode::Loop {
            log::debug!(
                "Looping clip '{}' every {:.2}s to fill {:.2}s",
                playable.clip_id(),
                playable.loop_period(),
                requested
            );
        }
        Ok(playable)
    }
}
