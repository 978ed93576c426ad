use std::path::Path;
use std::sync::Arc;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Reads frames from a video source.
///
/// Implementations handle codec and container details; compositing only
/// sees `Frame` and `VideoMetadata`.
pub trait VideoReader: Send {
    /// Opens a video file and returns its metadata.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over RGB frames in decode order, indexed from 0.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the reader.
    fn close(&mut self);
}

/// Produces a fresh reader per source so clips can be decoded in parallel.
pub type ReaderFactory = Arc<dyn Fn() -> Box<dyn VideoReader> + Send + Sync>;
