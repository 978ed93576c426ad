use std::path::PathBuf;

use serde::Serialize;

use crate::shared::frame::FrameSize;

/// A B-roll clip known to this run. Immutable once analyzed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClipAsset {
    pub id: String,
    pub source_path: PathBuf,
    /// Seconds of playable footage; 0.0 when the clip could not be read.
    pub known_duration: f64,
    pub frame_size: FrameSize,
    pub description: String,
}
