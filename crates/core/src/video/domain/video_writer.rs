use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Abstracts the composite encoder so rendering does not depend on a
/// specific codec library. Exactly one writer is open per render.
pub trait VideoWriter: Send {
    /// `metadata` describes the output stream; its `source_path`, if set,
    /// names the file whose audio is carried into the output.
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>>;

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Flushes the encoder and muxes source audio into the output.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}

/// Produces a fresh writer per render.
pub type WriterFactory = std::sync::Arc<dyn Fn() -> Box<dyn VideoWriter> + Send + Sync>;
