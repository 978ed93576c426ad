use std::path::{Path, PathBuf};

use crate::catalog::domain::clip_analyzer::ClipAnalyzer;
use crate::catalog::domain::clip_asset::ClipAsset;
use crate::shared::constants::CLIP_ID_PREFIX;
use crate::shared::frame::FrameSize;
use crate::video::domain::video_reader::ReaderFactory;

/// Opens each clip with a [`VideoReader`](crate::video::domain::video_reader::VideoReader)
/// and assigns ids by position: `broll_0`, `broll_1`, ...
pub struct ReaderClipAnalyzer {
    reader_factory: ReaderFactory,
}

impl ReaderClipAnalyzer {
    pub fn new(reader_factory: ReaderFactory) -> Self {
        Self { reader_factory }
    }

    fn inspect(&self, path: &Path) -> (f64, FrameSize) {
        let mut reader = (self.reader_factory)();
        match reader.open(path) {
            Ok(metadata) => {
                reader.close();
                (metadata.estimated_duration(), metadata.frame_size())
            }
            Err(e) => {
                log::warn!("Could not read clip {}: {e}", path.display());
                (0.0, FrameSize::default())
            }
        }
    }
}

impl ClipAnalyzer for ReaderClipAnalyzer {
    fn analyze(&self, paths: &[PathBuf]) -> Vec<ClipAsset> {
        paths
            .iter()
            .enumerate()
            .map(|(index, path)| {
                let (known_duration, frame_size) = self.inspect(path);
                let asset = ClipAsset {
                    id: format!("{CLIP_ID_PREFIX}{index}"),
                    source_path: path.clone(),
                    known_duration,
                    frame_size,
                    description: describe(path),
                };
                log::debug!(
                    "Catalogued {} ({:.2}s, {}x{}) from {}",
                    asset.id,
                    asset.known_duration,
                    asset.frame_size.width,
                    asset.frame_size.height,
                    path.display()
                );
                asset
            })
            .collect()
    }
}

fn describe(path: &Path) -> String {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("Visuals related to {filename}. General stock footage suitable for illustration.")
}
