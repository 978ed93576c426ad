use std::path::PathBuf;

use super::clip_asset::ClipAsset;

/// Turns clip files into catalog entries.
///
/// Implementations assign ids and measure durations. A clip that cannot be
/// read is still returned (with a zero duration) so that one bad file
/// surfaces later as a skipped insertion rather than a failed run.
pub trait ClipAnalyzer: Send {
    fn analyze(&self, paths: &[PathBuf]) -> Vec<ClipAsset>;
}
