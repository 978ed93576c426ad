use std::path::Path;

use serde::Deserialize;

use crate::matching::domain::transcript::{Transcript, TranscriptSegment};

#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptFile {
    Bare(Vec<TranscriptSegment>),
    Verbose { segments: Vec<TranscriptSegment> },
}

/// Loads a transcript saved by the transcription service.
///
/// Accepts a bare segment array or a Whisper `verbose_json` object. A
/// missing or unreadable file yields an empty transcript.
pub fn read_transcript(path: &Path) -> Transcript {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Could not read transcript {}: {e}", path.display());
            return Transcript::default();
        }
    };

    match serde_json::from_str::<TranscriptFile>(&json) {
        Ok(TranscriptFile::Bare(segments)) | Ok(TranscriptFile::Verbose { segments }) => {
            Transcript::from_segments(segments)
        }
        Err(e) => {
            log::warn!("Transcript {} is not valid: {e}", path.display());
            Transcript::default()
        }
    }
}
