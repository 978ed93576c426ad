use serde::{Deserialize, Serialize};

/// One timed span of recognised speech.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl TranscriptSegment {
    fn is_well_formed(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start >= 0.0 && self.end >= self.start
    }
}

/// The A-roll transcript in speech order. An empty transcript is valid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transcript {
    segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Keeps segments with `0 <= start <= end`; others are logged and dropped.
    pub fn from_segments(segments: Vec<TranscriptSegment>) -> Self {
        let segments = segments
            .into_iter()
            .enumerate()
            .filter_map(|(i, seg)| {
                if seg.is_well_formed() {
                    Some(seg)
                } else {
                    log::warn!(
                        "Dropping transcript segment {i}: start={} end={}",
                        seg.start,
                        seg.end
                    );
                    None
                }
            })
            .collect();
        Self { segments }
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// One `[start-end] text` line per segment, times to two decimals.
    pub fn formatted(&self) -> String {
        self.segments
            .iter()
            .map(|s| format!("[{:.2}-{:.2}] {}", s.start, s.end, s.text.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
