use serde::Serialize;
use thiserror::Error;

/// Why a candidate did not make it into the plan.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
    #[error("clip '{clip_id}' is not in the catalog")]
    UnknownClip { clip_id: String },
    #[error("duration {duration_sec}s is not positive")]
    NonPositiveDuration { duration_sec: f64 },
    #[error("start {start_sec}s is negative")]
    NegativeStart { start_sec: f64 },
    #[error("starts within {min_gap_sec}s of the previous insertion ending at {previous_end_sec}s")]
    Conflict {
        previous_end_sec: f64,
        min_gap_sec: f64,
    },
}

/// A rejected candidate, identified by its position in the matcher output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub index: usize,
    pub clip_id: String,
    pub start_sec: f64,
    pub reason: RejectionReason,
}

impl Rejection {
    pub(crate) fn log(&self) {
        log::warn!(
            "Rejected candidate #{} (clip '{}' at {}s): {}",
            self.index,
            self.clip_id,
            self.start_sec,
            self.reason
        );
    }
}
