use serde::Serialize;

use crate::catalog::domain::clip_asset::ClipAsset;
use crate::shared::policy::Policy;

use super::rejection::Rejection;

/// An insertion that survived validation and conflict resolution.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScheduledInsertion {
    pub candidate_index: usize,
    pub start_sec: f64,
    /// Duration the matcher asked for, before clamping.
    pub requested_duration_sec: f64,
    /// Duration that will actually play.
    pub effective_duration: f64,
    pub clip_id: String,
    pub reason: String,
    pub resolved_clip: ClipAsset,
}

impl ScheduledInsertion {
    /// Logical end time; the crossfade extends past it visually but never
    /// counts towards the gap.
    pub fn end_sec(&self) -> f64 {
        self.start_sec + self.effective_duration
    }
}

/// Sorted, non-overlapping, gap-respecting insertions ready for rendering.
///
/// Only the scheduler constructs plans, so every `Plan` upholds its
/// ordering and spacing invariants.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Plan {
    insertions: Vec<ScheduledInsertion>,
}

impl Plan {
    pub(crate) fn from_sorted(insertions: Vec<ScheduledInsertion>) -> Self {
        Self { insertions }
    }

    pub fn insertions(&self) -> &[ScheduledInsertion] {
        &self.insertions
    }

    pub fn len(&self) -> usize {
        self.insertions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty()
    }

    /// True when ordering, minimum gap and duration cap all hold.
    pub fn satisfies(&self, policy: &Policy) -> bool {
        let capped = self
            .insertions
            .iter()
            .all(|i| i.effective_duration > 0.0 && i.effective_duration <= policy.max_duration_sec);
        let spaced = self
            .insertions
            .windows(2)
            .all(|pair| pair[1].start_sec >= pair[0].end_sec() + policy.min_gap_sec);
        capped && spaced
    }
}

/// The scheduling result: the plan plus every candidate left out of it.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SchedulingOutcome {
    pub plan: Plan,
    pub rejections: Vec<Rejection>,
}
