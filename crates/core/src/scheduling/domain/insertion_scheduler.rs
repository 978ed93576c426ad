use crate::shared::policy::Policy;

use super::constraint_validator::ValidatedItem;
use super::plan::{Plan, ScheduledInsertion};
use super::rejection::{Rejection, RejectionReason};

/// Orders validated items into a conflict-free plan.
///
/// Greedy by start time: items are sorted by `start_sec` (ties keep matcher
/// order) and swept once. An item starting before `last_end + min_gap` is
/// rejected; it is never shifted, since moving it would detach the clip from
/// the speech it illustrates. Pure and deterministic.
pub struct InsertionScheduler {
    min_gap_sec: f64,
}

impl InsertionScheduler {
    pub fn new(policy: &Policy) -> Self {
        Self {
            min_gap_sec: policy.min_gap_sec,
        }
    }

    pub fn schedule(&self, items: &[ValidatedItem]) -> (Plan, Vec<Rejection>) {
        let mut ordered: Vec<&ValidatedItem> = items.iter().collect();
        ordered.sort_by(|a, b| {
            a.candidate
                .start_sec
                .total_cmp(&b.candidate.start_sec)
                .then(a.index.cmp(&b.index))
        });

        let mut accepted: Vec<ScheduledInsertion> = Vec::with_capacity(ordered.len());
        let mut rejected = Vec::new();
        let mut last_end = f64::NEG_INFINITY;

        for item in ordered {
            let start = item.candidate.start_sec;
            if start < last_end + self.min_gap_sec {
                let rejection = Rejection {
                    index: item.index,
                    clip_id: item.candidate.clip_id.clone(),
                    start_sec: start,
                    reason: RejectionReason::Conflict {
                        previous_end_sec: last_end,
                        min_gap_sec: self.min_gap_sec,
                    },
                };
                rejection.log();
                rejected.push(rejection);
                continue;
            }

            let scheduled = ScheduledInsertion {
                candidate_index: item.index,
                start_sec: start,
                requested_duration_sec: item.candidate.duration_sec,
                effective_duration: item.effective_duration,
                clip_id: item.candidate.clip_id.clone(),
                reason: item.candidate.reason.clone(),
                resolved_clip: item.clip.clone(),
            };
            last_end = scheduled.end_sec();
            accepted.push(scheduled);
        }

        (Plan::from_sorted(accepted), rejected)
    }
}
