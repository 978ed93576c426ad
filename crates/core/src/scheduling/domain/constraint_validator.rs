use crate::catalog::domain::clip_asset::ClipAsset;
use crate::catalog::domain::clip_catalog::ClipCatalog;
use crate::matching::domain::candidate_insertion::CandidateInsertion;
use crate::shared::policy::Policy;

use super::rejection::{Rejection, RejectionReason};

/// A candidate that passed the static checks, with its clip resolved and its
/// duration capped.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedItem {
    /// Position in the matcher output; the scheduler's tie-breaker.
    pub index: usize,
    pub candidate: CandidateInsertion,
    pub clip: ClipAsset,
    /// `candidate.duration_sec` clamped to the policy's maximum.
    pub effective_duration: f64,
}

/// Checks single candidates against the catalog and the duration cap.
///
/// Over-long candidates are clamped rather than rejected.
pub struct ConstraintValidator {
    max_duration_sec: f64,
}

impl ConstraintValidator {
    pub fn new(policy: &Policy) -> Self {
        Self {
            max_duration_sec: policy.max_duration_sec,
        }
    }

    /// Checks, in order: clip known, duration positive, duration capped,
    /// start non-negative.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(
        &self,
        index: usize,
        candidate: &CandidateInsertion,
        catalog: &ClipCatalog,
    ) -> Result<ValidatedItem, RejectionReason> {
        let clip = catalog
            .get(&candidate.clip_id)
            .ok_or_else(|| RejectionReason::UnknownClip {
                clip_id: candidate.clip_id.clone(),
            })?;

        // Negated comparisons so NaN is rejected too.
        if !(candidate.duration_sec > 0.0) {
            return Err(RejectionReason::NonPositiveDuration {
                duration_sec: candidate.duration_sec,
            });
        }

        let effective_duration = candidate.duration_sec.min(self.max_duration_sec);
        if effective_duration < candidate.duration_sec {
            log::debug!(
                "Candidate #{index}: clamping {}s to {}s",
                candidate.duration_sec,
                effective_duration
            );
        }

        if !(candidate.start_sec >= 0.0) {
            return Err(RejectionReason::NegativeStart {
                start_sec: candidate.start_sec,
            });
        }

        Ok(ValidatedItem {
            index,
            candidate: candidate.clone(),
            clip: clip.clone(),
            effective_duration,
        })
    }

    /// Validates every candidate; rejections are logged and collected, never
    /// fatal.
    pub fn validate_all(
        &self,
        candidates: &[CandidateInsertion],
        catalog: &ClipCatalog,
    ) -> (Vec<ValidatedItem>, Vec<Rejection>) {
        let mut accepted = Vec::with_capacity(candidates.len());
        let mut rejected = Vec::new();

        for (index, candidate) in candidates.iter().enumerate() {
            match self.validate(index, candidate, catalog) {
                Ok(item) => accepted.push(item),
                Err(reason) => {
                    let rejection = Rejection {
                        index,
                        clip_id: candidate.clip_id.clone(),
                        start_sec: candidate.start_sec,
                        reason,
                    };
                    rejection.log();
                    rejected.push(rejection);
                }
            }
        }

        (accepted, rejected)
    }
}
