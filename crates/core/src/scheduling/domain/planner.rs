use crate::catalog::domain::clip_catalog::ClipCatalog;
use crate::matching::domain::candidate_insertion::CandidateInsertion;
use crate::shared::policy::Policy;

use super::constraint_validator::ConstraintValidator;
use super::insertion_scheduler::InsertionScheduler;
use super::plan::SchedulingOutcome;

/// Validates then schedules a matcher's candidates.
///
/// Rejections from both stages are merged and ordered by candidate index.
/// The engine never adds insertions of its own: an empty outcome stays empty.
pub fn plan_insertions(
    candidates: &[CandidateInsertion],
    catalog: &ClipCatalog,
    policy: &Policy,
) -> SchedulingOutcome {
    let (validated, mut rejections) =
        ConstraintValidator::new(policy).validate_all(candidates, catalog);
    let (plan, conflicts) = InsertionScheduler::new(policy).schedule(&validated);

    rejections.extend(conflicts);
    rejections.sort_by_key(|r| r.index);

    SchedulingOutcome { plan, rejections }
}
