use crate::catalog::domain::clip_catalog::ClipCatalog;

use super::candidate_insertion::CandidateInsertion;
use super::transcript::Transcript;

/// External collaborator that proposes where clips could go.
///
/// Its output carries no validity guarantee; everything it returns goes
/// through validation and scheduling. An error is treated as "no candidates".
pub trait Matcher: Send {
    fn propose(
        &self,
        transcript: &Transcript,
        catalog: &ClipCatalog,
    ) -> Result<Vec<CandidateInsertion>, Box<dyn std::error::Error>>;
}

/// Proposes nothing. Used when no matcher output is available.
pub struct NullMatcher;

impl Matcher for NullMatcher {
    fn propose(
        &self,
        _transcript: &Transcript,
        _catalog: &ClipCatalog,
    ) -> Result<Vec<CandidateInsertion>, Box<dyn std::error::Error>> {
        Ok(Vec::new())
    }
}
