use std::path::{Path, PathBuf};

use crate::catalog::domain::clip_catalog::ClipCatalog;
use crate::matching::domain::candidate_insertion::CandidateInsertion;
use crate::matching::domain::matcher::Matcher;
use crate::matching::domain::transcript::Transcript;

use super::matcher_response_parser::parse_candidates;

/// Replays a matcher response saved to disk.
pub struct JsonFileMatcher {
    path: PathBuf,
}

impl JsonFileMatcher {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl Matcher for JsonFileMatcher {
    fn propose(
        &self,
        _transcript: &Transcript,
        _catalog: &ClipCatalog,
    ) -> Result<Vec<CandidateInsertion>, Box<dyn std::error::Error>> {
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(parse_candidates(&raw))
    }
}
