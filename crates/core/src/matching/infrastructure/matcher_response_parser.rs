use serde_json::Value;

use crate::matching::domain::candidate_insertion::CandidateInsertion;

/// Extracts candidate insertions from raw matcher output.
///
/// Accepts bare JSON or JSON wrapped in a Markdown code fence. Anything
/// unparsable, or without an `insertions` array, yields no candidates.
/// Entries that do not deserialize are skipped individually.
pub fn parse_candidates(raw: &str) -> Vec<CandidateInsertion> {
    let body = strip_code_fence(raw);

    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("Matcher response is not valid JSON ({e}); treating as empty");
            return Vec::new();
        }
    };

    let Some(entries) = value.get("insertions").and_then(Value::as_array) else {
        log::warn!("Matcher response has no 'insertions' array; treating as empty");
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            match serde_json::from_value::<CandidateInsertion>(entry.clone()) {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    log::warn!("Skipping malformed matcher entry {i}: {e}");
                    None
                }
            }
        })
        .collect()
}

fn strip_code_fence(raw: &str) -> &str {
    if let Some((_, rest)) = raw.split_once("```json") {
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    if let Some((_, rest)) = raw.split_once("```") {
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    raw.trim()
}
