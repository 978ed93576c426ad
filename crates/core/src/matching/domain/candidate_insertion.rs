use serde::{Deserialize, Serialize};

/// A proposed B-roll placement from the matcher. Untrusted: the clip may be
/// unknown and the window may be empty, negative or overlapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateInsertion {
    pub start_sec: f64,
    pub duration_sec: f64,
    #[serde(rename = "broll_id")]
    pub clip_id: String,
    #[serde(default)]
    pub reason: String,
}

impl CandidateInsertion {
    pub fn new(start_sec: f64, duration_sec: f64, clip_id: &str) -> Self {
        Self {
            start_sec,
            duration_sec,
            clip_id: clip_id.to_string(),
            reason: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_matcher_field_names() {
        let c: CandidateInsertion = serde_json::from_str(
            r#"{"start_sec": 1.5, "duration_sec": 3, "broll_id": "broll_0", "reason": "city"}"#,
        )
        .unwrap();
        assert_eq!(c.start_sec, 1.5);
        assert_eq!(c.duration_sec, 3.0);
        assert_eq!(c.clip_id, "broll_0");
        assert_eq!(c.reason, "city");
    }

    #[test]
    fn test_reason_is_optional() {
        let c: CandidateInsertion =
            serde_json::from_str(r#"{"start_sec": 0, "duration_sec": 1, "broll_id": "b"}"#)
                .unwrap();
        assert!(c.reason.is_empty());
    }
}
