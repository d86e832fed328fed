use std::fmt;

use serde::{Deserialize, Serialize};

/// Skip reason recorded when a page comes back as HTML with no raw pointer.
pub const SKIP_HTML_WITHOUT_RAW: &str = "HTML without raw URL";

/// How a single expected document was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OutcomeStatus {
    Added,
    Updated,
    Unchanged,
    Skipped { reason: String },
}

impl OutcomeStatus {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// True when the document was written to disk.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Added | Self::Updated)
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Updated => write!(f, "updated"),
            Self::Unchanged => write!(f, "unchanged"),
            Self::Skipped { reason } => write!(f, "skipped ({reason})"),
        }
    }
}

/// The classified result for one document in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub filename: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl SyncOutcome {
    pub fn new(filename: impl Into<String>, status: OutcomeStatus) -> Self {
        Self {
            filename: filename.into(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_serializes_with_reason() {
        let outcome = SyncOutcome::new("a.md", OutcomeStatus::skipped(SKIP_HTML_WITHOUT_RAW));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "filename": "a.md",
                "status": "skipped",
                "reason": "HTML without raw URL",
            })
        );
    }

    #[test]
    fn display_includes_skip_reason() {
        assert_eq!(OutcomeStatus::Added.to_string(), "added");
        assert_eq!(
            OutcomeStatus::skipped("fetch failed").to_string(),
            "skipped (fetch failed)"
        );
    }
}
