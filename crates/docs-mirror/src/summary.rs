use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::outcome::{OutcomeStatus, SyncOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub filename: String,
    pub reason: String,
}

/// Aggregate result of a sync run.
///
/// This is what downstream steps consult to learn whether anything changed.
/// A run with no changes still produces a valid summary with
/// `has_changes == false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub total: usize,
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
    pub unchanged: usize,
    pub skipped: Vec<SkippedDocument>,
    pub has_changes: bool,
}

/// Fold per-document outcomes and removed orphans into a summary.
pub fn summarize(outcomes: &[SyncOutcome], removed: &[String]) -> SyncSummary {
    let mut summary = SyncSummary {
        total: outcomes.len(),
        removed: removed.to_vec(),
        ..SyncSummary::default()
    };

    for outcome in outcomes {
        match &outcome.status {
            OutcomeStatus::Added => summary.added.push(outcome.filename.clone()),
            OutcomeStatus::Updated => summary.updated.push(outcome.filename.clone()),
            OutcomeStatus::Unchanged => summary.unchanged += 1,
            OutcomeStatus::Skipped { reason } => summary.skipped.push(SkippedDocument {
                filename: outcome.filename.clone(),
                reason: reason.clone(),
            }),
        }
    }

    summary.added.sort();
    summary.updated.sort();
    summary.removed.sort();
    summary.skipped.sort_by(|a, b| a.filename.cmp(&b.filename));
    summary.has_changes =
        !(summary.added.is_empty() && summary.updated.is_empty() && summary.removed.is_empty());
    summary
}

impl SyncSummary {
    /// One-line totals, e.g. `Done: 2 added, 1 updated, 0 removed, 40 unchanged, 1 skipped`.
    pub fn headline(&self) -> String {
        format!(
            "Done: {} added, {} updated, {} removed, {} unchanged, {} skipped",
            self.added.len(),
            self.updated.len(),
            self.removed.len(),
            self.unchanged,
            self.skipped.len(),
        )
    }

    /// Markdown report suitable for a CI job summary.
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("## Docs sync\n\n");

        out.push_str("| Status | Count |\n|---|---|\n");
        let _ = writeln!(out, "| Added | {} |", self.added.len());
        let _ = writeln!(out, "| Updated | {} |", self.updated.len());
        let _ = writeln!(out, "| Removed | {} |", self.removed.len());
        let _ = writeln!(out, "| Unchanged | {} |", self.unchanged);
        let _ = writeln!(out, "| Skipped | {} |", self.skipped.len());

        if !self.has_changes {
            out.push_str("\nNo changes.\n");
        }

        for (heading, files) in [
            ("Added", &self.added),
            ("Updated", &self.updated),
            ("Removed", &self.removed),
        ] {
            if files.is_empty() {
                continue;
            }
            let _ = writeln!(out, "\n### {heading}\n");
            for file in files {
                let _ = writeln!(out, "- `{file}`");
            }
        }

        if !self.skipped.is_empty() {
            out.push_str("\n### Skipped\n\n");
            for skip in &self.skipped {
                let _ = writeln!(out, "- `{}`: {}", skip.filename, skip.reason);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(filename: &str, status: OutcomeStatus) -> SyncOutcome {
        SyncOutcome::new(filename, status)
    }

    #[test]
    fn partitions_and_counts() {
        let outcomes = vec![
            outcome("b.md", OutcomeStatus::Added),
            outcome("a.md", OutcomeStatus::Added),
            outcome("c.md", OutcomeStatus::Updated),
            outcome("d.md", OutcomeStatus::Unchanged),
            outcome("e.md", OutcomeStatus::Unchanged),
            outcome("f.md", OutcomeStatus::skipped("HTML without raw URL")),
        ];
        let summary = summarize(&outcomes, &["z.md".to_owned()]);

        assert_eq!(summary.total, 6);
        assert_eq!(summary.added, ["a.md", "b.md"]);
        assert_eq!(summary.updated, ["c.md"]);
        assert_eq!(summary.removed, ["z.md"]);
        assert_eq!(summary.unchanged, 2);
        assert_eq!(
            summary.skipped,
            [SkippedDocument {
                filename: "f.md".into(),
                reason: "HTML without raw URL".into(),
            }]
        );
        assert!(summary.has_changes);
    }

    #[test]
    fn unchanged_and_skipped_only_has_no_changes() {
        let outcomes = vec![
            outcome("a.md", OutcomeStatus::Unchanged),
            outcome("b.md", OutcomeStatus::skipped("fetch failed")),
        ];
        let summary = summarize(&outcomes, &[]);
        assert!(!summary.has_changes);
    }

    #[test]
    fn removal_alone_counts_as_change() {
        let summary = summarize(&[], &["old.md".to_owned()]);
        assert!(summary.has_changes);
        assert_eq!(summary.total, 0);
    }

    #[test]
    fn headline_lists_every_category() {
        let outcomes = vec![
            outcome("a.md", OutcomeStatus::Added),
            outcome("b.md", OutcomeStatus::Unchanged),
        ];
        assert_eq!(
            summarize(&outcomes, &[]).headline(),
            "Done: 1 added, 0 updated, 0 removed, 1 unchanged, 0 skipped"
        );
    }

    #[test]
    fn json_uses_camel_case() {
        let summary = summarize(&[outcome("a.md", OutcomeStatus::Added)], &[]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["hasChanges"], true);
        assert_eq!(json["added"][0], "a.md");
    }

    #[test]
    fn markdown_reports_no_changes() {
        let md = summarize(&[outcome("a.md", OutcomeStatus::Unchanged)], &[]).to_markdown();
        assert!(md.contains("| Unchanged | 1 |"));
        assert!(md.contains("No changes."));
        assert!(!md.contains("### Added"));
    }

    #[test]
    fn markdown_lists_skips_with_reasons() {
        let outcomes = vec![
            outcome("a.md", OutcomeStatus::Added),
            outcome("b.md", OutcomeStatus::skipped("HTML without raw URL")),
        ];
        let md = summarize(&outcomes, &[]).to_markdown();
        assert!(md.contains("### Added\n\n- `a.md`"));
        assert!(md.contains("- `b.md`: HTML without raw URL"));
    }
}
