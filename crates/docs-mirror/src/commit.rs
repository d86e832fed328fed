//! Groups version-control changes in the mirror directory into commits.
//!
//! Deletions, additions and modifications are committed separately so that
//! conventional-commit tooling derives the right version bump for each.

use std::collections::HashMap;

use serde::Serialize;

use crate::manifest::filename_for;
use crate::summary::SyncSummary;

/// Filenames grouped by how they changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
}

impl ChangeSet {
    /// Parse `git status --porcelain` output.
    ///
    /// Only the status columns are trimmed, never the whole output: the
    /// first line's leading space is part of its status code.
    pub fn from_porcelain(output: &str) -> Self {
        let mut changes = Self::default();
        for line in output.lines() {
            let (Some(code), Some(path)) = (line.get(..2), line.get(3..)) else {
                continue;
            };
            let filename = filename_for(path.trim()).to_owned();
            match code.trim() {
                "??" | "A" => changes.added.push(filename),
                "M" => changes.modified.push(filename),
                "D" => changes.deleted.push(filename),
                _ => {}
            }
        }
        changes
    }

    /// Parse `git diff --name-status` output.
    pub fn from_name_status(output: &str) -> Self {
        let mut changes = Self::default();
        for line in output.lines() {
            let mut parts = line.split('\t');
            let (Some(code), Some(path)) = (parts.next(), parts.next()) else {
                continue;
            };
            if path.is_empty() {
                continue;
            }
            let filename = filename_for(path).to_owned();
            match code {
                "A" => changes.added.push(filename),
                "M" => changes.modified.push(filename),
                "D" => changes.deleted.push(filename),
                _ => {}
            }
        }
        changes
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&SyncSummary> for ChangeSet {
    fn from(summary: &SyncSummary) -> Self {
        Self {
            added: summary.added.clone(),
            modified: summary.updated.clone(),
            deleted: summary.removed.clone(),
        }
    }
}

/// Format one line of `git diff --numstat` as `(+I -D)`.
pub fn parse_numstat(line: &str) -> String {
    let mut parts = line.trim().split('\t');
    match (parts.next(), parts.next()) {
        (Some(ins), Some(del)) if !ins.is_empty() => format!("(+{ins} -{del})"),
        _ => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModifiedFile {
    pub filename: String,
    pub stat: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSummary {
    pub added: Vec<String>,
    pub modified: Vec<ModifiedFile>,
    pub deleted: Vec<String>,
    pub has_changes: bool,
}

impl CommitSummary {
    /// Attach diff stats (keyed by filename) to a change set.
    pub fn new(changes: ChangeSet, stats: &HashMap<String, String>) -> Self {
        let modified = changes
            .modified
            .into_iter()
            .map(|filename| {
                let stat = stats.get(&filename).cloned().unwrap_or_default();
                ModifiedFile { filename, stat }
            })
            .collect();
        let mut summary = Self {
            added: changes.added,
            modified,
            deleted: changes.deleted,
            has_changes: false,
        };
        summary.has_changes = !(summary.added.is_empty()
            && summary.modified.is_empty()
            && summary.deleted.is_empty());
        summary
    }
}

/// One commit to create: paths to stage plus a subject and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPlan {
    pub paths: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Commits for a summary, in the order deleted, added, modified.
/// `docs_prefix` is the repository-relative mirror directory.
pub fn plan_commits(summary: &CommitSummary, docs_prefix: &str) -> Vec<CommitPlan> {
    let prefix = docs_prefix.trim_end_matches('/');
    let mut plans = Vec::new();

    if !summary.deleted.is_empty() {
        plans.push(CommitPlan {
            paths: staged_paths(prefix, &summary.deleted),
            subject: format!("feat!: remove {}", label(&summary.deleted, "pages")),
            body: format!(
                "BREAKING CHANGE: documentation pages removed\n\n{}",
                bullet_list(summary.deleted.iter().cloned())
            ),
        });
    }

    if !summary.added.is_empty() {
        plans.push(CommitPlan {
            paths: staged_paths(prefix, &summary.added),
            subject: format!("feat: add {}", label(&summary.added, "new pages")),
            body: bullet_list(summary.added.iter().cloned()),
        });
    }

    if !summary.modified.is_empty() {
        let names: Vec<String> = summary.modified.iter().map(|m| m.filename.clone()).collect();
        plans.push(CommitPlan {
            paths: staged_paths(prefix, &names),
            subject: format!("fix: update {}", label(&names, "pages")),
            body: bullet_list(
                summary
                    .modified
                    .iter()
                    .map(|m| format!("{} {}", m.filename, m.stat).trim_end().to_owned()),
            ),
        });
    }

    plans
}

fn staged_paths(prefix: &str, files: &[String]) -> Vec<String> {
    files.iter().map(|f| format!("{prefix}/{f}")).collect()
}

fn bullet_list(items: impl Iterator<Item = String>) -> String {
    items.map(|item| format!("- {item}")).collect::<Vec<_>>().join("\n")
}

fn label(files: &[String], plural: &str) -> String {
    match files {
        [single] => single.clone(),
        _ => format!("{} {plural}", files.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn porcelain_groups_by_status() {
        let output = " M docs/en/hooks.md\n?? docs/en/new-page.md\nA  docs/en/staged.md\n D docs/en/old.md\n";
        let changes = ChangeSet::from_porcelain(output);
        assert_eq!(changes.added, ["new-page.md", "staged.md"]);
        assert_eq!(changes.modified, ["hooks.md"]);
        assert_eq!(changes.deleted, ["old.md"]);
    }

    #[test]
    fn porcelain_empty_output() {
        assert!(ChangeSet::from_porcelain("").is_empty());
    }

    #[test]
    fn name_status_groups_by_status() {
        let output = "A\tdocs/en/a.md\nM\tdocs/en/b.md\nD\tdocs/en/c.md\nR100\tdocs/en/x.md\tdocs/en/y.md\n";
        let changes = ChangeSet::from_name_status(output);
        assert_eq!(changes.added, ["a.md"]);
        assert_eq!(changes.modified, ["b.md"]);
        assert_eq!(changes.deleted, ["c.md"]);
        assert_eq!(changes.len(), 3);
    }

    #[test]
    fn change_set_from_summary() {
        let summary = SyncSummary {
            total: 2,
            added: vec!["a.md".into()],
            updated: vec!["b.md".into()],
            removed: vec!["c.md".into()],
            unchanged: 0,
            skipped: vec![],
            has_changes: true,
        };
        let changes = ChangeSet::from(&summary);
        assert_eq!(changes.modified, ["b.md"]);
        assert_eq!(changes.deleted, ["c.md"]);
    }

    #[test]
    fn numstat_formats_insertions_and_deletions() {
        assert_eq!(parse_numstat("12\t3\tdocs/en/a.md"), "(+12 -3)");
        assert_eq!(parse_numstat(""), "");
    }

    fn summary(added: &[&str], modified: &[(&str, &str)], deleted: &[&str]) -> CommitSummary {
        let changes = ChangeSet {
            added: added.iter().map(|s| (*s).to_owned()).collect(),
            modified: modified.iter().map(|(f, _)| (*f).to_owned()).collect(),
            deleted: deleted.iter().map(|s| (*s).to_owned()).collect(),
        };
        let stats = modified
            .iter()
            .map(|(f, s)| ((*f).to_owned(), (*s).to_owned()))
            .collect();
        CommitSummary::new(changes, &stats)
    }

    #[test]
    fn no_changes_plans_nothing() {
        let s = summary(&[], &[], &[]);
        assert!(!s.has_changes);
        assert!(plan_commits(&s, "docs/en").is_empty());
    }

    #[test]
    fn commits_ordered_deleted_added_modified() {
        let s = summary(&["new.md"], &[("hooks.md", "(+2 -1)")], &["old.md"]);
        let plans = plan_commits(&s, "docs/en/");

        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0].subject, "feat!: remove old.md");
        assert_eq!(
            plans[0].body,
            "BREAKING CHANGE: documentation pages removed\n\n- old.md"
        );
        assert_eq!(plans[0].paths, ["docs/en/old.md"]);
        assert_eq!(plans[1].subject, "feat: add new.md");
        assert_eq!(plans[1].body, "- new.md");
        assert_eq!(plans[2].subject, "fix: update hooks.md");
        assert_eq!(plans[2].body, "- hooks.md (+2 -1)");
    }

    #[test]
    fn multiple_files_use_count_labels() {
        let s = summary(
            &["a.md", "b.md"],
            &[("c.md", ""), ("d.md", "(+1 -0)")],
            &["e.md", "f.md", "g.md"],
        );
        let plans = plan_commits(&s, "docs/en");

        assert_eq!(plans[0].subject, "feat!: remove 3 pages");
        assert_eq!(plans[1].subject, "feat: add 2 new pages");
        assert_eq!(plans[2].subject, "fix: update 2 pages");
        assert_eq!(plans[2].body, "- c.md\n- d.md (+1 -0)");
    }
}
