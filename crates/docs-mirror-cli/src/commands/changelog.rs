use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use docs_mirror::{ChangeSet, SyncSummary, insert_entry, next_version, render_entry};

use crate::git::Git;

const DEFAULT_CHANGELOG: &str = "# Changelog\n";

/// Where the list of changed pages comes from.
pub enum ChangeSource<'a> {
    /// A summary file written by `sync --summary-out`.
    Summary(&'a Path),
    /// Uncommitted changes in the working tree.
    Git { git: &'a Git, docs_dir: &'a str },
}

/// Bump the version file and prepend a changelog entry.
///
/// Returns the new version, or `None` when there was nothing to record.
pub fn run(
    source: ChangeSource<'_>,
    changelog_file: &Path,
    version_file: &Path,
    today: NaiveDate,
) -> Result<Option<String>> {
    let changes = match source {
        ChangeSource::Summary(path) => changes_from_summary(path)?,
        ChangeSource::Git { git, docs_dir } => changes_from_git(git, docs_dir)?,
    };

    if changes.is_empty() {
        println!("No changes detected, skipping changelog update");
        return Ok(None);
    }

    let current = read_or(version_file, "")?;
    let version = next_version(&current, today);
    std::fs::write(version_file, format!("{version}\n"))
        .with_context(|| format!("failed to write {}", version_file.display()))?;
    println!("Version bumped to {version}");

    let Some(entry) = render_entry(&version, &changes) else {
        return Ok(None);
    };
    let changelog = read_or(changelog_file, DEFAULT_CHANGELOG)?;
    std::fs::write(changelog_file, insert_entry(&changelog, &entry))
        .with_context(|| format!("failed to write {}", changelog_file.display()))?;

    println!(
        "Changelog updated: {} added, {} modified, {} removed",
        changes.added.len(),
        changes.modified.len(),
        changes.deleted.len()
    );
    Ok(Some(version))
}

fn changes_from_summary(path: &Path) -> Result<ChangeSet> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read summary {}", path.display()))?;
    let summary: SyncSummary = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse summary {}", path.display()))?;
    Ok(ChangeSet::from(&summary))
}

/// Changes against HEAD; before the first commit every file is new.
fn changes_from_git(git: &Git, docs_dir: &str) -> Result<ChangeSet> {
    match git.diff_name_status(docs_dir) {
        Ok(output) => Ok(ChangeSet::from_name_status(&output)),
        Err(e) => {
            tracing::debug!(error = %e, "no HEAD to diff against, using status");
            let output = git.status_porcelain(docs_dir)?;
            let changes = ChangeSet::from_porcelain(&output);
            let mut added = changes.added;
            added.extend(changes.modified);
            Ok(ChangeSet {
                added,
                ..ChangeSet::default()
            })
        }
    }
}

fn read_or(path: &Path, fallback: &str) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(fallback.to_owned()),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}
