use std::collections::HashMap;

use anyhow::Result;
use docs_mirror::{ChangeSet, CommitSummary, parse_numstat, plan_commits};

use crate::git::Git;

/// Commit pending changes under `docs_dir`, one commit per change type.
///
/// With `dry_run`, prints the planned commits without touching the index.
pub fn run(git: &Git, docs_dir: &str, dry_run: bool) -> Result<CommitSummary> {
    let status = git.status_porcelain(docs_dir)?;
    let changes = ChangeSet::from_porcelain(&status);

    let mut stats = HashMap::new();
    for filename in &changes.modified {
        let numstat = git.numstat(&format!("{}/{filename}", docs_dir.trim_end_matches('/')))?;
        stats.insert(filename.clone(), parse_numstat(&numstat));
    }
    let summary = CommitSummary::new(changes, &stats);

    if !summary.has_changes {
        println!("No doc changes to commit");
        return Ok(summary);
    }

    for plan in plan_commits(&summary, docs_dir) {
        if dry_run {
            println!("would commit: {}\n{}\n", plan.subject, plan.body);
            continue;
        }
        git.add(&plan.paths)?;
        git.commit(&plan.subject, &plan.body)?;
        println!("Committed: {}", plan.subject);
    }

    Ok(summary)
}
