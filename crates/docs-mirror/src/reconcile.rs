//! Pairs the expected documents with what is already on disk.
//!
//! Everything here is pure: the executor in [`crate::sync`] owns the I/O and
//! calls into these functions to decide what each document's outcome is.

use std::collections::{BTreeSet, HashMap};

use crate::manifest::{Manifest, filename_for};
use crate::outcome::OutcomeStatus;

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("{} URLs map to {filename}: {}", urls.len(), urls.join(", "))]
    Collision { filename: String, urls: Vec<String> },
}

/// One expected document and whether its file existed when the run began.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDocument {
    pub url: String,
    pub filename: String,
    pub existed_locally: bool,
}

/// Several manifest URLs that project onto the same local filename.
/// Only the last URL in manifest order is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub filename: String,
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub documents: Vec<PlannedDocument>,
    pub collisions: Vec<Collision>,
}

impl Plan {
    pub fn expected_filenames(&self) -> BTreeSet<String> {
        self.documents.iter().map(|d| d.filename.clone()).collect()
    }
}

/// Build the per-document work list for a run.
///
/// With `strict` set, the first filename collision is an error. Otherwise
/// the last URL wins and the collision is reported on the plan.
pub fn plan(
    manifest: &Manifest,
    existing: &BTreeSet<String>,
    strict: bool,
) -> Result<Plan, ReconcileError> {
    let mut by_filename: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for url in manifest.urls() {
        let filename = filename_for(url);
        let urls = by_filename.entry(filename).or_default();
        if urls.is_empty() {
            order.push(filename);
        }
        urls.push(url);
    }

    let mut plan = Plan::default();
    for filename in order {
        let urls = &by_filename[filename];
        if urls.len() > 1 {
            let collision = Collision {
                filename: filename.to_owned(),
                urls: urls.iter().map(|u| (*u).to_owned()).collect(),
            };
            if strict {
                return Err(ReconcileError::Collision {
                    filename: collision.filename,
                    urls: collision.urls,
                });
            }
            tracing::warn!(
                filename,
                urls = ?collision.urls,
                "manifest URLs collide on one filename; keeping the last"
            );
            plan.collisions.push(collision);
        }

        let Some(url) = urls.last() else { continue };
        plan.documents.push(PlannedDocument {
            url: (*url).to_owned(),
            filename: filename.to_owned(),
            existed_locally: existing.contains(filename),
        });
    }

    Ok(plan)
}

/// Decide the outcome for a fetched document.
///
/// Comparison is byte-exact. A file that is missing never matches, not even
/// an empty remote body.
pub fn classify(remote: &str, local: Option<&[u8]>, existed_locally: bool) -> OutcomeStatus {
    match local {
        Some(bytes) if bytes == remote.as_bytes() => OutcomeStatus::Unchanged,
        _ if existed_locally => OutcomeStatus::Updated,
        _ => OutcomeStatus::Added,
    }
}

/// Local files that are no longer in the expected set, sorted.
pub fn orphans(existing: &BTreeSet<String>, expected: &BTreeSet<String>) -> Vec<String> {
    existing.difference(expected).cloned().collect()
}
