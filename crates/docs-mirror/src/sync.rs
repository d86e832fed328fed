//! Drives a full mirror run: manifest, per-document reconciliation, orphan
//! removal, summary.

use futures::StreamExt;

use crate::feedback::Feedback;
use crate::fetch::{FetchError, Fetcher};
use crate::local::{LocalError, LocalStore};
use crate::manifest::{DEFAULT_MANIFEST_URL, DEFAULT_URL_PATTERN, ManifestError, ManifestParser};
use crate::outcome::{OutcomeStatus, SKIP_HTML_WITHOUT_RAW, SyncOutcome};
use crate::reconcile::{self, PlannedDocument, ReconcileError};
use crate::summary::{SyncSummary, summarize};

/// Default number of documents fetched at once.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Errors that abort a whole run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("failed to fetch manifest: {0}")]
    ManifestFetch(#[source] FetchError),

    #[error("manifest at {0} is an HTML page with no raw URL")]
    ManifestUnavailable(String),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Local(#[from] LocalError),

    #[error("concurrency must be at least 1")]
    InvalidConcurrency,
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub manifest_url: String,
    pub url_pattern: String,
    pub concurrency: usize,
    /// Fail instead of warn when two URLs map to the same filename.
    pub strict_collisions: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_owned(),
            url_pattern: DEFAULT_URL_PATTERN.to_owned(),
            concurrency: DEFAULT_CONCURRENCY,
            strict_collisions: false,
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub summary: SyncSummary,
    /// Per-document outcomes in completion order.
    pub outcomes: Vec<SyncOutcome>,
    pub feedback: Vec<Feedback>,
}

/// Progress notification: `(completed, total, outcome)`.
pub type ProgressFn<'a> = dyn Fn(usize, usize, &SyncOutcome) + Send + Sync + 'a;

/// Mirror the manifest's pages into `store`.
///
/// Manifest problems abort before any file is touched. Per-document fetch
/// failures become skips; local I/O errors abort the run immediately.
/// Orphans are removed only after every document has settled.
pub async fn run(
    fetcher: &dyn Fetcher,
    store: &LocalStore,
    options: &SyncOptions,
    progress: &ProgressFn<'_>,
) -> Result<SyncReport, SyncError> {
    if options.concurrency == 0 {
        return Err(SyncError::InvalidConcurrency);
    }
    let parser = ManifestParser::new(&options.url_pattern)?;

    tracing::info!(url = %options.manifest_url, "fetching manifest");
    let text = fetcher
        .fetch(&options.manifest_url)
        .await
        .map_err(SyncError::ManifestFetch)?
        .ok_or_else(|| SyncError::ManifestUnavailable(options.manifest_url.clone()))?;
    let manifest = parser.parse(&text)?;
    tracing::info!(pages = manifest.len(), "parsed manifest");

    let existing = store.list()?;
    let plan = reconcile::plan(&manifest, &existing, options.strict_collisions)?;

    let mut feedback = vec![Feedback::info(format!(
        "manifest lists {} pages",
        manifest.len()
    ))];
    feedback.extend(plan.collisions.iter().map(|c| {
        Feedback::warning(format!(
            "{} URLs map to {}; kept {}",
            c.urls.len(),
            c.filename,
            c.urls.last().map(String::as_str).unwrap_or_default()
        ))
    }));

    let total = plan.documents.len();
    let mut outcomes = Vec::with_capacity(total);
    let mut pending = futures::stream::iter(&plan.documents)
        .map(|doc| sync_document(fetcher, store, doc))
        .buffer_unordered(options.concurrency);

    while let Some(result) = pending.next().await {
        let outcome = result?;
        progress(outcomes.len() + 1, total, &outcome);
        if let OutcomeStatus::Skipped { reason } = &outcome.status {
            let message = format!("skipped {}: {reason}", outcome.filename);
            feedback.push(if reason == SKIP_HTML_WITHOUT_RAW {
                Feedback::warning(message)
            } else {
                Feedback::error(message)
            });
        }
        outcomes.push(outcome);
    }

    let orphans = reconcile::orphans(&existing, &plan.expected_filenames());
    for filename in &orphans {
        tracing::debug!(filename = %filename, "removing orphan");
        store.remove(filename).await?;
    }
    if !orphans.is_empty() {
        feedback.push(Feedback::info(format!(
            "removed {} pages no longer in the manifest",
            orphans.len()
        )));
    }

    let summary = summarize(&outcomes, &orphans);
    tracing::info!(
        added = summary.added.len(),
        updated = summary.updated.len(),
        removed = summary.removed.len(),
        unchanged = summary.unchanged,
        skipped = summary.skipped.len(),
        "sync finished"
    );

    Ok(SyncReport {
        summary,
        outcomes,
        feedback,
    })
}

async fn sync_document(
    fetcher: &dyn Fetcher,
    store: &LocalStore,
    doc: &PlannedDocument,
) -> Result<SyncOutcome, LocalError> {
    let remote = match fetcher.fetch(&doc.url).await {
        Ok(Some(content)) => content,
        Ok(None) => {
            tracing::warn!(url = %doc.url, "HTML response without raw URL");
            return Ok(SyncOutcome::new(
                &doc.filename,
                OutcomeStatus::skipped(SKIP_HTML_WITHOUT_RAW),
            ));
        }
        Err(e) => {
            tracing::warn!(url = %doc.url, error = %e, "fetch failed");
            return Ok(SyncOutcome::new(
                &doc.filename,
                OutcomeStatus::skipped(format!("fetch failed: {e}")),
            ));
        }
    };

    let local = store.read(&doc.filename).await?;
    let status = reconcile::classify(&remote, local.as_deref(), doc.existed_locally);
    if status.is_write() {
        store.write(&doc.filename, &remote).await?;
    }
    tracing::debug!(filename = %doc.filename, %status, "reconciled");

    Ok(SyncOutcome::new(&doc.filename, status))
}
