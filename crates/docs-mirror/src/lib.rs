pub mod changelog;
pub mod commit;
pub mod feedback;
pub mod fetch;
pub mod local;
pub mod manifest;
pub mod outcome;
pub mod reconcile;
pub mod summary;
pub mod sync;

pub use changelog::{insert_entry, next_version, render_entry};
pub use commit::{ChangeSet, CommitPlan, CommitSummary, ModifiedFile, parse_numstat, plan_commits};
pub use feedback::Feedback;
pub use fetch::{FetchError, Fetcher};
pub use local::{LocalError, LocalStore};
pub use manifest::{Manifest, ManifestError, ManifestParser, filename_for};
pub use outcome::{OutcomeStatus, SyncOutcome};
pub use reconcile::{Collision, Plan, PlannedDocument, ReconcileError};
pub use summary::{SkippedDocument, SyncSummary, summarize};
pub use sync::{DEFAULT_CONCURRENCY, ProgressFn, SyncError, SyncOptions, SyncReport};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
