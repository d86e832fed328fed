use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use docs_mirror::sync::{self, SyncOptions};
use docs_mirror::{Feedback, Fetcher, LocalStore, SyncOutcome, SyncSummary};

/// Environment variable GitHub Actions sets to the job summary file.
const STEP_SUMMARY_ENV: &str = "GITHUB_STEP_SUMMARY";

/// Print info to stdout and problems to stderr.
pub fn print_feedback(feedback: &[Feedback]) {
    for item in feedback {
        if item.is_info() {
            println!("{item}");
        } else {
            eprintln!("{item}");
        }
    }

    let failed = feedback.iter().filter(|f| f.is_error()).count();
    if failed > 0 {
        eprintln!("{failed} page(s) failed to fetch and were left as they are");
    }
}

fn print_progress(completed: usize, total: usize, outcome: &SyncOutcome) {
    println!("[{completed}/{total}] {}: {}", outcome.filename, outcome.status);
}

/// Mirror the manifest into `docs_dir` and print progress and totals.
///
/// Writes the summary as JSON to `summary_out` when given. Any file already
/// there is removed first, so a failed run leaves no summary behind.
pub async fn run(
    fetcher: &dyn Fetcher,
    docs_dir: &Path,
    options: &SyncOptions,
    summary_out: Option<&Path>,
) -> Result<SyncSummary> {
    println!("Fetching manifest from {}...", options.manifest_url);

    if let Some(path) = summary_out {
        remove_stale_summary(path)?;
    }

    let store = LocalStore::open(docs_dir)?;
    let report = sync::run(fetcher, &store, options, &print_progress).await?;

    print_feedback(&report.feedback);

    let summary = report.summary;
    println!("{}", summary.headline());
    for skip in &summary.skipped {
        println!("  skipped {}: {}", skip.filename, skip.reason);
    }

    if let Some(path) = summary_out {
        write_summary_json(path, &summary)?;
    }
    if let Some(path) = std::env::var_os(STEP_SUMMARY_ENV) {
        append_step_summary(Path::new(&path), &summary)?;
    }

    Ok(summary)
}

/// A summary left by an earlier run must not outlive a run that fails.
fn remove_stale_summary(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
            Err(e).with_context(|| format!("failed to remove old summary {}", path.display()))
        }
        _ => Ok(()),
    }
}

fn write_summary_json(path: &Path, summary: &SyncSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("failed to write summary to {}", path.display()))
}

fn append_step_summary(path: &Path, summary: &SyncSummary) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open step summary {}", path.display()))?;
    file.write_all(summary.to_markdown().as_bytes())
        .with_context(|| format!("failed to write step summary {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use docs_mirror_http::{HttpFetcher, RetryPolicy};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn mount_text(server: &MockServer, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_owned(), "text/plain"))
            .mount(server)
            .await;
    }

    fn options_for(server: &MockServer) -> SyncOptions {
        let host = server.uri().replace('.', r"\.");
        SyncOptions {
            manifest_url: format!("{}/llms.txt", server.uri()),
            url_pattern: format!(r"{host}/docs/en/[\w-]+\.md"),
            concurrency: 2,
            strict_collisions: false,
        }
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(RetryPolicy::new(1, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn mirrors_pages_and_writes_summary_json() {
        let server = MockServer::start().await;
        let base = server.uri();
        let manifest = format!(
            "# Docs\n- [A]({base}/docs/en/a.md)\n- [B]({base}/docs/en/b.md)\n- [Other](https://example.com/x.md)\n"
        );
        mount_text(&server, "/llms.txt", &manifest).await;
        mount_text(&server, "/docs/en/a.md", "# A\n").await;

        Mock::given(method("GET"))
            .and(path("/docs/en/b.md"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html>b</html>", "text/html")
                    .insert_header("x-raw-download", "/raw/b.md"),
            )
            .mount(&server)
            .await;
        mount_text(&server, "/raw/b.md", "# B\n").await;

        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("docs").join("en");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("stale.md"), "old").unwrap();
        let summary_path = tmp.path().join("summary.json");

        let summary = run(&fetcher(), &docs, &options_for(&server), Some(&summary_path))
            .await
            .unwrap();

        assert_eq!(summary.added, ["a.md", "b.md"]);
        assert_eq!(summary.removed, ["stale.md"]);
        assert_eq!(std::fs::read_to_string(docs.join("b.md")).unwrap(), "# B\n");
        assert!(!docs.join("stale.md").exists());

        let written: SyncSummary =
            serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
        assert_eq!(written, summary);
    }

    #[tokio::test]
    async fn page_without_raw_url_is_reported_as_skipped() {
        let server = MockServer::start().await;
        let base = server.uri();
        mount_text(&server, "/llms.txt", &format!("{base}/docs/en/a.md")).await;

        Mock::given(method("GET"))
            .and(path("/docs/en/a.md"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let summary = run(&fetcher(), tmp.path(), &options_for(&server), None)
            .await
            .unwrap();

        assert!(!summary.has_changes);
        assert_eq!(summary.skipped[0].filename, "a.md");
        assert_eq!(summary.skipped[0].reason, "HTML without raw URL");
        assert!(!tmp.path().join("a.md").exists());
    }

    #[tokio::test]
    async fn empty_manifest_fails_the_run() {
        let server = MockServer::start().await;
        mount_text(&server, "/llms.txt", "nothing to see").await;

        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("keep.md"), "K").unwrap();

        let result = run(&fetcher(), tmp.path(), &options_for(&server), None).await;

        assert!(result.is_err());
        assert!(tmp.path().join("keep.md").exists());
    }

    #[tokio::test]
    async fn failed_run_leaves_no_stale_summary() {
        let server = MockServer::start().await;
        mount_text(&server, "/llms.txt", "nothing to see").await;

        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("docs");
        let summary_path = tmp.path().join("summary.json");
        std::fs::write(&summary_path, "{\"hasChanges\":true}").unwrap();

        let result = run(&fetcher(), &docs, &options_for(&server), Some(&summary_path)).await;

        assert!(result.is_err());
        assert!(!summary_path.exists());
    }
}
