use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result, bail};

/// Runs `git` in a fixed repository directory.
pub struct Git {
    root: PathBuf,
}

impl Git {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Run git and return stdout. Only trailing whitespace is trimmed, since
    /// porcelain output starts with significant spaces.
    pub fn run(&self, args: &[&str]) -> Result<String> {
        tracing::debug!(?args, "git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .context("failed to run git")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("git {} failed: {}", args.join(" "), stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_owned())
    }

    /// `git status --porcelain` scoped to `path`, listing untracked files individually.
    pub fn status_porcelain(&self, path: &str) -> Result<String> {
        self.run(&["status", "--porcelain", "--untracked-files=all", "--", path])
    }

    /// `git diff --name-status HEAD` scoped to `path`.
    pub fn diff_name_status(&self, path: &str) -> Result<String> {
        self.run(&["diff", "--name-status", "HEAD", "--", path])
    }

    /// `git diff --numstat` for one file.
    pub fn numstat(&self, path: &str) -> Result<String> {
        self.run(&["diff", "--numstat", "--", path])
    }

    pub fn add(&self, paths: &[String]) -> Result<()> {
        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run(&args).map(|_| ())
    }

    pub fn commit(&self, subject: &str, body: &str) -> Result<()> {
        self.run(&["commit", "-m", subject, "-m", body]).map(|_| ())
    }
}
