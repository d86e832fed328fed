//! Date-based versioning and changelog entries for mirrored docs.

use chrono::NaiveDate;

use crate::commit::ChangeSet;

/// Next version token for a release made on `today`.
///
/// Versions are `YYYY.MM.DD`. A second release on the same day becomes
/// `YYYY.MM.DD.2`, then `.3`, and so on.
pub fn next_version(current: &str, today: NaiveDate) -> String {
    let date = today.format("%Y.%m.%d").to_string();
    let current = current.trim();

    if current == date {
        return format!("{date}.2");
    }

    match current
        .strip_prefix(&date)
        .and_then(|rest| rest.strip_prefix('.'))
    {
        Some(suffix) => match suffix.parse::<u32>() {
            Ok(n) => format!("{date}.{}", n.saturating_add(1)),
            Err(_) => format!("{date}.2"),
        },
        None => date,
    }
}

/// Markdown section for one release, or `None` when nothing changed.
pub fn render_entry(version: &str, changes: &ChangeSet) -> Option<String> {
    if changes.is_empty() {
        return None;
    }

    let sections: Vec<String> = [
        ("Added", &changes.added),
        ("Modified", &changes.modified),
        ("Removed", &changes.deleted),
    ]
    .into_iter()
    .filter(|(_, files)| !files.is_empty())
    .map(|(heading, files)| {
        let lines: Vec<String> = files.iter().map(|f| format!("- `{f}`")).collect();
        format!("### {heading}\n{}", lines.join("\n"))
    })
    .collect();

    Some(format!("## {version}\n\n{}", sections.join("\n\n")))
}

/// Insert `entry` after the changelog's first line (its title).
pub fn insert_entry(changelog: &str, entry: &str) -> String {
    match changelog.find('\n') {
        Some(pos) => format!("{}\n\n{entry}{}", &changelog[..pos], &changelog[pos..]),
        None => format!("{changelog}\n\n{entry}\n"),
    }
}
