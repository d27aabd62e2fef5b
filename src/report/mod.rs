pub mod types;

pub use types::{Report, ReportRow};

use crate::config::LoginMap;
use crate::gh::graphql::PLACEHOLDER;
use crate::status::{PrStatus, ReviewState};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Make a PR title safe for a single Markdown table cell.
pub fn sanitize_title(title: &str) -> String {
    title
        .replace(['\n', '\r'], " ")
        .replace('|', "\\|")
}

/// Build one reviewer cell per column: orgs in mapping order, `other` last.
/// Reviewers inside a cell are sorted by login; empty cells render as `-`.
pub fn group_reviewers(
    states: &BTreeMap<String, ReviewState>,
    login_map: &LoginMap,
) -> Vec<String> {
    login_map
        .columns()
        .iter()
        .map(|column| {
            let cell: Vec<String> = states
                .iter()
                .filter(|(login, _)| login_map.org_for(login) == column)
                .map(|(login, state)| format!("{login}{}", state.emoji()))
                .collect();
            if cell.is_empty() {
                PLACEHOLDER.to_string()
            } else {
                cell.join(" ")
            }
        })
        .collect()
}

/// Write the report into `output_dir` (as PR_Status_<repo>.md), or render it
/// to the terminal when no directory is given.
#[instrument(skip(report), fields(repo = %report.repo, rows = report.rows.len()))]
pub fn output(report: &Report, output_dir: Option<&Path>) -> Result<(), ReportError> {
    match output_dir {
        None => {
            debug!("writing report to terminal");
            print_terminal_report(report);
            Ok(())
        }
        Some(dir) => {
            let path = dir.join(report.file_name());
            debug!(path = %path.display(), "writing report file");
            std::fs::write(&path, render_markdown(report))?;
            Ok(())
        }
    }
}

/// Render the full Markdown page. Everything here derives from fetched data,
/// so identical upstream data produces a byte-identical file.
pub fn render_markdown(report: &Report) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Pull Request Status for {}\n\n", report.repo));
    if let Some(updated) = report.updated_at {
        md.push_str(&format!(
            "Updated: {}\n\n",
            updated.format("%Y-%m-%d %H:%M:%S")
        ));
    }

    let columns = header_columns(report);
    md.push_str(&format!("| {} |\n", columns.join(" | ")));
    md.push_str(&format!("| {} |\n", vec!["---"; columns.len()].join(" | ")));

    for row in &report.rows {
        let mut cells: Vec<String> = vec![
            format!("#{}", row.number),
            format!("[{}]({})", row.title, row.url),
            row.status.to_string(),
        ];
        cells.extend(row.reviewers_by_org.iter().cloned());
        cells.push(row.assignees.clone());
        cells.extend(row.fields.iter().cloned());
        md.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    md
}

fn header_columns(report: &Report) -> Vec<String> {
    let mut columns = vec!["PR".to_string(), "Title".to_string(), "State".to_string()];
    for org in &report.org_columns {
        columns.push(format!("{org} Reviewers"));
    }
    columns.push("Assignees".to_string());
    columns.extend(report.field_columns.iter().cloned());
    columns
}

fn print_terminal_report(report: &Report) {
    println!();
    println!("Pull Request Status for {}", report.repo);
    if let Some(updated) = report.updated_at {
        println!("Updated: {}", updated.format("%Y-%m-%d %H:%M:%S"));
    }
    println!();
    for row in &report.rows {
        println!(
            "#{} [{}] {}",
            row.number,
            colorize_status(row.status),
            row.title
        );
        println!(
            "    reviewers: {} | assignees: {}",
            row.reviewers_by_org.join(" / "),
            row.assignees
        );
    }
    println!();
}

fn colorize_status(status: PrStatus) -> colored::ColoredString {
    let label = status.to_string();
    match status {
        PrStatus::Draft => label.dimmed(),
        PrStatus::Approved => label.green().bold(),
        PrStatus::ChangesRequested => label.red().bold(),
        PrStatus::InReview => label.yellow(),
        PrStatus::Unreviewed => label.normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{prelude::BASE64_STANDARD, Engine};
    use chrono::{TimeZone, Utc};

    fn sample_row() -> ReportRow {
        ReportRow {
            number: 12,
            title: "Fix login flow".to_string(),
            url: "https://github.com/org/repo/pull/12".to_string(),
            status: PrStatus::InReview,
            reviewers_by_org: vec!["alice\u{2705}".to_string(), "-".to_string()],
            assignees: "bob".to_string(),
            fields: vec!["In progress".to_string(), "-".to_string()],
        }
    }

    fn sample_report() -> Report {
        Report {
            repo: "org/repo".to_string(),
            updated_at: Some(Utc.with_ymd_and_hms(2024, 5, 2, 11, 30, 0).unwrap()),
            org_columns: vec!["acme".to_string(), "other".to_string()],
            field_columns: vec!["Status".to_string(), "Priority".to_string()],
            rows: vec![sample_row()],
        }
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("a\nb|c"), "a b\\|c");
        assert_eq!(sanitize_title("plain"), "plain");
        assert_eq!(sanitize_title("cr\r\nlf"), "cr  lf");
    }

    #[test]
    fn test_markdown_header_schema() {
        let md = render_markdown(&sample_report());
        assert!(md.starts_with("# Pull Request Status for org/repo\n\n"));
        assert!(md.contains("Updated: 2024-05-02 11:30:00\n"));
        assert!(md.contains(
            "| PR | Title | State | acme Reviewers | other Reviewers | Assignees | Status | Priority |\n"
        ));
        assert!(md.contains("| --- | --- | --- | --- | --- | --- | --- | --- |\n"));
    }

    #[test]
    fn test_markdown_row_rendering() {
        let md = render_markdown(&sample_report());
        assert!(md.contains(
            "| #12 | [Fix login flow](https://github.com/org/repo/pull/12) | In Review | alice\u{2705} | - | bob | In progress | - |\n"
        ));
    }

    #[test]
    fn test_markdown_row_count_matches_pr_count() {
        let mut report = sample_report();
        report.rows = vec![sample_row(), sample_row(), sample_row()];
        let md = render_markdown(&report);
        let data_rows = md.lines().filter(|l| l.starts_with("| #")).count();
        assert_eq!(data_rows, 3);
    }

    #[test]
    fn test_markdown_is_byte_identical_for_identical_input() {
        let report = sample_report();
        assert_eq!(render_markdown(&report), render_markdown(&report));
    }

    #[test]
    fn test_markdown_omits_updated_line_without_prs() {
        let mut report = sample_report();
        report.updated_at = None;
        report.rows.clear();
        let md = render_markdown(&report);
        assert!(!md.contains("Updated:"));
        assert!(md.lines().filter(|l| l.starts_with("| #")).count() == 0);
    }

    #[test]
    fn test_group_reviewers_orders_and_placeholders() {
        let encoded = BASE64_STANDARD
            .encode(r#"{"loginUsers": [{"loginUser": "alice", "organization": "acme"}]}"#);
        let map = crate::config::LoginMap::decode(&encoded).unwrap();
        let mut states = BTreeMap::new();
        states.insert("alice".to_string(), ReviewState::Approved);
        states.insert("zed".to_string(), ReviewState::Pending);
        states.insert("bob".to_string(), ReviewState::Commented);

        let cells = group_reviewers(&states, &map);
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0], "alice\u{2705}");
        assert_eq!(cells[1], "bob\u{1f4ac} zed\u{23f3}");
    }

    #[test]
    fn test_group_reviewers_empty_states() {
        let cells = group_reviewers(&BTreeMap::new(), &crate::config::LoginMap::default());
        assert_eq!(cells, ["-"]);
    }

    #[test]
    fn test_output_writes_named_file() {
        let report = sample_report();
        let dir = std::env::temp_dir().join("pr-status-report-test");
        std::fs::create_dir_all(&dir).unwrap();
        output(&report, Some(&dir)).unwrap();

        let path = dir.join("PR_Status_org_repo.md");
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# Pull Request Status for org/repo"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_output_to_terminal_does_not_panic() {
        output(&sample_report(), None).unwrap();
    }
}
