use crate::status::PrStatus;
use chrono::{DateTime, Utc};

/// One table row, fully derived from fetched PR data.
#[derive(Debug, Clone)]
pub struct ReportRow {
    /// PR number
    pub number: u64,
    /// Sanitized title (no newlines, pipes escaped)
    pub title: String,
    /// PR web URL
    pub url: String,
    /// Classified review status
    pub status: PrStatus,
    /// One cell per reviewer column (orgs in order, then `other`)
    pub reviewers_by_org: Vec<String>,
    /// Space-joined assignee logins, or the `unassigned` placeholder
    pub assignees: String,
    /// Project field values aligned with the configured field columns
    pub fields: Vec<String>,
}

/// Complete report for one repository.
#[derive(Debug)]
pub struct Report {
    /// Repository (owner/name), or `unknown`
    pub repo: String,
    /// Newest updatedAt among the fetched PRs; None when there are no PRs.
    /// Derived from upstream data so identical inputs render identically.
    pub updated_at: Option<DateTime<Utc>>,
    /// Reviewer column labels (orgs in order, then `other`)
    pub org_columns: Vec<String>,
    /// Project field column labels
    pub field_columns: Vec<String>,
    /// One row per open PR
    pub rows: Vec<ReportRow>,
}

impl Report {
    /// File name the report is written to, keyed by repository.
    pub fn file_name(&self) -> String {
        format!("PR_Status_{}.md", self.repo.replace('/', "_"))
    }
}
