//! The collect pipeline: fetch open PRs, resolve reviewer states, classify,
//! pull project fields, and assemble the report.

use crate::config::{Config, LoginMap};
use crate::gh::graphql::{self, PLACEHOLDER};
use crate::gh::{GhClient, GhError};
use crate::report::types::{Report, ReportRow};
use crate::report::{group_reviewers, sanitize_title};
use crate::status;
use std::collections::HashSet;
use tracing::{debug, error, instrument};

/// Placeholder for the assignee cell when nobody is assigned.
const UNASSIGNED: &str = "unassigned";

/// Fetch all open PRs and derive one report row per PR.
///
/// Each external failure aborts the run, except the per-PR project-field
/// lookup: a board may simply not contain the PR, so that call site logs
/// and falls back to placeholders.
#[instrument(skip_all)]
pub async fn run(
    client: &GhClient<'_>,
    config: &Config,
    login_map: &LoginMap,
) -> Result<Report, GhError> {
    let fields = &config.report.fields;
    let required: HashSet<String> = config.report.required_reviewers.iter().cloned().collect();
    let required = (!required.is_empty()).then_some(required);

    let prs = client.list_open_prs().await?;
    debug!(count = prs.len(), "fetched open PRs");

    let mut updated_at = None;
    let mut rows = Vec::with_capacity(prs.len());
    for pr in &prs {
        // Freshly opened PRs may carry no updatedAt yet.
        updated_at = updated_at.max(pr.updated_at.or(pr.created_at));

        let details = client.pr_details(pr.number).await?;
        let requested: Vec<String> = details
            .review_requests
            .iter()
            .map(|a| a.login.clone())
            .filter(|login| !login.is_empty())
            .collect();
        let states = status::latest_states(&details.reviews, &requested);
        let pr_status = status::classify(&states, pr.is_draft, required.as_ref());
        debug!(pr = pr.number, status = %pr_status, reviewers = states.len(), "classified PR");

        let field_values = match project_fields(client, pr.number, fields).await {
            Ok(values) => values,
            Err(err) => {
                error!(pr = pr.number, %err, "project field fetch failed");
                vec![PLACEHOLDER.to_string(); fields.len()]
            }
        };

        let assignees: Vec<&str> = details
            .assignees
            .iter()
            .map(|a| a.login.as_str())
            .filter(|login| !login.is_empty())
            .collect();

        rows.push(ReportRow {
            number: pr.number,
            title: sanitize_title(&pr.title),
            url: pr.url.clone(),
            status: pr_status,
            reviewers_by_org: group_reviewers(&states, login_map),
            assignees: if assignees.is_empty() {
                UNASSIGNED.to_string()
            } else {
                assignees.join(" ")
            },
            fields: field_values,
        });
    }

    Ok(Report {
        repo: client.repo().unwrap_or("unknown").to_string(),
        updated_at,
        org_columns: login_map.columns(),
        field_columns: fields.clone(),
        rows,
    })
}

async fn project_fields(
    client: &GhClient<'_>,
    number: u64,
    fields: &[String],
) -> Result<Vec<String>, GhError> {
    let node_id = client.pr_node_id(number).await?;
    let response = client.project_fields(&node_id).await?;
    Ok(graphql::extract_fields(&response, fields))
}
