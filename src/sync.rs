//! Pushes derived state back to GitHub: sets the project board's Status
//! field from the review classification and assigns the author when a PR
//! has nobody assigned.

use crate::gh::graphql::SyncItem;
use crate::gh::{GhClient, GhError};
use crate::status;
use tracing::{debug, info, instrument, warn};

/// Counters describing what a sync run did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub fields_updated: usize,
    pub assignees_added: usize,
    pub skipped: usize,
}

/// Walk every open PR and apply the two mutations where they make sense.
///
/// The Status field is set to `status_option` when one is given, otherwise
/// to the review label classified per PR. A PR is skipped (counted, logged)
/// when it has no project item or when the board's Status field has no
/// matching option. Mutation failures abort the run; there is no
/// placeholder for a write.
#[instrument(skip_all)]
pub async fn run(
    client: &GhClient<'_>,
    status_option: Option<&str>,
) -> Result<SyncSummary, GhError> {
    let prs = client.list_open_prs().await?;
    debug!(count = prs.len(), "syncing open PRs");

    let mut summary = SyncSummary::default();
    for pr in &prs {
        let node_id = client.pr_node_id(pr.number).await?;
        let details = client.pr_details(pr.number).await?;
        let requested: Vec<String> = details
            .review_requests
            .iter()
            .map(|a| a.login.clone())
            .filter(|login| !login.is_empty())
            .collect();
        let states = status::latest_states(&details.reviews, &requested);
        let label = match status_option {
            Some(option) => option.to_string(),
            None => status::classify(&states, pr.is_draft, None).to_string(),
        };

        let response = client.sync_item(&node_id).await?;
        let item = response
            .data
            .and_then(|d| d.node)
            .and_then(|n| n.project_items.nodes.into_iter().next());
        match item {
            Some(item) => {
                if update_field(client, pr.number, &item, &label).await? {
                    summary.fields_updated += 1;
                } else {
                    warn!(pr = pr.number, %label, "no matching Status option, skipping");
                    summary.skipped += 1;
                }
            }
            None => {
                debug!(pr = pr.number, "PR is not on a project board");
                summary.skipped += 1;
            }
        }

        if details.assignees.iter().all(|a| a.login.is_empty()) {
            if let Some(author) = pr.author.as_ref().filter(|a| !a.login.is_empty()) {
                if let Some(user_id) = client.user_id(&author.login).await? {
                    client.add_assignee(&node_id, &user_id).await?;
                    info!(pr = pr.number, assignee = %author.login, "assigned author");
                    summary.assignees_added += 1;
                }
            }
        }
    }
    Ok(summary)
}

/// Returns true when the item's Status field was updated, false when ids or
/// a matching option are missing.
async fn update_field(
    client: &GhClient<'_>,
    number: u64,
    item: &SyncItem,
    label: &str,
) -> Result<bool, GhError> {
    let Some(item_id) = item.id.as_deref() else {
        return Ok(false);
    };
    let Some(project) = item.project.as_ref() else {
        return Ok(false);
    };
    let (Some(project_id), Some(field)) = (project.id.as_deref(), project.field.as_ref()) else {
        return Ok(false);
    };
    let Some(field_id) = field.id.as_deref() else {
        return Ok(false);
    };
    let Some(option) = field
        .options
        .iter()
        .find(|o| o.name.eq_ignore_ascii_case(label))
    else {
        return Ok(false);
    };

    client
        .update_status_field(project_id, item_id, field_id, &option.id)
        .await?;
    info!(pr = number, status = %label, "updated project Status field");
    Ok(true)
}
