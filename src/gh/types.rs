use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One entry from `gh pr list --json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub is_draft: bool,
    pub author: Option<Actor>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A user reference as `gh` reports it. Team review requests carry no
/// `login`, which is why the field defaults to empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Actor {
    #[serde(default)]
    pub login: String,
}

/// Detail payload from `gh pr view --json reviews,reviewRequests,assignees`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrDetails {
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub review_requests: Vec<Actor>,
    #[serde(default)]
    pub assignees: Vec<Actor>,
}

/// A single review event. `submitted_at` is absent for pending reviews.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub author: Option<Actor>,
    #[serde(default)]
    pub state: String,
    pub submitted_at: Option<DateTime<Utc>>,
}
