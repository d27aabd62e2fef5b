pub mod graphql;
pub mod types;

pub use types::{Actor, PrDetails, PullRequest, Review};

use crate::exec::{CommandRunner, ExecError};
use thiserror::Error;
use tracing::{debug, error, instrument};

#[derive(Debug, Error)]
pub enum GhError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("gh command failed: {0}")]
    Command(String),

    #[error("Failed to parse gh output: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Thin wrapper around the `gh` CLI. All queries go through subprocesses so
/// authentication stays whatever `gh auth` is configured with.
pub struct GhClient<'a> {
    runner: &'a dyn CommandRunner,
    repo: Option<String>,
}

impl<'a> GhClient<'a> {
    pub fn new(runner: &'a dyn CommandRunner, repo: Option<String>) -> Self {
        GhClient { runner, repo }
    }

    /// Target repository (owner/name) if one was configured.
    pub fn repo(&self) -> Option<&str> {
        self.repo.as_deref()
    }

    async fn run_gh(&self, args: Vec<String>) -> Result<String, GhError> {
        let output = self.runner.run("gh", &args, None).await?;
        if !output.success() {
            let message = output.error_text().to_string();
            error!(%message, "gh command failed");
            return Err(GhError::Command(message));
        }
        Ok(output.stdout)
    }

    /// Append `--repo owner/name` when a target repository is set. The
    /// `gh api` subcommand takes no such flag, so only pr commands use this.
    fn with_repo(&self, mut args: Vec<String>) -> Vec<String> {
        if let Some(repo) = &self.repo {
            args.push("--repo".to_string());
            args.push(repo.clone());
        }
        args
    }

    async fn run_graphql(&self, query: &str, variables: &[(&str, &str)]) -> Result<String, GhError> {
        let mut args = vec![
            "api".to_string(),
            "graphql".to_string(),
            "-f".to_string(),
            format!("query={query}"),
        ];
        for (name, value) in variables {
            args.push("-f".to_string());
            args.push(format!("{name}={value}"));
        }
        self.run_gh(args).await
    }

    /// List open pull requests (up to 100) with their summary fields.
    #[instrument(skip(self))]
    pub async fn list_open_prs(&self) -> Result<Vec<PullRequest>, GhError> {
        let args = self.with_repo(
            [
                "pr",
                "list",
                "--state",
                "open",
                "--limit",
                "100",
                "--json",
                "number,title,author,createdAt,updatedAt,url,isDraft",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        );
        let stdout = self.run_gh(args).await?;
        debug!(bytes = stdout.len(), "received PR list");
        Ok(serde_json::from_str(&stdout)?)
    }

    /// Review history, outstanding review requests, and assignees for a PR.
    #[instrument(skip(self))]
    pub async fn pr_details(&self, number: u64) -> Result<PrDetails, GhError> {
        let args = self.with_repo(vec![
            "pr".to_string(),
            "view".to_string(),
            number.to_string(),
            "--json".to_string(),
            "reviews,reviewRequests,assignees".to_string(),
        ]);
        let stdout = self.run_gh(args).await?;
        debug!(bytes = stdout.len(), "received PR details");
        Ok(serde_json::from_str(&stdout)?)
    }

    /// GraphQL node id of a PR, needed to reach its project items.
    #[instrument(skip(self))]
    pub async fn pr_node_id(&self, number: u64) -> Result<String, GhError> {
        let args = self.with_repo(vec![
            "pr".to_string(),
            "view".to_string(),
            number.to_string(),
            "--json".to_string(),
            "id".to_string(),
            "-q".to_string(),
            ".id".to_string(),
        ]);
        Ok(self.run_gh(args).await?.trim().to_string())
    }

    /// Projects-v2 field values for the PR's first project item.
    #[instrument(skip(self))]
    pub async fn project_fields(
        &self,
        node_id: &str,
    ) -> Result<graphql::ProjectFieldsResponse, GhError> {
        let stdout = self
            .run_graphql(graphql::PROJECT_FIELDS_QUERY, &[("PR_NODE_ID", node_id)])
            .await?;
        debug!(bytes = stdout.len(), "received project field values");
        Ok(serde_json::from_str(&stdout)?)
    }

    /// Project item, project id, and Status field options for the sync path.
    #[instrument(skip(self))]
    pub async fn sync_item(&self, node_id: &str) -> Result<graphql::SyncItemResponse, GhError> {
        let stdout = self
            .run_graphql(graphql::SYNC_ITEM_QUERY, &[("PR_NODE_ID", node_id)])
            .await?;
        Ok(serde_json::from_str(&stdout)?)
    }

    /// Resolve a login to its user node id.
    #[instrument(skip(self))]
    pub async fn user_id(&self, login: &str) -> Result<Option<String>, GhError> {
        let stdout = self
            .run_graphql(graphql::USER_ID_QUERY, &[("LOGIN", login)])
            .await?;
        let response: graphql::UserIdResponse = serde_json::from_str(&stdout)?;
        Ok(response.data.and_then(|d| d.user).and_then(|u| u.id))
    }

    /// Set the project Status single-select field of one item.
    #[instrument(skip(self, project_id, item_id, field_id))]
    pub async fn update_status_field(
        &self,
        project_id: &str,
        item_id: &str,
        field_id: &str,
        option_id: &str,
    ) -> Result<(), GhError> {
        self.run_graphql(
            graphql::UPDATE_STATUS_MUTATION,
            &[
                ("PROJECT_ID", project_id),
                ("ITEM_ID", item_id),
                ("FIELD_ID", field_id),
                ("OPTION_ID", option_id),
            ],
        )
        .await?;
        Ok(())
    }

    /// Add one assignee to a PR.
    #[instrument(skip(self, assignable_id, assignee_id))]
    pub async fn add_assignee(
        &self,
        assignable_id: &str,
        assignee_id: &str,
    ) -> Result<(), GhError> {
        self.run_graphql(
            graphql::ADD_ASSIGNEE_MUTATION,
            &[
                ("ASSIGNABLE_ID", assignable_id),
                ("ASSIGNEE_ID", assignee_id),
            ],
        )
        .await?;
        Ok(())
    }
}
