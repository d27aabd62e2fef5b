mod collect;
mod config;
mod exec;
mod gh;
mod logging;
mod publish;
mod report;
mod status;
mod sync;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Instrument};

/// pr-status — collects GitHub pull-request review and project metadata via
/// the `gh` CLI and maintains a Markdown status page for the repository wiki.
#[derive(Parser, Debug)]
#[command(name = "pr-status", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the PR status report
    Collect {
        /// Directory the Markdown report is written to
        #[arg(default_value = ".")]
        output_dir: PathBuf,

        /// Target repository (owner/name); defaults to GITHUB_REPOSITORY
        #[arg(long)]
        repo: Option<String>,

        /// Print the report to the terminal instead of writing a file
        #[arg(long)]
        stdout: bool,
    },
    /// Commit and push report files from a wiki checkout
    Publish {
        /// Path to the wiki repository checkout
        wiki_dir: PathBuf,
    },
    /// Push review status and author assignment back to the project board
    Sync {
        /// Target repository (owner/name); defaults to GITHUB_REPOSITORY
        #[arg(long)]
        repo: Option<String>,

        /// Status option to set on every PR's project item; defaults to the
        /// classified review label per PR
        #[arg(long)]
        status_field_option: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let cli = Cli::parse();
    run(cli).instrument(logging::run_span()).await
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::load()?;
    let runner = exec::SystemRunner;

    match cli.command {
        Command::Collect {
            output_dir,
            repo,
            stdout,
        } => {
            let repo = repo.or_else(|| config.repository());
            info!(repo = repo.as_deref().unwrap_or("unknown"), "collecting PR status");
            let login_map = config::LoginMap::from_env();
            let client = gh::GhClient::new(&runner, repo);

            let report = collect::run(&client, &config, &login_map).await?;
            info!(rows = report.rows.len(), "report assembled");

            if stdout {
                report::output(&report, None)?;
            } else {
                std::fs::create_dir_all(&output_dir)?;
                report::output(&report, Some(&output_dir))?;
                info!(file = %output_dir.join(report.file_name()).display(), "report written");
            }
        }
        Command::Publish { wiki_dir } => {
            let publisher = publish::Publisher::new(&runner, &wiki_dir);
            let pushed = publisher
                .publish(
                    config.token().as_deref(),
                    config.repository().as_deref(),
                    &config.actor(),
                )
                .await?;
            if pushed {
                info!("wiki updated");
            }
        }
        Command::Sync {
            repo,
            status_field_option,
        } => {
            let repo = repo.or_else(|| config.repository());
            info!(repo = repo.as_deref().unwrap_or("unknown"), "syncing project board");
            let client = gh::GhClient::new(&runner, repo);
            let summary = sync::run(&client, status_field_option.as_deref()).await?;
            info!(
                fields = summary.fields_updated,
                assignees = summary.assignees_added,
                skipped = summary.skipped,
                "sync complete"
            );
        }
    }

    Ok(())
}
