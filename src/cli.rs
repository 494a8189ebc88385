use anyhow::Result;
use chrono::Utc;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;

use crate::auth::Token;
use crate::board::{build_summaries, cutoff_at, parse_timezone, AggregationPolicy, BoardOptions};
use crate::cancel;
use crate::config::Config;
use crate::error::CiboardError;
use crate::output::{self, dim, FetchProgress};
use crate::providers::gitlab::{GitLabClient, ProjectRef};
use crate::registry::{self, Registry};

#[derive(Parser)]
#[command(name = "ciboard")]
#[command(author, version, about = "GitLab CI/CD pipeline board", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// GitLab personal access token
    #[arg(short, long, global = true, env = "GITLAB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitLab instance base URL
    #[arg(short, long, global = true, env = "GITLAB_URL")]
    url: Option<String>,

    /// Configuration file (defaults to ./ciboard.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Tracked projects file
    #[arg(short, long, global = true, env = "CIBOARD_REGISTRY")]
    registry: Option<PathBuf>,

    /// Show one column per stage or per known job
    #[arg(long, global = true, value_enum)]
    policy: Option<AggregationPolicy>,

    /// Time zone of the daily cutoff (e.g. Europe/Paris)
    #[arg(long, global = true)]
    timezone: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's pipelines of every tracked project
    All,
    /// Show today's pipelines of tracked projects triggered by you
    Me,
    /// Show today's pipelines of a single project, tracked or not
    Project {
        /// Project id or full path (e.g. group/project)
        project: ProjectRef,
    },
    /// Track the project matching a search
    Add { name: String },
    /// Stop tracking the project matching a search
    Remove { name: String },
    /// Cancel every job of a pipeline stage
    Cancel {
        pipeline_id: u64,

        stage: String,

        /// Project owning the pipeline; tracked projects are searched otherwise
        #[arg(short = 'P', long)]
        project: Option<ProjectRef>,
    },
}

/// Effective settings after merging flags, environment and config file.
struct Settings {
    base_url: String,
    token: Token,
    policy: AggregationPolicy,
    zone: Tz,
    cutoff_hour: u32,
    registry: PathBuf,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let config = Config::load(self.config.as_deref())?;

        let token = self
            .token
            .clone()
            .or(config.gitlab.token)
            .filter(|token| !token.trim().is_empty())
            .map(Token::from)
            .ok_or_else(|| {
                CiboardError::Config(
                    "missing GitLab token: set GITLAB_TOKEN, pass --token or add it to ciboard.toml"
                        .into(),
                )
            })?;

        let registry = match self.registry.clone().or(config.board.registry) {
            Some(path) => path,
            None => registry::default_path()?,
        };

        let timezone = self.timezone.as_deref().unwrap_or(&config.board.timezone);

        Ok(Settings {
            base_url: self.url.clone().unwrap_or(config.gitlab.base_url),
            token,
            policy: self.policy.unwrap_or(config.board.policy),
            zone: parse_timezone(timezone)?,
            cutoff_hour: config.board.cutoff_hour,
            registry,
        })
    }

    async fn show_board(
        client: &GitLabClient,
        settings: &Settings,
        projects: &[ProjectRef],
        only_current_user: bool,
    ) -> Result<()> {
        if projects.is_empty() {
            warn!("Registry {} is empty", settings.registry.display());
            println!(
                "{}",
                dim("No tracked projects yet, add one with `ciboard add <name>`")
            );
            return Ok(());
        }

        let cutoff = cutoff_at(Utc::now(), settings.zone, settings.cutoff_hour)?;
        info!("Showing pipelines updated since {cutoff}");

        let options = BoardOptions {
            policy: settings.policy,
            cutoff,
            only_current_user,
        };

        let progress = FetchProgress::start(format!(
            "Fetching pipelines for {} projects",
            projects.len()
        ));
        let summaries = match build_summaries(client, projects, &options).await {
            Ok(summaries) => summaries,
            Err(e) => {
                progress.abandon();
                return Err(e.into());
            }
        };
        progress.finish(summaries.len());

        if summaries.is_empty() {
            output::print_empty_board(cutoff, settings.zone);
        } else {
            output::print_board(&summaries, settings.policy);
        }

        Ok(())
    }

    async fn cancel(
        client: &GitLabClient,
        settings: &Settings,
        pipeline_id: u64,
        stage: &str,
        project: Option<&ProjectRef>,
    ) -> Result<()> {
        let project = match project {
            Some(project) => project.clone(),
            None => {
                let tracked = Registry::load(&settings.registry)?.project_refs();
                cancel::locate_pipeline(client, &tracked, pipeline_id).await?
            }
        };

        let cancelled = cancel::cancel_stage(client, &project, pipeline_id, stage, |job| {
            println!("Cancelled job {} ({}) in stage {stage}", job.id, job.name);
        })
        .await?;

        if cancelled.is_empty() {
            warn!("Pipeline {pipeline_id} has no job in stage {stage}");
            println!("{}", dim(format!("No job to cancel in stage {stage}")));
        }

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        let settings = self.settings()?;
        let client = GitLabClient::new(&settings.base_url, Some(settings.token.clone()))?;

        match &self.command {
            Commands::All => {
                let tracked = Registry::load(&settings.registry)?.project_refs();
                Self::show_board(&client, &settings, &tracked, false).await
            }
            Commands::Me => {
                let tracked = Registry::load(&settings.registry)?.project_refs();
                Self::show_board(&client, &settings, &tracked, true).await
            }
            Commands::Project { project } => {
                Self::show_board(&client, &settings, std::slice::from_ref(project), false).await
            }
            Commands::Add { name } => {
                let project = registry::add_project(&client, &settings.registry, name).await?;
                println!("Tracking {} ({})", project.name, project.id);
                Ok(())
            }
            Commands::Remove { name } => {
                let project = registry::remove_project(&client, &settings.registry, name).await?;
                println!("No longer tracking {} ({})", project.name, project.id);
                Ok(())
            }
            Commands::Cancel {
                pipeline_id,
                stage,
                project,
            } => Self::cancel(&client, &settings, *pipeline_id, stage, project.as_ref()).await,
        }
    }
}
