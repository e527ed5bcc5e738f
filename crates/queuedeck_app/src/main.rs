mod commands;
mod config;
mod dashboard;
mod logging;
mod terminal;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use queuedeck_core::{Action, JobId, LogStream, Msg, TaskId};
use queuedeck_engine::{JobQueueApi, ReqwestApi, StaticTokens};

use crate::commands::Client;
use crate::config::{AppConfig, Overrides, DEFAULT_CONFIG_PATH};
use crate::logging::LogDestination;

#[derive(Parser)]
#[command(name = "queuedeck")]
#[command(about = "Terminal client for a video download job queue", long_about = None)]
struct Cli {
    /// Config file (RON).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// API root, e.g. http://localhost:8123/api/
    #[arg(long, global = true)]
    api_root: Option<String>,
    #[arg(long, global = true)]
    api_token: Option<String>,
    #[arg(long, global = true)]
    session_token: Option<String>,
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Live dashboard (default)
    Dashboard {
        /// Render one cycle and exit
        #[arg(long)]
        once: bool,
    },
    /// Create a job and print its id
    Submit {
        url: String,
        #[arg(long)]
        format: Option<String>,
    },
    /// Create a job and follow it until it finishes
    Download {
        url: String,
        #[arg(long)]
        format: Option<String>,
    },
    /// Act on one job
    Job {
        #[arg(value_parser = parse_action)]
        action: Action,
        job_id: String,
    },
    /// Act on one task
    Task {
        #[arg(value_parser = parse_action)]
        action: Action,
        task_id: String,
    },
    /// Act on every job
    All {
        #[arg(value_parser = parse_action)]
        action: Action,
    },
    /// Save a task's captured output under the log directory
    Logs {
        task_id: String,
        #[arg(long, default_value = "stdout", value_parser = parse_stream)]
        stream: LogStream,
    },
    /// List available formats
    Formats,
    /// Print server status, counts and jobs
    Status,
    /// Local and server configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
    /// Ask the server to shut down
    Shutdown,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the server's configuration
    ShowRemote,
    /// Replace the server's configuration with a JSON document
    SetRemote { json: String },
    /// Write a default config file
    Init {
        #[arg(long)]
        force: bool,
    },
}

fn parse_action(raw: &str) -> Result<Action, String> {
    Action::parse(raw)
        .ok_or_else(|| "expected one of cancel, pause, resume, retry, delete".to_string())
}

fn parse_stream(raw: &str) -> Result<LogStream, String> {
    LogStream::parse(raw).ok_or_else(|| "expected stdout or stderr".to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Dashboard { once: false });

    if let Commands::Config {
        action: ConfigCommands::Init { force },
    } = command
    {
        logging::initialize(&LogDestination::Stderr, cli.verbose)?;
        let path = config::write_default(&cli.config, force)?;
        println!("{}", path.display());
        return Ok(());
    }

    let mut config = AppConfig::load(&cli.config)?;
    config.apply(Overrides {
        api_root: cli.api_root,
        api_token: cli.api_token,
        session_token: cli.session_token,
    });

    let live = matches!(command, Commands::Dashboard { once: false });
    logging::initialize(
        &LogDestination::for_command(live, &config.log_dir),
        cli.verbose,
    )?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let result = runtime.block_on(execute(command, config));
    // Unfinished effect tasks must not hold the process open.
    runtime.shutdown_background();
    result
}

async fn execute(command: Commands, config: AppConfig) -> Result<()> {
    let tokens = StaticTokens::new(config.credentials());
    let api: Arc<dyn JobQueueApi> = Arc::new(
        ReqwestApi::new(&config.api_settings(), Arc::new(tokens))
            .with_context(|| format!("invalid api root {}", config.api_root))?,
    );
    let client = Client::new(api.clone(), config.clone());

    match command {
        Commands::Dashboard { once: true } => dashboard::run_once(&client, api).await,
        Commands::Dashboard { once: false } => dashboard::run(&client, api, &config).await,
        Commands::Submit { url, format } => {
            client
                .gated(client.fresh_session(), Msg::SubmitUrl { url, format })
                .await
        }
        Commands::Download { url, format } => {
            client
                .gated(client.fresh_session(), Msg::StartDownload { url, format })
                .await
        }
        Commands::Job { action, job_id } => {
            let session = client.listed_session().await?;
            let msg = Msg::JobAction {
                job_id: JobId::new(job_id),
                action,
            };
            client.gated(session, msg).await
        }
        Commands::Task { action, task_id } => {
            let session = client.listed_session().await?;
            let msg = Msg::TaskAction {
                task_id: TaskId::new(task_id),
                action,
            };
            client.gated(session, msg).await
        }
        Commands::All { action } => {
            client
                .gated(client.fresh_session(), Msg::BulkAction(action))
                .await
        }
        Commands::Logs { task_id, stream } => {
            let session = client.listed_session().await?;
            let msg = Msg::OpenTaskLog {
                task_id: TaskId::new(task_id),
                stream,
            };
            client.gated(session, msg).await
        }
        Commands::Formats => client.print_formats().await,
        Commands::Status => client.print_status().await,
        Commands::Config { action } => match action {
            ConfigCommands::ShowRemote => client.show_remote_config().await,
            ConfigCommands::SetRemote { json } => client.set_remote_config(&json).await,
            ConfigCommands::Init { .. } => Ok(()),
        },
        Commands::Shutdown => client.gated(client.fresh_session(), Msg::RequestShutdown).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_dashboard() {
        let cli = Cli::parse_from(["queuedeck"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn actions_and_streams_parse_at_the_boundary() {
        let cli = Cli::parse_from(["queuedeck", "job", "Retry", "job-7"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Job {
                action: Action::Retry,
                ..
            })
        ));

        let cli = Cli::parse_from(["queuedeck", "logs", "t-1", "--stream", "stderr"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Logs {
                stream: LogStream::Stderr,
                ..
            })
        ));

        assert!(Cli::try_parse_from(["queuedeck", "all", "explode"]).is_err());
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::parse_from([
            "queuedeck",
            "status",
            "--api-root",
            "http://nas:8123/api/",
            "--config",
            "other.ron",
        ]);
        assert_eq!(cli.api_root.as_deref(), Some("http://nas:8123/api/"));
        assert_eq!(cli.config, PathBuf::from("other.ron"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
