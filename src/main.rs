use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use society_console::config::save_server_url;
use society_console::player::{PlaybackMode, PlayerOptions, PlayerRuntime, StepSpeed};
use society_console::store::HttpTimelineStore;
use society_console::ui::{install_panic_hook, workflow_list, ReplayApp};
use society_console::util;
use society_console::workflow::{
    export_to_dir, SortKey, SortOrder, WorkflowClient, WorkflowDraft, WorkflowStep, WorkflowTable,
};
use society_console::{ApiClient, Config};

#[derive(Parser)]
#[command(name = "society-console", version)]
#[command(about = "Operator console for agent-based society simulations")]
struct Cli {
    /// Backend base URL (overrides server.url from the config file)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Data directory for config, logs and exports
    #[arg(long, global = true, env = util::paths::HOME_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the timeline player for an experiment
    Replay {
        experiment_id: Uuid,

        /// Step interval in milliseconds (100, 250, 500, 1000, 2000, 5000, 10000)
        #[arg(long, value_parser = parse_interval)]
        interval: Option<StepSpeed>,

        /// Start following the live edge (running experiments only)
        #[arg(long)]
        live: bool,
    },
    /// Manage saved workflow configurations
    Workflows {
        #[command(subcommand)]
        command: WorkflowCommand,
    },
    /// Inspect or edit the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum WorkflowCommand {
    /// List workflows
    List {
        /// Case-insensitive filter over name and description
        #[arg(long)]
        search: Option<String>,

        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Page to show, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Create a workflow
    Create {
        /// Name; defaults to "Workflow N"
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// JSON file holding the array of steps
        #[arg(long)]
        steps: Option<PathBuf>,
    },
    /// Change an existing workflow
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        steps: Option<PathBuf>,
    },
    /// Save a copy of a workflow as a new entry
    Duplicate { id: String },
    /// Delete a workflow
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Write a workflow to a JSON file
    Export {
        id: String,

        /// Target directory (defaults to export.dir or the data directory's exports/)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the config file path
    Path,
    /// Save the backend URL to the config file
    SetServer { url: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    Updated,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortKey::Name,
            SortArg::Updated => SortKey::Updated,
        }
    }
}

fn parse_interval(raw: &str) -> Result<StepSpeed, String> {
    let ms: u64 = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a number of milliseconds"))?;
    StepSpeed::try_from(ms)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    util::init_data_dir(cli.data_dir.clone());
    init_logging()?;

    let mut config = Config::load();
    if let Some(server) = &cli.server {
        config = config.with_server_url(server.clone());
    }

    match cli.command {
        Commands::Replay {
            experiment_id,
            interval,
            live,
        } => run_replay(&config, experiment_id, interval, live).await,
        Commands::Workflows { command } => run_workflows(&config, command).await,
        Commands::Config { command } => run_config(command),
    }
}

/// Log to file (~/.society-console/logs/society-console.log) so output
/// never lands on the TUI.
fn init_logging() -> Result<()> {
    fs::create_dir_all(util::logs_dir())?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(util::log_file_path())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    Ok(())
}

fn api_client(config: &Config) -> Result<ApiClient> {
    ApiClient::new(config.server_url.clone(), config.timeout)
        .with_context(|| format!("Failed to create client for {}", config.server_url))
}

async fn run_replay(
    config: &Config,
    experiment_id: Uuid,
    interval: Option<StepSpeed>,
    live: bool,
) -> Result<()> {
    let store = HttpTimelineStore::new(api_client(config)?, experiment_id);
    let options = PlayerOptions {
        interval: interval.unwrap_or(config.default_interval),
        mode: if live {
            PlaybackMode::Live
        } else {
            PlaybackMode::Replay
        },
        refresh_on_start: true,
    };
    tracing::info!(%experiment_id, interval = ?options.interval, live, "Opening replay");

    install_panic_hook();
    let handle = PlayerRuntime::spawn(Arc::new(store), options);
    ReplayApp::new(handle).run().await
}

/// Ask on the terminal before deleting. Only `y` or `yes` proceeds.
fn confirm_delete(id: &str) -> Result<bool> {
    eprint!("Are you sure you want to delete workflow {id}? [y/N] ");
    io::stderr().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn read_steps(path: &Path) -> Result<Vec<WorkflowStep>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{} must hold a JSON array of step objects", path.display()))
}

async fn run_workflows(config: &Config, command: WorkflowCommand) -> Result<()> {
    let client = WorkflowClient::new(api_client(config)?);

    match command {
        WorkflowCommand::List {
            search,
            sort,
            desc,
            page,
        } => {
            let mut table = WorkflowTable::default();
            table.set_workflows(client.list().await?);
            if let Some(search) = search {
                table.set_search(search);
            }
            if let Some(sort) = sort {
                let order = if desc {
                    SortOrder::Descending
                } else {
                    SortOrder::Ascending
                };
                table.sort_by(sort.into(), order);
            }
            table.go_to_page(page.saturating_sub(1));
            print!("{}", workflow_list::render_page(&table));
        }
        WorkflowCommand::Create {
            name,
            description,
            steps,
        } => {
            let existing = client.list().await?.len();
            let mut draft = WorkflowDraft::for_new(existing);
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(description) = description {
                draft.description = description;
            }
            if let Some(path) = steps {
                draft.config = read_steps(&path)?;
            }
            let saved = client.save(&draft).await?;
            println!("Created {} ({})", saved.name, saved.id);
        }
        WorkflowCommand::Edit {
            id,
            name,
            description,
            steps,
        } => {
            let mut draft = WorkflowDraft::from_existing(&client.find(&id).await?);
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(description) = description {
                draft.description = description;
            }
            if let Some(path) = steps {
                draft.config = read_steps(&path)?;
            }
            let saved = client.save(&draft).await?;
            println!("Updated {} ({})", saved.name, saved.id);
        }
        WorkflowCommand::Duplicate { id } => {
            let draft = WorkflowDraft::duplicate_of(&client.find(&id).await?);
            let saved = client.save(&draft).await?;
            println!("Created {} ({})", saved.name, saved.id);
        }
        WorkflowCommand::Delete { id, yes } => {
            if !yes && !confirm_delete(&id)? {
                println!("Cancelled");
                return Ok(());
            }
            client.delete(&id).await?;
            println!("Deleted {id}");
        }
        WorkflowCommand::Export { id, out } => {
            let workflow = client.find(&id).await?;
            let dir = out.unwrap_or_else(|| config.resolved_export_dir());
            let path = export_to_dir(&workflow, &dir)?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn run_config(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Path => println!("{}", util::config_path().display()),
        ConfigCommand::SetServer { url } => {
            save_server_url(&url)?;
            println!("Server set to {url}");
        }
    }
    Ok(())
}
