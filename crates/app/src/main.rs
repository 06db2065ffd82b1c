//! Pocketbook - workspaces for personal finances
//!
//! Command-line front end over the workspace manager and the local
//! SQLite backend.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pocketbook_core::{
    ChannelNotifier, Config, Database, LocalBackend, NewWorkspace, Notice, NoticeLevel, Result,
    WorkspaceManager, WorkspacePatch,
};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

mod commands;
mod session;

use commands::UpdateArgs;

#[derive(Parser)]
#[command(
    name = "pocketbook",
    version,
    about = "Keep personal, household and side-business finances in separate workspaces"
)]
struct Cli {
    /// Path to config file (default: config.toml in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Act as this user instead of the local one
    #[arg(long, global = true)]
    user: Option<Uuid>,

    /// Print `list` and `show` output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List workspaces, marking the active one
    List,
    /// Show the active workspace
    Show,
    /// Create a workspace and switch to it
    ///
    /// Example: pocketbook create "Side Business" --color "#10B981" --icon Building
    Create {
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Hex accent color, #RRGGBB
        #[arg(short, long)]
        color: Option<String>,

        #[arg(short, long)]
        icon: Option<String>,
    },
    /// Make a workspace active (by name or id)
    Switch { workspace: String },
    /// Rename a workspace
    Rename { workspace: String, name: String },
    /// Change a workspace's details
    Update {
        workspace: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        #[arg(long)]
        clear_description: bool,

        #[arg(long)]
        color: Option<String>,

        #[arg(long, conflicts_with = "clear_icon")]
        icon: Option<String>,

        #[arg(long)]
        clear_icon: bool,
    },
    /// Delete a workspace
    Delete { workspace: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: could not load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    let (notifier, notices) = ChannelNotifier::new();
    let result = run(cli, &config, notifier).await;
    print_notices(notices);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &Config, notifier: ChannelNotifier) -> Result<()> {
    if let Some(dir) = config.database_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let db = Database::open(&config.database_path)?;
    let user_id = match cli.user {
        Some(user_id) => user_id,
        None => session::local_user(&db)?,
    };

    let backend = LocalBackend::new(db);
    let manager = WorkspaceManager::new(
        Arc::new(backend.clone()),
        Arc::new(backend),
        Arc::new(notifier),
    )
    .with_config(config);
    manager.load(Some(user_id)).await?;

    match cli.command.unwrap_or(Commands::List) {
        Commands::List => commands::list(&manager, cli.json)?,
        Commands::Show => commands::show(&manager, cli.json)?,
        Commands::Create {
            name,
            description,
            color,
            icon,
        } => {
            let mut data = NewWorkspace::new(name);
            data.description = description;
            data.color = color;
            data.icon = icon;
            commands::create(&manager, data).await?;
        }
        Commands::Switch { workspace } => commands::switch(&manager, &workspace).await?,
        Commands::Rename { workspace, name } => {
            commands::update(&manager, &workspace, WorkspacePatch::rename(name)).await?
        }
        Commands::Update {
            workspace,
            name,
            description,
            clear_description,
            color,
            icon,
            clear_icon,
        } => {
            let patch = UpdateArgs {
                name,
                description,
                clear_description,
                color,
                icon,
                clear_icon,
            }
            .into_patch();
            commands::update(&manager, &workspace, patch).await?;
        }
        Commands::Delete { workspace } => commands::delete(&manager, &workspace).await?,
    }
    Ok(())
}

fn print_notices(mut notices: mpsc::UnboundedReceiver<Notice>) {
    while let Ok(notice) = notices.try_recv() {
        match notice.level {
            NoticeLevel::Success => eprintln!("{}", notice.message),
            NoticeLevel::Error => eprintln!("! {}", notice.message),
        }
    }
}
