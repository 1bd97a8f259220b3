use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tabula_core::session::SnapshotType;

mod commands;

#[derive(Parser)]
#[command(name = "tabula")]
#[command(about = "Tabula CLI - project/tab store with undo and session snapshots", long_about = None)]
struct Cli {
    /// Directory holding the store documents (defaults to the platform data dir)
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Configuration file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage projects
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Manage tabs inside a project
    Tabs {
        #[command(subcommand)]
        action: TabAction,
    },
    /// Purge removed tabs past the grace window
    Cleanup {
        /// Purge every removed tab regardless of the grace window
        #[arg(long)]
        force: bool,
    },
    /// Manage session snapshots
    Snapshots {
        #[command(subcommand)]
        action: SnapshotAction,
    },
    /// Session lifecycle and crash detection
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Report storage usage by category
    Usage,
    /// Suggest housekeeping based on usage
    Recommendations,
    /// Recently used intents
    Intents {
        #[command(subcommand)]
        action: IntentAction,
    },
    /// Free-form user settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum ProjectAction {
    /// List projects
    List {
        /// Hide removed tabs and projects without active tabs
        #[arg(long)]
        active: bool,
    },
    /// Create a project
    Add {
        title: String,
        #[arg(long)]
        intent: Option<String>,
        #[arg(long)]
        subtitle: Option<String>,
    },
    /// Change a project's title, subtitle or intent
    Rename {
        project_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        subtitle: Option<String>,
        #[arg(long)]
        intent: Option<String>,
    },
    /// Delete a project and all of its tabs
    Delete { project_id: String },
}

#[derive(Subcommand)]
enum TabAction {
    /// Add a tab to a project
    Add {
        project_id: String,
        url: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        favicon: Option<String>,
    },
    /// Soft-delete a tab
    Remove { project_id: String, tab_id: String },
    /// Restore a soft-deleted tab
    Undo { project_id: String, tab_id: String },
    /// Search active tabs by title or URL
    Search { query: String },
}

#[derive(Subcommand)]
enum SnapshotAction {
    /// Snapshot the current projects
    Create {
        #[arg(long, value_enum, default_value_t = SnapshotKind::Manual)]
        kind: SnapshotKind,
    },
    /// List snapshots, newest first
    List,
    /// Replace the projects with a snapshot's contents
    Restore { snapshot_id: String },
    /// Delete one snapshot
    Delete { snapshot_id: String },
    /// Keep only the newest snapshots
    Prune {
        #[arg(long, default_value_t = 5)]
        keep: usize,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Report whether the previous session ended without closing
    Check,
    /// Open a session: detect a crash, mark active and take a snapshot
    Open {
        /// Keep running the snapshot and cleanup loop until interrupted
        #[arg(long)]
        watch: bool,
    },
    /// Mark the session closed normally
    Close,
}

#[derive(Subcommand)]
enum IntentAction {
    /// List recent intents, newest first
    List,
    /// Record an intent as most recent
    Add { intent: String },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the settings object
    Show,
    /// Replace the settings with a JSON object
    Set { json: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum SnapshotKind {
    Manual,
    Auto,
    PreClose,
}

impl From<SnapshotKind> for SnapshotType {
    fn from(kind: SnapshotKind) -> Self {
        match kind {
            SnapshotKind::Manual => SnapshotType::Manual,
            SnapshotKind::Auto => SnapshotType::Auto,
            SnapshotKind::PreClose => SnapshotType::PreClose,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = commands::Context::open(cli.store_dir, cli.config).await?;

    let success = match cli.command {
        Commands::Projects { action } => match action {
            ProjectAction::List { active } => commands::projects::list(&ctx, active).await,
            ProjectAction::Add {
                title,
                intent,
                subtitle,
            } => commands::projects::add(&ctx, title, intent, subtitle).await,
            ProjectAction::Rename {
                project_id,
                title,
                subtitle,
                intent,
            } => commands::projects::rename(&ctx, &project_id, title, subtitle, intent).await,
            ProjectAction::Delete { project_id } => {
                commands::projects::delete(&ctx, &project_id).await
            }
        },
        Commands::Tabs { action } => match action {
            TabAction::Add {
                project_id,
                url,
                title,
                favicon,
            } => commands::tabs::add(&ctx, &project_id, url, title, favicon).await,
            TabAction::Remove { project_id, tab_id } => {
                commands::tabs::remove(&ctx, &project_id, &tab_id).await
            }
            TabAction::Undo { project_id, tab_id } => {
                commands::tabs::undo(&ctx, &project_id, &tab_id).await
            }
            TabAction::Search { query } => commands::tabs::search(&ctx, &query).await,
        },
        Commands::Cleanup { force } => commands::tabs::cleanup(&ctx, force).await,
        Commands::Snapshots { action } => match action {
            SnapshotAction::Create { kind } => {
                commands::snapshots::create(&ctx, kind.into()).await
            }
            SnapshotAction::List => commands::snapshots::list(&ctx).await,
            SnapshotAction::Restore { snapshot_id } => {
                commands::snapshots::restore(&ctx, &snapshot_id).await
            }
            SnapshotAction::Delete { snapshot_id } => {
                commands::snapshots::delete(&ctx, &snapshot_id).await
            }
            SnapshotAction::Prune { keep } => commands::snapshots::prune(&ctx, keep).await,
        },
        Commands::Session { action } => match action {
            SessionAction::Check => commands::session::check(&ctx).await,
            SessionAction::Open { watch } => commands::session::open(&ctx, watch).await,
            SessionAction::Close => commands::session::close(&ctx).await,
        },
        Commands::Usage => commands::maintenance::usage(&ctx).await,
        Commands::Recommendations => commands::maintenance::recommendations(&ctx).await,
        Commands::Intents { action } => match action {
            IntentAction::List => commands::maintenance::intents(&ctx).await,
            IntentAction::Add { intent } => commands::maintenance::add_intent(&ctx, &intent).await,
        },
        Commands::Settings { action } => match action {
            SettingsAction::Show => commands::maintenance::settings(&ctx).await,
            SettingsAction::Set { json } => commands::maintenance::save_settings(&ctx, &json).await,
        },
    }?;

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
