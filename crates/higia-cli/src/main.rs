use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod bootstrap;
mod commands;
mod terminal;

#[derive(Parser)]
#[command(name = "higia")]
#[command(about = "Higia CLI - track facility cleaning sessions", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Backend base URL (wins over config.toml and HIGIA_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory holding config.toml and session.json
    #[arg(long, global = true, env = "HIGIA_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Keep the login in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "HIGIA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "HIGIA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Look a sector up by code
    Sector { code: String },
    /// Start a cleaning session for a sector code and exit
    Start { code: String },
    /// Identify a sector, start a session and follow it until finalized
    Track {
        /// Sector code; read from the terminal when omitted
        code: Option<String>,
    },
    /// Follow one of your running sessions until finalized
    Resume { id: String },
    /// Finalize one of your running sessions
    Finalize {
        id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List your running sessions
    List,
    /// List past sessions
    History,
    /// Manage config.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default config.toml if none exists
    Init,
    /// Print the effective configuration
    Show,
}

fn init_logging(verbose: bool) {
    let debug_enabled = verbose
        || env::var("HIGIA_DEBUG_LOG")
            .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
            .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let global = &cli.global;
    let app = || bootstrap::App::bootstrap(global);
    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&app()?, &email, &password).await?
        }
        Commands::Register {
            name,
            email,
            password,
        } => commands::auth::register(&app()?, &name, &email, &password).await?,
        Commands::Logout => commands::auth::logout(&app()?).await?,
        Commands::Whoami => commands::auth::whoami(&app()?).await?,
        Commands::Sector { code } => commands::sessions::sector(&app()?, &code).await?,
        Commands::Start { code } => commands::sessions::start(&app()?, &code).await?,
        Commands::Track { code } => commands::track::track(&app()?, code).await?,
        Commands::Resume { id } => commands::track::resume(&app()?, &id).await?,
        Commands::Finalize { id, notes } => {
            commands::sessions::finalize(&app()?, &id, notes.as_deref()).await?
        }
        Commands::List => commands::sessions::list(&app()?).await?,
        Commands::History => commands::sessions::history(&app()?).await?,
        Commands::Config { action } => match action {
            ConfigAction::Init => commands::config::init(global)?,
            ConfigAction::Show => commands::config::show(global)?,
        },
    }

    Ok(())
}
