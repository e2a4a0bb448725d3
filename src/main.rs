use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::sync::mpsc;

use filmcheck::app::{App, AppEvent};
use filmcheck::config::Config;
use filmcheck::ui;

/// Get the config directory path (~/.config/filmcheck/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("filmcheck"))
}

/// Restrict the config directory to the current user (it may hold secrets).
#[cfg(unix)]
fn restrict_permissions(dir: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(dir) {
        Ok(metadata) => {
            let mut perms = metadata.permissions();
            perms.set_mode(0o700);
            if let Err(e) = std::fs::set_permissions(dir, perms) {
                tracing::warn!(
                    path = %dir.display(),
                    error = %e,
                    "Failed to set config directory permissions to 0700"
                );
            }
        }
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "Failed to read config directory metadata");
        }
    }
}

/// Log to a file: the TUI owns stdout and stderr while it runs.
///
/// Filtering follows `RUST_LOG`, defaulting to `info`.
fn init_logging(config_dir: &std::path::Path) -> Result<()> {
    let log_path = config_dir.join("filmcheck.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file '{}'", log_path.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[derive(Parser, Debug)]
#[command(
    name = "filmcheck",
    about = "Terminal film catalogue browser with search, favorites and comments"
)]
struct Args {
    /// Config file (default: ~/.config/filmcheck/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Email identifying your favorites (overrides user_email in config)
    #[arg(long, value_name = "EMAIL")]
    email: Option<String>,

    /// Start with a search instead of the full listing
    #[arg(long, value_name = "TEXT")]
    query: Option<String>,

    /// Open the favorites view on startup
    #[arg(long)]
    favorites: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }
    init_logging(&config_dir)?;
    #[cfg(unix)]
    restrict_permissions(&config_dir);

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;
    tracing::debug!(?config, "Effective configuration");

    if config.api_key().is_none() {
        eprintln!("Error: no catalogue API key configured.");
        eprintln!();
        eprintln!("Set the TMDB_API_KEY environment variable, or add");
        eprintln!("  tmdb_api_key = \"...\"");
        eprintln!("to {}", config_path.display());
        std::process::exit(1);
    }

    let mut app = App::new(&config, args.email).context("Failed to create application")?;
    if app.store.is_none() {
        tracing::info!("No firebase_database_url configured, favorites and comments disabled");
    }

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    ui::start(&mut app, args.query.as_deref(), args.favorites, &event_tx);

    ui::run(&mut app, event_tx, event_rx).await?;

    tracing::info!("Exiting");
    Ok(())
}
