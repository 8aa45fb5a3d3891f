//! Translations - operator binary.
//!
//! - `translations pull <branch> [--force]` - sync files from the provider
//! - `translations serve` - run the lookup over HTTP

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use translations::web;
use translations::{Config, PullOptions, Puller, Translations};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Debug, Parser)]
#[command(name = "translations", version, about = "Manage translation files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Pull translations from the translations provider
    Pull {
        /// Provider branch to export
        branch: String,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Serve translation lookups over HTTP
    Serve,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("translations=info,tower_http=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let result = match cli.command {
        Command::Pull { branch, force } => pull(&config, branch, force).await,
        Command::Serve => serve(config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn pull(config: &Config, branch: String, force: bool) -> anyhow::Result<()> {
    let translations = Translations::from_config(config.clone());
    let puller = Puller::new(config).with_cache(translations.cache().clone());

    let summary = puller
        .pull(&PullOptions { branch, force }, |entry| println!("{entry}"))
        .await?;

    println!("{summary}");
    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.bind_addr;

    let translations = Arc::new(Translations::from_config(config));
    translations.init()?;

    let app = web::router(translations);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("📡 Listening on: {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
