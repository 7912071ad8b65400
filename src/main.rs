//! repoblog - Entry Point
//!
//! Wiring sequence:
//! 1. Parse command line
//! 2. Load config.toml + validate
//! 3. Init tracing (stderr, optional JSON)
//! 4. Create GithubClient + GithubContents (DocumentStore port)
//! 5. Create FileCredentialStore (CredentialStore port)
//! 6. Build BlogClient and run the subcommand

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use repoblog::adapters::github::{GithubClient, GithubClientConfig, GithubContents};
use repoblog::adapters::persistence::FileCredentialStore;
use repoblog::cli::{self, Cli};
use repoblog::config::{self, LoggingConfig};
use repoblog::usecases::BlogClient;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Command line ─────────────────────────────────────
    let args = Cli::parse();

    // ── 2. Load configuration ───────────────────────────────
    let config = config::loader::load_config(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;

    // ── 3. Initialize logging ───────────────────────────────
    init_tracing(&config.logging);

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        owner = %config.store.owner,
        repo = %config.store.repo,
        "Starting repoblog"
    );

    // ── 4. GitHub contents store ────────────────────────────
    let github = Arc::new(
        GithubClient::new(GithubClientConfig {
            api_base: config.store.api_base.clone(),
            ..GithubClientConfig::default()
        })
        .context("Failed to create GitHub client")?,
    );
    let store = Arc::new(GithubContents::new(github, &config.store));

    // ── 5. Token file ───────────────────────────────────────
    let credentials = Arc::new(FileCredentialStore::new(&config.credentials.path));

    // ── 6. Client + command ─────────────────────────────────
    let mut client = BlogClient::new(store, credentials, &config)
        .await
        .context("Failed to initialize blog client")?;

    let mut stdout = std::io::stdout().lock();
    cli::run(args.command, &mut client, &mut stdout).await
}

/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
