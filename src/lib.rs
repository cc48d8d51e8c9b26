pub mod api;
pub mod clients;
pub mod config;
pub mod roster;
pub mod services;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::signal;

use chrono::Utc;
use clients::GitHubClient;
pub use config::Config;
use services::RosterService;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Rostergate - access roster manager
/// Admin service for a user list embedded in a GitHub-hosted script file
#[derive(Parser)]
#[command(name = "rostergate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP admin service
    #[command(alias = "-d", alias = "--daemon")]
    Serve,

    /// Fetch the managed file and verify the roster block parses
    #[command(alias = "-c")]
    Check,

    /// Print the current roster
    #[command(alias = "ls")]
    List,
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    config.validate()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config).await,
        Commands::Check => cmd_check(&config).await,
        Commands::List => cmd_list(&config).await,
    }
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    info!(
        "Rostergate v{} starting on repo {}/{} ({})",
        env!("CARGO_PKG_VERSION"),
        config.github.owner,
        config.github.repo,
        config.github.file_path
    );

    let state = api::create_app_state(&config)?;
    let app = api::router(state);

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web API running at http://{}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }

    server_handle.abort();
    info!("Server stopped");

    Ok(())
}

fn build_service(config: &Config) -> anyhow::Result<RosterService> {
    let token = Config::github_token()?;
    let client = GitHubClient::new(config.github.clone(), token)?;
    Ok(RosterService::new(Arc::new(client)))
}

async fn cmd_check(config: &Config) -> anyhow::Result<()> {
    let service = build_service(config)?;
    let (file, records) = service.load().await?;

    println!(
        "Roster OK: {} record(s) in {} ({} bytes, sha {})",
        records.len(),
        config.github.file_path,
        file.content.len(),
        &file.sha[..file.sha.len().min(12)]
    );
    Ok(())
}

async fn cmd_list(config: &Config) -> anyhow::Result<()> {
    let service = build_service(config)?;
    let (_, records) = service.load().await?;
    let today = Utc::now().date_naive();

    if records.is_empty() {
        println!("Roster is empty.");
        return Ok(());
    }

    println!("{:<20} {:<12} {}", "USERNAME", "EXPIRES", "STATUS");
    for user in &records {
        let status = if user.is_expired(today) {
            "expired"
        } else if user.is_admin() {
            "admin"
        } else {
            "active"
        };
        println!("{:<20} {:<12} {}", user.username, user.expires_at, status);
    }
    Ok(())
}
