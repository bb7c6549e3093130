use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use qlens_server::logging::{self, LoggingConfig};
use qlens_server::{AppState, MysqlCollaborator, QlensConfig, router};
use qlens_session::{AnalysisService, ReportFormatter, SessionAnalyzer};

/// SQL analysis service
#[derive(Debug, Parser)]
#[command(name = "qlens", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, env = "QLENS_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the config file
    #[arg(long)]
    bind: Option<String>,

    /// MySQL connection URL, overriding the config file
    #[arg(long, env = "QLENS_DATABASE_URL")]
    database_url: Option<String>,

    /// Emit JSON log lines on the console
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn apply(&self, config: &mut QlensConfig) {
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(url) = &self.database_url {
            config.database.url = Some(url.clone());
        }
        if self.json_logs {
            config.logging.json = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => QlensConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => QlensConfig::default(),
    };
    cli.apply(&mut config);

    let _log_guard = logging::init(LoggingConfig::from_settings(&config.logging))?;

    let url = config
        .database
        .url
        .clone()
        .context("no database URL; pass --database-url or set QLENS_DATABASE_URL")?;
    let addr = config.server.bind_addr()?;

    let collaborator = Arc::new(MysqlCollaborator::connect(&url)?);
    let analyzer = SessionAnalyzer::with_options(
        collaborator.clone(),
        collaborator.clone(),
        config.session.clone(),
    );
    let service = AnalysisService::new(analyzer, ReportFormatter::system());
    let app = router(AppState::new(service), &config.server);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, mode = ?config.session.mode, "qlens listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down");
    if let Some(collaborator) = Arc::into_inner(collaborator) {
        collaborator.disconnect().await?;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
