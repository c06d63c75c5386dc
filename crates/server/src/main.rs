//! Stockist portal server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use portal_core::config::AppConfig;
use portal_records::SchemaMigration;
use portal_server::{AppState, create_router};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Portal - stockist AWS/SSS document submission server
#[derive(Parser, Debug)]
#[command(name = "portald")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "PORTAL_CONFIG",
        default_value = "config/portal.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Portal v{}", env!("CARGO_PKG_VERSION"));

    // Built-in defaults, then the optional file, then PORTAL_* variables
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
    if config_path.exists() {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    let mut config: AppConfig = figment
        .merge(Env::prefixed("PORTAL_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    if let Ok(port) = std::env::var("PORT") {
        let port: u16 = port.parse().context("PORT must be a port number")?;
        config.server.set_port(port);
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    portal_server::metrics::register_metrics();
    tracing::info!("Prometheus metrics registered");

    let records = portal_records::from_config(&config.paths)
        .await
        .context("failed to open stockist table")?;
    match records
        .ensure_schema()
        .await
        .context("failed to prepare stockist table")?
    {
        SchemaMigration::Created => tracing::info!(
            path = %config.paths.master_table.display(),
            "Created empty stockist table"
        ),
        SchemaMigration::Backfilled(columns) => tracing::info!(
            added = columns.len(),
            "Backfilled missing stockist table columns"
        ),
        SchemaMigration::Unchanged => tracing::info!("Stockist table schema verified"),
    }

    let uploads = portal_storage::from_config(&config.paths)
        .await
        .context("failed to initialize upload storage")?;
    uploads
        .health_check()
        .await
        .context("upload storage health check failed")?;
    tracing::info!(root = %uploads.root().display(), "Upload storage initialized");

    tracing::info!(accounts = config.admin.accounts.len(), "Admin accounts loaded");

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    let state = AppState::new(config, records, uploads);
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
