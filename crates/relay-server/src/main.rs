//! The `alert-relay` binary: forwards Alertmanager webhook notifications to
//! chat robots, tracking repeat counts per alert fingerprint.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use relay_dispatch::RobotSender;
use relay_render::Transformer;
use relay_server::{AppConfig, AppState, RelayResult, RelayServer, StorageKind};
use relay_store::{
    AlertStateStore, RedisStateStore, RetentionCleaner, RetentionPolicy, SqliteStateStore,
};
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(
    name = "alert-relay",
    version,
    about = "Relay Alertmanager webhooks to qywechat/feishu/dingtalk robots"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, env = "ALERT_RELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run(Cli::parse()).await {
        error!(error = %err, "alert-relay failed");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli) -> RelayResult<()> {
    let config = AppConfig::load(cli.config.as_deref())?;

    // Validates cleanup time and timezone even when redis skips the sweeps;
    // the timezone also drives message timestamp formatting.
    let policy = RetentionPolicy::new(
        config.history_retention_days,
        &config.cleanup_time,
        &config.cleanup_timezone,
    )?;

    let store: Arc<dyn AlertStateStore> = match config.storage_kind() {
        StorageKind::Redis => Arc::new(RedisStateStore::connect(&config.redis_url()).await?),
        StorageKind::Sqlite => Arc::new(SqliteStateStore::open(&config.sqlite_path)?),
    };

    let template = config.template()?;
    let transformer = Transformer::new(template.as_deref(), policy.timezone)?;
    let sender = RobotSender::new()?;
    let state = Arc::new(AppState::new(
        Arc::clone(&store),
        transformer,
        sender,
        &config,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let cleaner = store
        .supports_retention()
        .then(|| RetentionCleaner::spawn(Arc::clone(&store), policy, shutdown_rx));

    let addr = config.bind_addr()?;
    let server = RelayServer::new(state);
    server
        .serve_with_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = cleaner {
        let _ = handle.await;
    }
    Ok(())
}
