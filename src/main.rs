//! Entry point: load config, set up logging, and run the session until Ctrl-C.

use std::fs::File;
use std::sync::Arc;
use tkvote::config::Config;
use tkvote::create_session;
use tokio::sync::watch;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    let file_layer = match &config.log_file {
        Some(path) => Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(File::options().create(true).append(true).open(path)?))
                .with_filter(LevelFilter::DEBUG),
        ),
        None => None,
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(console_filter))
        .with(file_layer)
        .init();

    let _ = rustls::crypto::ring::default_provider().install_default();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    let mut session = create_session(&config, shutdown_rx).await?;
    tracing::info!(
        endpoint = %config.connection.endpoint,
        mode = ?config.connection.mode,
        "starting session"
    );
    session.run().await?;
    Ok(())
}
