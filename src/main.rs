use anyhow::{Context, Result};
use beacon_sos::{
    create_router, AppState, Config, ContactNotifier, InMemoryDirectory, InMemoryRecordingStore,
    InMemorySessionStore, LiveChannelBroker, LiveLocationCache, LogGateway, RecordingIngestor,
    SessionManager,
};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "beacon-sos", about = "Emergency session and live notification pipeline")]
struct Args {
    /// Config file (without extension), as read by the config crate
    #[arg(long, default_value = "config/beacon-sos")]
    config: String,

    /// Override the configured HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut cfg = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            info!("no config loaded from {} ({}), using defaults", args.config, e);
            Config::default()
        }
    };
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    info!("{} v0.1.0", cfg.service.name);

    let sessions = Arc::new(InMemorySessionStore::new());
    let recordings = Arc::new(InMemoryRecordingStore::new());
    let directory = Arc::new(InMemoryDirectory::new());
    let notifier = Arc::new(ContactNotifier::new(
        Arc::new(LogGateway),
        Duration::from_secs(cfg.notify.sms_timeout_secs),
    ));
    let broker = Arc::new(LiveChannelBroker::new());
    let cache = Arc::new(LiveLocationCache::new());

    let manager = Arc::new(SessionManager::new(
        sessions,
        directory.clone(),
        notifier.clone(),
        broker,
        cache,
        cfg.notify.tracking_base_url.clone(),
    ));

    let ingestor = Arc::new(RecordingIngestor::new(
        recordings,
        directory,
        manager.clone(),
        notifier,
        cfg.recording.staging_dir.clone().into(),
        cfg.recording.max_payload_bytes,
        cfg.notify.tracking_base_url.clone(),
    )?);

    let app = create_router(
        AppState::new(manager, ingestor),
        Duration::from_secs(cfg.recording.upload_timeout_secs),
        (cfg.recording.max_payload_bytes as usize).saturating_mul(2),
    );

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("HTTP server exited")?;

    Ok(())
}
