use std::sync::Arc;

use tokio::{signal, sync::mpsc};
use tracing::info;

use tillpoint::{
    config, db, events,
    handlers,
    ids::RandomIds,
    services::AppServices,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_config()?;
    config::init_tracing(&cfg.log_level, cfg.log_json);

    let pool = db::establish_connection(&cfg).await?;
    let db = Arc::new(pool);

    let (event_tx, event_rx) = mpsc::channel(1024);
    let event_sender = Arc::new(events::EventSender::new(event_tx));
    tokio::spawn(events::process_events(event_rx));

    let services = AppServices::new(db.clone(), Arc::new(RandomIds), Some(event_sender));
    let state = AppState {
        db,
        config: cfg.clone(),
        services,
    };

    let app = handlers::router(state);
    let listener = tokio::net::TcpListener::bind(cfg.bind_addr()).await?;
    info!(addr = %cfg.bind_addr(), environment = %cfg.environment, "tillpoint listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown signal received");
}
