use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{Level, info};

use recipebook::config::AppConfig;
use recipebook::media::FilesystemMediaStore;
use recipebook::state::AppState;
use recipebook::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    info!("Connecting to database...");
    let db = database::init_db(&config.database.url).await?;
    seed::ensure_indexes(&db).await?;
    if let Some(ref path) = config.catalog.ingredients_file {
        seed::seed_ingredients(&db, path).await?;
    }
    seed::bootstrap_admin(&db, &config.admin).await?;

    let media = FilesystemMediaStore::new(
        config.media.root.clone(),
        config.media.url_prefix.clone(),
        config.media.max_image_bytes,
    )
    .await?;

    let address = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        config,
        media: Arc::new(media),
    };
    let app = build_router(state);

    let listener = TcpListener::bind(&address).await?;
    info!("Server running at http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
