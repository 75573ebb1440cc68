//! Catalog API server: reads settings, connects the store, serves the router.

use catalog_api::{
    app, ensure_database_exists, telemetry, AppState, InMemoryProductStore, PgProductStore, ProductStore, Settings,
    StoreBackend,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    telemetry::init();

    let store: Arc<dyn ProductStore> = match settings.store {
        StoreBackend::Postgres => {
            ensure_database_exists(&settings.database_url).await?;
            Arc::new(PgProductStore::connect(&settings.database_url, settings.max_connections).await?)
        }
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store; data is lost on exit");
            Arc::new(InMemoryProductStore::new())
        }
    };

    let app = app(AppState::new(store), settings.body_limit);
    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c; graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
