use std::sync::Arc;

use anyhow::Context;

use shipyard_infra::config::AppConfig;
use shipyard_infra::store::{InMemoryShipStore, PostgresShipStore, ShipStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    shipyard_observability::init(config.log_format);

    let store: Arc<dyn ShipStore> = match &config.database_url {
        Some(url) => {
            let store = PostgresShipStore::connect(url, config.database_max_connections)
                .await
                .context("failed to connect to Postgres")?;
            store
                .migrate()
                .await
                .context("failed to prepare ship schema")?;
            tracing::info!(
                max_connections = config.database_max_connections,
                "using postgres ship store"
            );
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory ship store");
            Arc::new(InMemoryShipStore::new())
        }
    };

    let app = shipyard_api::app::build_app(store);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
