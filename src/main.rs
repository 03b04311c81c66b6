use std::net::SocketAddr;
use std::sync::Arc;

use catalog_bot::build_engine;
use catalog_bot::config::BotConfig;
use catalog_bot::server::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_bot=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = BotConfig::from_env()?;

    // No service without data: a bad catalog aborts startup.
    let engine = build_engine(&config).map_err(|e| {
        format!(
            "{e}. Set CATALOG_PATH to a JSON export of the catalog sheet (currently {}).",
            config.catalog_path.display()
        )
    })?;

    let state = AppState::new(Arc::new(engine)).with_reply_delay(config.reply_delay);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Catalog bot listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
