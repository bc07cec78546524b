use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use vocab_server::config::Config;
use vocab_server::db::Database;
use vocab_server::service::WordService;
use vocab_server::store::{MemoryWordStore, WordStore};
use vocab_server::translation::GoogleTranslator;
use vocab_server::{build_app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vocab_server=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting vocabulary server");

    let config = Config::from_env()?;
    info!(
        "Canonical languages: {}",
        config.languages.codes().join(", ")
    );

    let store = open_store(&config).await?;

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client")?;
    let translator = GoogleTranslator::new(client, config.translate_api_url.clone());

    let service = WordService::new(Arc::new(translator), store, config.languages.clone());
    let state = AppState::with_api_key(service, &config.upload_dir, config.api_key.clone());
    if state.api_key.is_some() {
        info!("API key required for write endpoints");
    }

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn open_store(config: &Config) -> Result<Arc<dyn WordStore>> {
    match &config.database_url {
        Some(url) => {
            let database = Database::new(url).await?;
            info!("Using PostgreSQL store");
            Ok(Arc::new(database))
        }
        None => {
            warn!("DATABASE_URL not set, records are kept in memory only");
            Ok(Arc::new(MemoryWordStore::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
