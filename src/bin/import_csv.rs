//! Import CSV binary - bulk loads `word,word2,word3` rows into the database
//!
//! Usage:
//!   cargo run --bin import-csv -- words.csv
//!
//! Rows are upserted by `word` exactly like `POST /upload-csv`: no
//! translation and no validation.
//!
//! Required environment variables:
//! - DATABASE_URL

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::sync::Arc;
use tracing::info;
use vocab_server::config::Config;
use vocab_server::db::Database;
use vocab_server::service::WordService;
use vocab_server::translation::GoogleTranslator;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vocab_server=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <file.csv>", args[0]);
        std::process::exit(1);
    }
    let path = &args[1];

    let config = Config::from_env()?;
    let Some(database_url) = config.database_url.as_deref() else {
        bail!("DATABASE_URL not set; nothing to import into");
    };

    let database = Database::new(database_url).await?;
    let translator = GoogleTranslator::new(reqwest::Client::new(), config.translate_api_url.clone());
    let service = WordService::new(Arc::new(translator), Arc::new(database), config.languages);

    let file = File::open(path).with_context(|| format!("Failed to open {}", path))?;
    let rows = service
        .import_csv(file)
        .await
        .with_context(|| format!("Failed to import {}", path))?;

    info!("Imported {} rows from {}", rows.len(), path);
    println!("Processed {} rows", rows.len());
    Ok(())
}
