//! # vocab-server
//!
//! Backend for a trilingual vocabulary list. Each record carries one word in
//! three canonical languages plus optional extra translations. Missing
//! fields are filled by machine translation and every canonical field is
//! checked against the provider's spelling signals before anything is
//! stored.
//!
//! ## Endpoints
//!
//! - `GET /health`: status and translation gateway counters
//! - `GET /words`, `POST /words`: paged listing, create
//! - `GET /words/:id`, `PUT /words/:id`, `DELETE /words/:id`
//! - `GET /search`: keyword search across all fields
//! - `POST /upload-csv`: bulk import of `word,word2,word3` rows

pub mod completion;
pub mod config;
pub mod db;
pub mod error;
pub mod i18n;
pub mod model;
pub mod routes;
pub mod security;
pub mod service;
pub mod store;
pub mod translation;
pub mod validator;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::WordService;

/// Largest accepted CSV upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Shared application state, passed to all route handlers via Axum `State`.
pub struct AppState {
    pub service: WordService,
    /// Where uploads are spooled while they are imported.
    pub upload_dir: PathBuf,
    /// Required `x-api-key` for writes, if any.
    pub api_key: Option<String>,
}

impl AppState {
    pub fn new(service: WordService, upload_dir: impl Into<PathBuf>) -> Arc<Self> {
        Self::with_api_key(service, upload_dir, None)
    }

    pub fn with_api_key(
        service: WordService,
        upload_dir: impl Into<PathBuf>,
        api_key: Option<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            service,
            upload_dir: upload_dir.into(),
            api_key,
        })
    }
}

/// Build the Axum router with all routes and layers.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use vocab_server::i18n::LanguageBindings;
/// use vocab_server::service::WordService;
/// use vocab_server::store::MemoryWordStore;
/// use vocab_server::translation::GoogleTranslator;
/// use vocab_server::{build_app, AppState};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let translator = GoogleTranslator::new(
///         reqwest::Client::new(),
///         vocab_server::config::DEFAULT_TRANSLATE_API_URL,
///     );
///     let service = WordService::new(
///         Arc::new(translator),
///         Arc::new(MemoryWordStore::new()),
///         LanguageBindings::default(),
///     );
///     let app = build_app(AppState::new(service, "uploads"));
///     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
///     axum::serve(listener, app).await?;
///     Ok(())
/// }
/// ```
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/words", get(routes::list_words).post(routes::create_word))
        .route(
            "/words/:id",
            get(routes::get_word)
                .put(routes::update_word)
                .delete(routes::delete_word),
        )
        .route("/search", get(routes::search_words))
        .route(
            "/upload-csv",
            post(routes::upload_csv).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security::require_api_key,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
