use anyhow::{bail, Context, Result};

use crate::i18n::LanguageBindings;

pub const DEFAULT_TRANSLATE_API_URL: &str = "https://translate.googleapis.com/translate_a/single";

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,

    // Storage (in-memory when unset)
    pub database_url: Option<String>,

    // Translation provider
    pub translate_api_url: String,
    pub languages: LanguageBindings,

    // CSV uploads
    pub upload_dir: String,

    // Optional shared secret for write endpoints
    pub api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got '{}'", v))?,
            Err(_) => 3000,
        };

        let languages = match std::env::var("CANONICAL_LANGUAGES") {
            Ok(v) => LanguageBindings::parse(&v).context("Invalid CANONICAL_LANGUAGES")?,
            Err(_) => LanguageBindings::default(),
        };

        let translate_api_url = std::env::var("TRANSLATE_API_URL")
            .unwrap_or_else(|_| DEFAULT_TRANSLATE_API_URL.to_string());
        if translate_api_url.trim().is_empty() {
            bail!("TRANSLATE_API_URL must not be empty");
        }

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,

            database_url: non_empty_var("DATABASE_URL"),

            translate_api_url,
            languages,

            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),

            api_key: non_empty_var("API_KEY"),
        })
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
