//! Translation gateway.
//!
//! Wraps the external translation provider behind the [`Translator`] trait.
//! Translation is best-effort: provider errors never cross this boundary,
//! they come back as [`TranslationOutcome::Unavailable`] or
//! [`DetectionOutcome::Unavailable`] and callers decide what that means.

mod google;
mod metrics;

#[cfg(test)]
pub(crate) mod fake;

pub use google::GoogleTranslator;
pub use metrics::{GatewayMetrics, MetricsReport};

use futures::future::BoxFuture;

/// Result of translating a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// The provider returned a non-empty translation.
    Translated(String),
    /// The provider failed or returned nothing.
    Unavailable,
}

/// What the provider reported about the source text of a round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Language code the provider believes the text is in
    pub language: String,
    /// The provider silently corrected the spelling
    pub auto_corrected: bool,
    /// The provider suggested an alternate spelling
    pub did_you_mean: bool,
}

impl Detection {
    /// A detection for a correctly spelled word in `language`.
    pub fn clean(language: &str) -> Self {
        Self {
            language: language.to_string(),
            auto_corrected: false,
            did_you_mean: false,
        }
    }

    /// True when the text was recognized as `language` with no correction
    /// and no alternate spelling. Each condition alone is disqualifying.
    pub fn is_plausible_for(&self, language: &str) -> bool {
        self.language.eq_ignore_ascii_case(language) && !self.auto_corrected && !self.did_you_mean
    }
}

/// Result of a detection round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionOutcome {
    Detected(Detection),
    Unavailable,
}

/// Boundary to the external translation provider.
pub trait Translator: Send + Sync {
    /// Translate `text` into `target` (language code), source auto-detected.
    fn translate<'a>(&'a self, text: &'a str, target: &'a str)
        -> BoxFuture<'a, TranslationOutcome>;

    /// Round-trip `text` declared as `expected_source` and report what the
    /// provider detected and corrected.
    fn detect<'a>(
        &'a self,
        text: &'a str,
        expected_source: &'a str,
    ) -> BoxFuture<'a, DetectionOutcome>;

    /// Call counters, if the implementation keeps any.
    fn metrics(&self) -> Option<MetricsReport> {
        None
    }
}
