use anyhow::{Context, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    Detection, DetectionOutcome, GatewayMetrics, MetricsReport, TranslationOutcome, Translator,
};

/// Target language used for detection round trips.
const ROUND_TRIP_TARGET: &str = "en";

/// Gateway to the public Google Translate `translate_a/single` endpoint.
pub struct GoogleTranslator {
    client: reqwest::Client,
    api_url: String,
    metrics: GatewayMetrics,
}

impl GoogleTranslator {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            metrics: GatewayMetrics::new(),
        }
    }

    /// Send one request and return the raw JSON body.
    async fn fetch(&self, text: &str, source: &str, target: &str) -> Result<Value> {
        self.metrics.record_api_call();

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("dt", "ld"),
                ("dt", "qca"),
                ("ie", "UTF-8"),
                ("oe", "UTF-8"),
                ("q", text),
            ])
            .send()
            .await
            .context("Failed to send request to translation provider")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            anyhow::bail!("Translation provider error ({}): {}", status, body);
        }

        response
            .json::<Value>()
            .await
            .context("Failed to parse translation provider response")
    }

    async fn translate_text(&self, text: &str, target: &str) -> TranslationOutcome {
        if text.trim().is_empty() {
            return TranslationOutcome::Unavailable;
        }

        debug!("Translating '{}' to {}", text, target);
        let body = match self.fetch(text, "auto", target).await {
            Ok(body) => body,
            Err(e) => {
                self.metrics.record_api_failure();
                warn!("Translation of '{}' to {} failed: {:#}", text, target, e);
                return TranslationOutcome::Unavailable;
            }
        };

        match parse_translation(&body) {
            Some(translated) => TranslationOutcome::Translated(translated),
            None => {
                self.metrics.record_api_failure();
                warn!("Translation provider returned no text for '{}' ({})", text, target);
                TranslationOutcome::Unavailable
            }
        }
    }

    async fn detect_text(&self, text: &str, expected_source: &str) -> DetectionOutcome {
        if text.trim().is_empty() {
            return DetectionOutcome::Unavailable;
        }

        debug!("Checking '{}' as {}", text, expected_source);
        let body = match self.fetch(text, expected_source, ROUND_TRIP_TARGET).await {
            Ok(body) => body,
            Err(e) => {
                self.metrics.record_api_failure();
                warn!(
                    "Detection of '{}' ({}) failed: {:#}",
                    text, expected_source, e
                );
                return DetectionOutcome::Unavailable;
            }
        };

        match parse_detection(&body) {
            Some(detection) => DetectionOutcome::Detected(detection),
            None => {
                self.metrics.record_api_failure();
                warn!(
                    "Translation provider returned no detection for '{}' ({})",
                    text, expected_source
                );
                DetectionOutcome::Unavailable
            }
        }
    }
}

impl Translator for GoogleTranslator {
    fn translate<'a>(
        &'a self,
        text: &'a str,
        target: &'a str,
    ) -> BoxFuture<'a, TranslationOutcome> {
        self.translate_text(text, target).boxed()
    }

    fn detect<'a>(
        &'a self,
        text: &'a str,
        expected_source: &'a str,
    ) -> BoxFuture<'a, DetectionOutcome> {
        self.detect_text(text, expected_source).boxed()
    }

    fn metrics(&self) -> Option<MetricsReport> {
        Some(self.metrics.report())
    }
}

/// Concatenate the translated segments found in `body[0][i][0]`.
fn parse_translation(body: &Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Read the detected language (`body[2]`, overridden by the confident
/// language in `body[8][0][0]`) and the correction block (`body[7]`).
fn parse_detection(body: &Value) -> Option<Detection> {
    let mut language = body.get(2)?.as_str()?.to_string();

    let confident = body
        .get(8)
        .and_then(|v| v.get(0))
        .and_then(|v| v.get(0))
        .and_then(Value::as_str);
    if let Some(confident) = confident {
        if confident != language {
            language = confident.to_string();
        }
    }

    let (auto_corrected, did_you_mean) = match body.get(7) {
        Some(correction)
            if correction
                .get(0)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty()) =>
        {
            if correction.get(5).and_then(Value::as_bool) == Some(true) {
                (true, false)
            } else {
                (false, true)
            }
        }
        _ => (false, false),
    };

    Some(Detection {
        language,
        auto_corrected,
        did_you_mean,
    })
}
