//! Scripted translator for unit tests.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{Detection, DetectionOutcome, TranslationOutcome, Translator};

/// Answers only what it was told to; everything else is unavailable.
/// Every call is recorded as `translate:<text>-><target>` or
/// `detect:<text>@<language>`.
#[derive(Default)]
pub(crate) struct FakeTranslator {
    translations: HashMap<(String, String), String>,
    detections: HashMap<(String, String), Detection>,
    calls: Mutex<Vec<String>>,
}

impl FakeTranslator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_translation(mut self, text: &str, target: &str, result: &str) -> Self {
        self.translations
            .insert((text.to_string(), target.to_string()), result.to_string());
        self
    }

    /// Make `text` validate cleanly as `language`.
    pub(crate) fn with_valid_word(self, text: &str, language: &str) -> Self {
        self.with_detection(text, language, Detection::clean(language))
    }

    pub(crate) fn with_detection(mut self, text: &str, language: &str, detection: Detection) -> Self {
        self.detections
            .insert((text.to_string(), language.to_string()), detection);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn translate_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("translate:"))
            .collect()
    }
}

impl Translator for FakeTranslator {
    fn translate<'a>(
        &'a self,
        text: &'a str,
        target: &'a str,
    ) -> BoxFuture<'a, TranslationOutcome> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("translate:{}->{}", text, target));
        let outcome = match self.translations.get(&(text.to_string(), target.to_string())) {
            Some(result) => TranslationOutcome::Translated(result.clone()),
            None => TranslationOutcome::Unavailable,
        };
        async move { outcome }.boxed()
    }

    fn detect<'a>(
        &'a self,
        text: &'a str,
        expected_source: &'a str,
    ) -> BoxFuture<'a, DetectionOutcome> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("detect:{}@{}", text, expected_source));
        let outcome = match self
            .detections
            .get(&(text.to_string(), expected_source.to_string()))
        {
            Some(detection) => DetectionOutcome::Detected(detection.clone()),
            None => DetectionOutcome::Unavailable,
        };
        async move { outcome }.boxed()
    }
}
