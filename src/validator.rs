//! Linguistic validation of canonical fields.
//!
//! A word is accepted only if the provider, asked to read it as the declared
//! language, recognizes it as that language and neither corrects it nor
//! suggests another spelling. An unavailable provider means "not valid".

use tracing::{debug, info};

use crate::i18n::{CanonicalField, LanguageBindings};
use crate::model::WordDraft;
use crate::translation::{DetectionOutcome, Translator};

/// Check one word against its declared language.
pub async fn is_valid(translator: &dyn Translator, text: &str, language: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }

    match translator.detect(text, language).await {
        DetectionOutcome::Detected(detection) => {
            let valid = detection.is_plausible_for(language);
            if !valid {
                info!(
                    "Rejected '{}' as {}: detected={} auto_corrected={} did_you_mean={}",
                    text,
                    language,
                    detection.language,
                    detection.auto_corrected,
                    detection.did_you_mean
                );
            }
            valid
        }
        DetectionOutcome::Unavailable => {
            debug!("No detection for '{}' ({}), treating as invalid", text, language);
            false
        }
    }
}

/// Validate every non-empty canonical field of `draft`, in field order,
/// returning the fields that failed.
///
/// Empty fields are not sent to the provider; they are reported later as
/// untranslatable rather than incorrect.
pub async fn invalid_fields(
    translator: &dyn Translator,
    languages: &LanguageBindings,
    draft: &WordDraft,
) -> Vec<CanonicalField> {
    let mut invalid = Vec::new();
    for field in CanonicalField::ALL {
        if !draft.is_present(field) {
            continue;
        }
        if !is_valid(translator, draft.get(field), languages.code(field)).await {
            invalid.push(field);
        }
    }
    invalid
}
