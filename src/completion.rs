//! Vocabulary completion engine.
//!
//! Fills empty canonical fields from whichever siblings are present, then
//! fills empty extra-language translations from the pivot field (`word`).
//! Rules, each applied only when the target is empty and the source is not:
//!
//! 1. `word`  from `word2`, then from `word3`
//! 2. `word2` from `word`,  then from `word3`
//! 3. `word3` from `word`,  then from `word2`
//! 4. every empty translation from `word`
//!
//! Completion never fails. A field the provider could not translate simply
//! stays empty, and nothing can be derived when all three fields are empty.

use tracing::debug;

use crate::i18n::{CanonicalField, LanguageBindings};
use crate::model::WordDraft;
use crate::translation::{TranslationOutcome, Translator};

/// Run the whole engine: canonical fields, then translations.
pub async fn complete(
    translator: &dyn Translator,
    languages: &LanguageBindings,
    draft: WordDraft,
) -> WordDraft {
    let draft = complete_canonical(translator, languages, draft).await;
    fill_translations(translator, draft).await
}

/// Derive missing canonical fields in the fixed fallback order.
pub async fn complete_canonical(
    translator: &dyn Translator,
    languages: &LanguageBindings,
    mut draft: WordDraft,
) -> WordDraft {
    for target in CanonicalField::ALL {
        for source in target.fallback_sources() {
            if draft.is_present(target) {
                break;
            }
            if !draft.is_present(source) {
                continue;
            }

            let code = languages.code(target);
            if let TranslationOutcome::Translated(text) =
                translator.translate(draft.get(source), code).await
            {
                debug!("Derived {} ({}) from {}: '{}'", target, code, source, text);
                draft.set(target, text);
            }
        }
    }

    draft
}

/// Translate `word` into every extra language whose value is still empty.
pub async fn fill_translations(translator: &dyn Translator, mut draft: WordDraft) -> WordDraft {
    if !draft.is_present(CanonicalField::Word) {
        return draft;
    }

    let pending: Vec<String> = draft
        .translations
        .iter()
        .filter(|(_, text)| text.trim().is_empty())
        .map(|(language, _)| language.clone())
        .collect();

    for language in pending {
        if let TranslationOutcome::Translated(text) =
            translator.translate(&draft.word, &language).await
        {
            draft.translations.insert(language, text);
        }
    }

    draft
}
