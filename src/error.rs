//! Error taxonomy of the record service.

use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

use crate::i18n::CanonicalField;

#[derive(Debug, Error)]
pub enum WordError {
    /// The submitted translations repeat a language code.
    #[error("Duplicate language entry: {0}")]
    DuplicateLanguage(String),

    /// At least one canonical field failed linguistic validation.
    #[error("One or more words are incorrect: {}", field_list(.fields))]
    IncorrectWord { fields: Vec<CanonicalField> },

    /// Completion left a canonical field empty.
    #[error("Unable to translate required fields: {}", field_list(.missing))]
    UnableToTranslate {
        missing: Vec<CanonicalField>,
        translations: BTreeMap<String, String>,
    },

    #[error("Word not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid CSV file: {0}")]
    InvalidCsv(#[from] csv::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Upload error: {0}")]
    Upload(String),
}

impl WordError {
    /// True for failures caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateLanguage(_)
                | Self::IncorrectWord { .. }
                | Self::UnableToTranslate { .. }
                | Self::NotFound(_)
                | Self::InvalidCsv(_)
        )
    }
}

fn field_list(fields: &[CanonicalField]) -> String {
    fields
        .iter()
        .map(CanonicalField::name)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type WordResult<T> = std::result::Result<T, WordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_language_message() {
        let err = WordError::DuplicateLanguage("de".to_string());
        assert_eq!(err.to_string(), "Duplicate language entry: de");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_incorrect_word_lists_fields() {
        let err = WordError::IncorrectWord {
            fields: vec![CanonicalField::Word, CanonicalField::Word3],
        };
        assert_eq!(
            err.to_string(),
            "One or more words are incorrect: word, word3"
        );
    }

    #[test]
    fn test_unable_to_translate_lists_missing() {
        let err = WordError::UnableToTranslate {
            missing: vec![CanonicalField::Word2],
            translations: BTreeMap::new(),
        };
        assert!(err.to_string().contains("word2"));
    }

    #[test]
    fn test_storage_is_not_client_error() {
        let err = WordError::Storage(sqlx::Error::PoolTimedOut);
        assert!(!err.is_client_error());
        assert!(!WordError::Upload("disk full".to_string()).is_client_error());
    }
}
