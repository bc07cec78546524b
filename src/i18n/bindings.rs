//! Canonical field to language code mapping.

use anyhow::{bail, Result};
use std::fmt;

/// One of the three canonical spellings every record must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    /// `word`, the pivot field (English by default)
    Word,
    /// `word2` (French by default)
    Word2,
    /// `word3` (Vietnamese by default)
    Word3,
}

impl CanonicalField {
    /// All canonical fields in validation order.
    pub const ALL: [CanonicalField; 3] = [Self::Word, Self::Word2, Self::Word3];

    /// JSON / column name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Word2 => "word2",
            Self::Word3 => "word3",
        }
    }

    /// Sources to derive this field from, in fallback order.
    ///
    /// The pivot field is always preferred once it is known.
    pub fn fallback_sources(&self) -> [CanonicalField; 2] {
        match self {
            Self::Word => [Self::Word2, Self::Word3],
            Self::Word2 => [Self::Word, Self::Word3],
            Self::Word3 => [Self::Word, Self::Word2],
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Word => 0,
            Self::Word2 => 1,
            Self::Word3 => 2,
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Language code bound to each canonical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageBindings {
    codes: [String; 3],
}

impl LanguageBindings {
    /// Build bindings from explicit codes for `word`, `word2` and `word3`.
    pub fn new(word: &str, word2: &str, word3: &str) -> Result<Self> {
        let codes = [word, word2, word3].map(|c| c.trim().to_string());

        if let Some(field) = CanonicalField::ALL
            .iter()
            .find(|f| codes[f.index()].is_empty())
        {
            bail!("Language code for '{}' must not be empty", field.name());
        }

        Ok(Self { codes })
    }

    /// Parse a comma-separated list such as `"en,fr,vi"`.
    pub fn parse(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            bail!(
                "Expected exactly 3 comma-separated language codes, got {}: '{}'",
                parts.len(),
                value
            );
        }
        Self::new(parts[0], parts[1], parts[2])
    }

    /// Language code bound to `field`.
    pub fn code(&self, field: CanonicalField) -> &str {
        &self.codes[field.index()]
    }

    /// Codes in `word`, `word2`, `word3` order.
    pub fn codes(&self) -> [&str; 3] {
        [&self.codes[0], &self.codes[1], &self.codes[2]]
    }
}

impl Default for LanguageBindings {
    fn default() -> Self {
        Self {
            codes: ["en".to_string(), "fr".to_string(), "vi".to_string()],
        }
    }
}
