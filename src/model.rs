//! Records, drafts and the JSON shapes of the HTTP API.

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use uuid::Uuid;

use crate::i18n::CanonicalField;
use crate::translation::MetricsReport;

/// Maximum page size accepted by list and search.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A stored vocabulary entry.
///
/// The id serializes as `_id`, the shape the web frontend expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub word: String,
    pub word2: String,
    pub word3: String,
    #[serde(default)]
    pub translations: BTreeMap<String, String>,
}

impl WordRecord {
    pub fn field(&self, field: CanonicalField) -> &str {
        match field {
            CanonicalField::Word => &self.word,
            CanonicalField::Word2 => &self.word2,
            CanonicalField::Word3 => &self.word3,
        }
    }

    /// Case-insensitive substring match over the canonical fields and all
    /// translation values. `needle` must already be lowercase.
    pub fn matches_keyword(&self, needle: &str) -> bool {
        CanonicalField::ALL
            .iter()
            .map(|f| self.field(*f))
            .chain(self.translations.values().map(String::as_str))
            .any(|value| value.to_lowercase().contains(needle))
    }
}

/// A record under construction: what the client sent plus whatever the
/// completion engine has filled in so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordDraft {
    pub word: String,
    pub word2: String,
    pub word3: String,
    pub translations: BTreeMap<String, String>,
}

impl WordDraft {
    pub fn get(&self, field: CanonicalField) -> &str {
        match field {
            CanonicalField::Word => &self.word,
            CanonicalField::Word2 => &self.word2,
            CanonicalField::Word3 => &self.word3,
        }
    }

    pub fn set(&mut self, field: CanonicalField, value: String) {
        match field {
            CanonicalField::Word => self.word = value,
            CanonicalField::Word2 => self.word2 = value,
            CanonicalField::Word3 => self.word3 = value,
        }
    }

    pub fn is_present(&self, field: CanonicalField) -> bool {
        !self.get(field).trim().is_empty()
    }

    /// Canonical fields that are still empty.
    pub fn missing_fields(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .filter(|f| !self.is_present(*f))
            .collect()
    }

    pub fn into_record(self, id: Uuid) -> WordRecord {
        WordRecord {
            id,
            word: self.word,
            word2: self.word2,
            word3: self.word3,
            translations: self.translations,
        }
    }
}

/// Submitted translations, kept as ordered `(language, text)` pairs.
///
/// A JSON object is read key by key without collapsing repeated keys, so a
/// payload like `{"de": "Katze", "de": "Kater"}` still shows the duplicate.
/// A list of `[language, text]` pairs is accepted as well.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationPairs(pub Vec<(String, String)>);

impl TranslationPairs {
    /// Collapse into a map, failing with the first repeated language code.
    pub fn into_map(self) -> Result<BTreeMap<String, String>, String> {
        let mut seen = HashSet::new();
        for (language, _) in &self.0 {
            if !seen.insert(language.as_str()) {
                return Err(language.clone());
            }
        }
        Ok(self.0.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for TranslationPairs {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = TranslationPairs;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object or a list of [language, text] pairs")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut pairs = Vec::new();
                while let Some((language, text)) = map.next_entry::<String, Option<String>>()? {
                    pairs.push((language, text.unwrap_or_default()));
                }
                Ok(TranslationPairs(pairs))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut pairs = Vec::new();
                while let Some((language, text)) = seq.next_element::<(String, Option<String>)>()? {
                    pairs.push((language, text.unwrap_or_default()));
                }
                Ok(TranslationPairs(pairs))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(TranslationPairs::default())
            }
        }

        deserializer.deserialize_any(PairsVisitor)
    }
}

/// Body of `POST /words` and `PUT /words/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WordPayload {
    #[serde(default)]
    pub word: Option<String>,
    #[serde(default)]
    pub word2: Option<String>,
    #[serde(default)]
    pub word3: Option<String>,
    #[serde(default)]
    pub translations: Option<TranslationPairs>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Word,
    Word2,
    Word3,
}

impl SortKey {
    pub fn field(&self) -> CanonicalField {
        match self {
            Self::Word => CanonicalField::Word,
            Self::Word2 => CanonicalField::Word2,
            Self::Word3 => CanonicalField::Word3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

/// Query string of `GET /words`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub sort_key: SortKey,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            sort_key: SortKey::default(),
            sort_order: SortOrder::default(),
        }
    }
}

/// Query string of `GET /search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Normalized page/limit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// Clamp `page` to at least 1 and `limit` to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit))
    }
}

/// One page of records with paging metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordPage {
    pub words: Vec<WordRecord>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u32,
}

/// One CSV line of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvRow {
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub word2: String,
    #[serde(default)]
    pub word3: String,
}

/// Response of `POST /upload-csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub results: Vec<CsvRow>,
}

/// Plain `{ "message": ... }` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body; `translations` carries partial work when there is any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<BTreeMap<String, String>>,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translator: Option<MetricsReport>,
}
