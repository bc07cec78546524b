//! Record service: the create/update pipeline and the read paths.
//!
//! Create and update run the same steps in order, and stop at the first
//! failure without writing anything:
//!
//! 1. reject repeated language codes in the submitted translations
//! 2. derive missing canonical fields
//! 3. validate each non-empty canonical field in its language
//! 4. translate remaining empty translations from the validated `word`
//! 5. reject if any canonical field is still empty
//! 6. persist
//!
//! Delete skips all of it and always succeeds.

use std::io::Read;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::completion::{complete_canonical, fill_translations};
use crate::error::{WordError, WordResult};
use crate::i18n::LanguageBindings;
use crate::model::{
    CsvRow, ListQuery, Pagination, SearchQuery, WordDraft, WordPage, WordPayload, WordRecord,
};
use crate::store::{Sort, WordStore};
use crate::translation::Translator;
use crate::validator::invalid_fields;

#[derive(Clone)]
pub struct WordService {
    translator: Arc<dyn Translator>,
    store: Arc<dyn WordStore>,
    languages: LanguageBindings,
}

impl WordService {
    pub fn new(
        translator: Arc<dyn Translator>,
        store: Arc<dyn WordStore>,
        languages: LanguageBindings,
    ) -> Self {
        Self {
            translator,
            store,
            languages,
        }
    }

    pub fn translator(&self) -> &dyn Translator {
        self.translator.as_ref()
    }

    pub async fn create(&self, payload: WordPayload) -> WordResult<WordRecord> {
        let draft = self.prepare(payload).await?;
        let record = self.store.insert(draft.into_record(Uuid::new_v4())).await?;
        info!("Created word {} ('{}')", record.id, record.word);
        Ok(record)
    }

    /// Re-run the pipeline on `payload` and overwrite the record's fields.
    pub async fn update(&self, id: Uuid, payload: WordPayload) -> WordResult<WordRecord> {
        if self.store.get(id).await?.is_none() {
            return Err(WordError::NotFound(id));
        }

        let draft = self.prepare(payload).await?;
        let record = self
            .store
            .replace(draft.into_record(id))
            .await?
            .ok_or(WordError::NotFound(id))?;
        info!("Updated word {} ('{}')", record.id, record.word);
        Ok(record)
    }

    /// Remove a record. Deleting an unknown id is not an error.
    pub async fn delete(&self, id: Uuid) -> WordResult<()> {
        if self.store.delete(id).await? {
            info!("Deleted word {}", id);
        } else {
            info!("Delete of unknown word {} ignored", id);
        }
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> WordResult<WordRecord> {
        self.store.get(id).await?.ok_or(WordError::NotFound(id))
    }

    pub async fn list(&self, query: ListQuery) -> WordResult<WordPage> {
        let pagination = Pagination::new(query.page, query.limit);
        let sort = Sort {
            key: query.sort_key,
            order: query.sort_order,
        };

        let words = self.store.list(sort, pagination).await?;
        let total = self.store.count().await?;

        Ok(WordPage {
            words,
            total,
            total_pages: pagination.total_pages(total),
            current_page: pagination.page,
        })
    }

    pub async fn search(&self, query: SearchQuery) -> WordResult<WordPage> {
        let pagination = Pagination::new(query.page, query.limit);
        let keyword = query.keyword.trim();

        let words = self.store.search(keyword, pagination).await?;
        let total = self.store.count_matching(keyword).await?;

        Ok(WordPage {
            words,
            total,
            total_pages: pagination.total_pages(total),
            current_page: pagination.page,
        })
    }

    /// Bulk import `word,word2,word3` CSV rows without translation or
    /// validation. Parsing runs on the blocking pool.
    pub async fn import_csv<R>(&self, reader: R) -> WordResult<Vec<CsvRow>>
    where
        R: Read + Send + 'static,
    {
        let rows = tokio::task::spawn_blocking(move || parse_csv(reader))
            .await
            .map_err(|e| WordError::Upload(format!("CSV parsing task failed: {}", e)))??;
        self.import_rows(rows).await
    }

    /// Upsert already parsed rows by `word`. Rows with an empty `word` cannot
    /// be keyed and are skipped. Returns every row, skipped ones included.
    pub async fn import_rows(&self, rows: Vec<CsvRow>) -> WordResult<Vec<CsvRow>> {
        let (keyed, unkeyed): (Vec<CsvRow>, Vec<CsvRow>) =
            rows.iter().cloned().partition(|r| !r.word.trim().is_empty());
        if !unkeyed.is_empty() {
            warn!("Skipping {} CSV rows without a word", unkeyed.len());
        }

        let applied = if keyed.is_empty() {
            0
        } else {
            self.store.upsert_by_word(keyed).await?
        };
        info!("Imported {} CSV rows", applied);

        Ok(rows)
    }

    /// Steps 1 to 5 of the pipeline.
    async fn prepare(&self, payload: WordPayload) -> WordResult<WordDraft> {
        let translations = payload
            .translations
            .unwrap_or_default()
            .into_map()
            .map_err(WordError::DuplicateLanguage)?;

        let draft = WordDraft {
            word: clean(payload.word),
            word2: clean(payload.word2),
            word3: clean(payload.word3),
            translations,
        };

        let draft = complete_canonical(self.translator(), &self.languages, draft).await;

        let invalid = invalid_fields(self.translator(), &self.languages, &draft).await;
        if !invalid.is_empty() {
            return Err(WordError::IncorrectWord { fields: invalid });
        }

        let draft = fill_translations(self.translator(), draft).await;

        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return Err(WordError::UnableToTranslate {
                missing,
                translations: draft.translations,
            });
        }

        Ok(draft)
    }
}

fn clean(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Parse `word,word2,word3` rows. Blocking when `reader` is a file.
pub fn parse_csv<R: Read>(reader: R) -> WordResult<Vec<CsvRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in csv_reader.deserialize::<CsvRow>() {
        rows.push(result?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::CanonicalField;
    use crate::model::TranslationPairs;
    use crate::store::MemoryWordStore;
    use crate::translation::fake::FakeTranslator;
    use crate::translation::Detection;
    use std::collections::BTreeMap;

    fn service(translator: FakeTranslator) -> (WordService, Arc<FakeTranslator>, MemoryWordStore) {
        let translator = Arc::new(translator);
        let store = MemoryWordStore::new();
        let service = WordService::new(
            translator.clone(),
            Arc::new(store.clone()),
            LanguageBindings::default(),
        );
        (service, translator, store)
    }

    fn payload(word: &str, word2: &str, word3: &str) -> WordPayload {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        WordPayload {
            word: opt(word),
            word2: opt(word2),
            word3: opt(word3),
            translations: None,
        }
    }

    fn cat_translator() -> FakeTranslator {
        FakeTranslator::new()
            .with_valid_word("cat", "en")
            .with_valid_word("chat", "fr")
            .with_valid_word("mèo", "vi")
    }

    // ==================== Create Tests ====================

    #[tokio::test]
    async fn test_create_complete_record_is_stored_verbatim() {
        let (service, translator, store) = service(cat_translator());

        let record = service
            .create(payload("cat", "chat", "mèo"))
            .await
            .expect("should create");

        assert_eq!(record.word, "cat");
        assert_eq!(record.word2, "chat");
        assert_eq!(record.word3, "mèo");
        assert!(translator.translate_calls().is_empty());
        assert_eq!(store.snapshot().await, vec![record]);
    }

    #[tokio::test]
    async fn test_create_derives_word_from_word2() {
        let (service, _, _) = service(cat_translator().with_translation("chat", "en", "cat"));

        let record = service
            .create(payload("", "chat", "mèo"))
            .await
            .expect("should create");

        assert_eq!(record.word, "cat");
    }

    #[tokio::test]
    async fn test_create_all_empty_is_unable_to_translate_without_calls() {
        let (service, translator, store) = service(cat_translator());

        let err = service.create(payload("", "", "")).await.unwrap_err();

        match err {
            WordError::UnableToTranslate { missing, .. } => {
                assert_eq!(missing, CanonicalField::ALL.to_vec())
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(translator.calls().is_empty());
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_duplicate_language_fails_before_any_call() {
        let (service, translator, store) = service(cat_translator());
        let mut input = payload("", "chat", "");
        input.translations = Some(TranslationPairs(vec![
            ("de".to_string(), String::new()),
            ("de".to_string(), "Katze".to_string()),
        ]));

        let err = service.create(input).await.unwrap_err();

        assert!(matches!(err, WordError::DuplicateLanguage(ref code) if code == "de"));
        assert!(translator.calls().is_empty());
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_incorrect_word_is_not_persisted() {
        let translator = FakeTranslator::new()
            .with_detection(
                "xyzzy123",
                "en",
                Detection {
                    did_you_mean: true,
                    ..Detection::clean("en")
                },
            )
            .with_translation("xyzzy123", "fr", "xyzzy123")
            .with_translation("xyzzy123", "vi", "xyzzy123");
        let (service, _, store) = service(translator);

        let err = service.create(payload("xyzzy123", "", "")).await.unwrap_err();

        match err {
            WordError::IncorrectWord { fields } => {
                assert!(fields.contains(&CanonicalField::Word));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_incorrect_word_skips_extra_translations() {
        let (service, translator, _) = service(FakeTranslator::new());
        let mut input = payload("cta", "chat", "mèo");
        input.translations = Some(TranslationPairs(vec![("de".to_string(), String::new())]));

        let err = service.create(input).await.unwrap_err();

        assert!(matches!(err, WordError::IncorrectWord { .. }));
        assert!(translator.translate_calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_missing_field_reports_partial_translations() {
        let translator = FakeTranslator::new()
            .with_valid_word("cat", "en")
            .with_translation("cat", "fr", "chat")
            .with_valid_word("chat", "fr")
            .with_translation("cat", "de", "Katze");
        let (service, _, store) = service(translator);
        let mut input = payload("cat", "", "");
        input.translations = Some(TranslationPairs(vec![("de".to_string(), String::new())]));

        let err = service.create(input).await.unwrap_err();

        match err {
            WordError::UnableToTranslate {
                missing,
                translations,
            } => {
                assert_eq!(missing, vec![CanonicalField::Word3]);
                assert_eq!(translations["de"], "Katze");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_fills_extra_translations_after_validation() {
        let translator = cat_translator().with_translation("cat", "de", "Katze");
        let (service, translator, _) = service(translator);
        let mut input = payload("cat", "chat", "mèo");
        input.translations = Some(TranslationPairs(vec![
            ("de".to_string(), String::new()),
            ("es".to_string(), "gato".to_string()),
        ]));

        let record = service.create(input).await.expect("should create");

        assert_eq!(record.translations["de"], "Katze");
        assert_eq!(record.translations["es"], "gato");
        assert_eq!(
            translator.calls(),
            vec![
                "detect:cat@en",
                "detect:chat@fr",
                "detect:mèo@vi",
                "translate:cat->de"
            ]
        );
    }

    #[tokio::test]
    async fn test_create_trims_input() {
        let (service, _, _) = service(cat_translator());

        let record = service
            .create(payload("  cat ", "chat\n", " mèo"))
            .await
            .expect("should create");

        assert_eq!(record.word, "cat");
        assert_eq!(record.word2, "chat");
        assert_eq!(record.word3, "mèo");
    }

    // ==================== Update Tests ====================

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let (service, _, store) = service(cat_translator().with_valid_word("chatte", "fr"));
        let created = service
            .create(payload("cat", "chat", "mèo"))
            .await
            .expect("create");

        let updated = service
            .update(created.id, payload("cat", "chatte", "mèo"))
            .await
            .expect("update");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.word2, "chatte");
        assert_eq!(store.snapshot().await, vec![updated]);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found_without_calls() {
        let (service, translator, _) = service(cat_translator());
        let id = Uuid::new_v4();

        let err = service
            .update(id, payload("cat", "chat", "mèo"))
            .await
            .unwrap_err();

        assert!(matches!(err, WordError::NotFound(missing) if missing == id));
        assert!(translator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_rejected_leaves_record_untouched() {
        let (service, _, store) = service(cat_translator());
        let created = service
            .create(payload("cat", "chat", "mèo"))
            .await
            .expect("create");

        let err = service
            .update(created.id, payload("cat", "chta", "mèo"))
            .await
            .unwrap_err();

        assert!(matches!(err, WordError::IncorrectWord { .. }));
        assert_eq!(store.snapshot().await, vec![created]);
    }

    #[tokio::test]
    async fn test_update_derives_missing_word() {
        let (service, translator, store) =
            service(cat_translator().with_translation("chat", "en", "cat"));
        let created = service
            .create(payload("cat", "chat", "mèo"))
            .await
            .expect("create");

        let updated = service
            .update(created.id, payload("", "chat", "mèo"))
            .await
            .expect("update");

        assert_eq!(updated.word, "cat");
        assert_eq!(
            translator.calls()[3..],
            [
                "translate:chat->en",
                "detect:cat@en",
                "detect:chat@fr",
                "detect:mèo@vi"
            ]
        );
        assert_eq!(store.snapshot().await, vec![updated]);
    }

    #[tokio::test]
    async fn test_update_duplicate_language_fails_before_any_call() {
        let (service, translator, store) = service(cat_translator());
        let created = service
            .create(payload("cat", "chat", "mèo"))
            .await
            .expect("create");
        let calls_after_create = translator.calls().len();
        let mut input = payload("cat", "chat", "mèo");
        input.translations = Some(TranslationPairs(vec![
            ("de".to_string(), String::new()),
            ("de".to_string(), "Katze".to_string()),
        ]));

        let err = service.update(created.id, input).await.unwrap_err();

        assert!(matches!(err, WordError::DuplicateLanguage(ref code) if code == "de"));
        assert_eq!(translator.calls().len(), calls_after_create);
        assert_eq!(store.snapshot().await, vec![created]);
    }

    #[tokio::test]
    async fn test_import_csv_accepts_owned_reader() {
        let (service, _, store) = service(FakeTranslator::new());
        let reader = std::io::Cursor::new(b"word,word2,word3\ncat,chat,meo\n".to_vec());

        let rows = service.import_csv(reader).await.expect("import");

        assert_eq!(rows.len(), 1);
        assert_eq!(store.snapshot().await[0].word, "cat");
    }

    #[tokio::test]
    async fn test_import_rows_skips_unkeyed_rows() {
        let (service, _, store) = service(FakeTranslator::new());
        let rows = vec![
            CsvRow {
                word: String::new(),
                word2: "chat".to_string(),
                word3: "mèo".to_string(),
            },
            CsvRow {
                word: "dog".to_string(),
                word2: "chien".to_string(),
                word3: "chó".to_string(),
            },
        ];

        let results = service.import_rows(rows.clone()).await.expect("import");

        assert_eq!(results, rows);
        assert_eq!(store.snapshot().await.len(), 1);
    }

    // ==================== Delete / Get Tests ====================

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (service, _, store) = service(cat_translator());
        let created = service
            .create(payload("cat", "chat", "mèo"))
            .await
            .expect("create");

        service.delete(created.id).await.expect("first delete");
        service.delete(created.id).await.expect("second delete");
        service.delete(Uuid::new_v4()).await.expect("unknown delete");

        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let (service, _, _) = service(cat_translator());
        let err = service.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, WordError::NotFound(_)));
    }

    // ==================== List / Search Tests ====================

    fn seeded_service() -> WordService {
        let records = ["apple", "banana", "cherry", "date", "elderberry"]
            .iter()
            .map(|w| WordRecord {
                id: Uuid::new_v4(),
                word: w.to_string(),
                word2: format!("{}-fr", w),
                word3: format!("{}-vi", w),
                translations: BTreeMap::new(),
            })
            .collect();
        WordService::new(
            Arc::new(FakeTranslator::new()),
            Arc::new(MemoryWordStore::with_records(records)),
            LanguageBindings::default(),
        )
    }

    #[tokio::test]
    async fn test_list_reports_paging_metadata() {
        let service = seeded_service();

        let page = service
            .list(ListQuery {
                page: 2,
                limit: 2,
                ..ListQuery::default()
            })
            .await
            .expect("list");

        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
        let words: Vec<&str> = page.words.iter().map(|r| r.word.as_str()).collect();
        assert_eq!(words, vec!["cherry", "date"]);
    }

    #[tokio::test]
    async fn test_search_counts_only_matches() {
        let service = seeded_service();

        let page = service
            .search(SearchQuery {
                keyword: "ERR".to_string(),
                page: 1,
                limit: 10,
            })
            .await
            .expect("search");

        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 1);
        let words: Vec<&str> = page.words.iter().map(|r| r.word.as_str()).collect();
        assert_eq!(words, vec!["cherry", "elderberry"]);
    }

    // ==================== CSV Import Tests ====================

    #[tokio::test]
    async fn test_import_csv_upserts_by_word() {
        let (service, translator, store) = service(FakeTranslator::new());
        let csv = "word,word2,word3\ncat,chat,mèo\ndog,chien,chó\ncat,chatte,con mèo\n";

        let rows = service.import_csv(csv.as_bytes()).await.expect("import");

        assert_eq!(rows.len(), 3);
        let records = store.snapshot().await;
        assert_eq!(records.len(), 2);
        let cat = records.iter().find(|r| r.word == "cat").expect("cat stored");
        assert_eq!(cat.word2, "chatte");
        assert_eq!(cat.word3, "con mèo");
        assert!(translator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_import_csv_skips_rows_without_word() {
        let (service, _, store) = service(FakeTranslator::new());
        let csv = "word,word2,word3\n,chat,mèo\ndog,chien,chó\n";

        let rows = service.import_csv(csv.as_bytes()).await.expect("import");

        assert_eq!(rows.len(), 2);
        assert_eq!(store.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn test_import_csv_tolerates_missing_columns() {
        let (service, _, store) = service(FakeTranslator::new());
        let csv = "word,word2\ncat,chat\n";

        service.import_csv(csv.as_bytes()).await.expect("import");

        let records = store.snapshot().await;
        assert_eq!(records[0].word2, "chat");
        assert_eq!(records[0].word3, "");
    }

    #[tokio::test]
    async fn test_import_csv_rejects_invalid_utf8() {
        let (service, _, _) = service(FakeTranslator::new());
        let bytes: &[u8] = b"word,word2,word3\n\xff\xfe,chat,meo\n";

        let err = service.import_csv(bytes).await.unwrap_err();

        assert!(matches!(err, WordError::InvalidCsv(_)));
    }
}
