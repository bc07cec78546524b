use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Sort, WordStore};
use crate::error::WordResult;
use crate::model::{CsvRow, Pagination, SortOrder, WordRecord};

/// In-process store keeping records in insertion order.
#[derive(Clone, Default)]
pub struct MemoryWordStore {
    records: Arc<RwLock<Vec<WordRecord>>>,
}

impl MemoryWordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `records`.
    pub fn with_records(records: Vec<WordRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Copy of every record, in insertion order.
    pub async fn snapshot(&self) -> Vec<WordRecord> {
        self.records.read().await.clone()
    }
}

fn page(records: Vec<WordRecord>, pagination: Pagination) -> Vec<WordRecord> {
    records
        .into_iter()
        .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
        .take(pagination.limit as usize)
        .collect()
}

impl WordStore for MemoryWordStore {
    fn list(
        &self,
        sort: Sort,
        pagination: Pagination,
    ) -> BoxFuture<'_, WordResult<Vec<WordRecord>>> {
        async move {
            let mut records = self.records.read().await.clone();
            let field = sort.key.field();
            records.sort_by(|a, b| {
                let ordering = a.field(field).cmp(b.field(field));
                match sort.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
            Ok(page(records, pagination))
        }
        .boxed()
    }

    fn count(&self) -> BoxFuture<'_, WordResult<u64>> {
        async move { Ok(self.records.read().await.len() as u64) }.boxed()
    }

    fn get(&self, id: Uuid) -> BoxFuture<'_, WordResult<Option<WordRecord>>> {
        async move {
            let records = self.records.read().await;
            Ok(records.iter().find(|r| r.id == id).cloned())
        }
        .boxed()
    }

    fn insert(&self, record: WordRecord) -> BoxFuture<'_, WordResult<WordRecord>> {
        async move {
            self.records.write().await.push(record.clone());
            Ok(record)
        }
        .boxed()
    }

    fn replace(&self, record: WordRecord) -> BoxFuture<'_, WordResult<Option<WordRecord>>> {
        async move {
            let mut records = self.records.write().await;
            match records.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => {
                    *existing = record.clone();
                    Ok(Some(record))
                }
                None => Ok(None),
            }
        }
        .boxed()
    }

    fn delete(&self, id: Uuid) -> BoxFuture<'_, WordResult<bool>> {
        async move {
            let mut records = self.records.write().await;
            let before = records.len();
            records.retain(|r| r.id != id);
            Ok(records.len() < before)
        }
        .boxed()
    }

    fn search<'a>(
        &'a self,
        keyword: &'a str,
        pagination: Pagination,
    ) -> BoxFuture<'a, WordResult<Vec<WordRecord>>> {
        async move {
            let needle = keyword.to_lowercase();
            let mut matching: Vec<WordRecord> = self
                .records
                .read()
                .await
                .iter()
                .filter(|r| r.matches_keyword(&needle))
                .cloned()
                .collect();
            matching.sort_by(|a, b| a.word.cmp(&b.word));
            Ok(page(matching, pagination))
        }
        .boxed()
    }

    fn count_matching<'a>(&'a self, keyword: &'a str) -> BoxFuture<'a, WordResult<u64>> {
        async move {
            let needle = keyword.to_lowercase();
            let records = self.records.read().await;
            Ok(records.iter().filter(|r| r.matches_keyword(&needle)).count() as u64)
        }
        .boxed()
    }

    fn upsert_by_word(&self, rows: Vec<CsvRow>) -> BoxFuture<'_, WordResult<usize>> {
        async move {
            let mut records = self.records.write().await;
            let applied = rows.len();
            for row in rows {
                match records.iter_mut().find(|r| r.word == row.word) {
                    Some(existing) => {
                        existing.word2 = row.word2;
                        existing.word3 = row.word3;
                    }
                    None => records.push(WordRecord {
                        id: Uuid::new_v4(),
                        word: row.word,
                        word2: row.word2,
                        word3: row.word3,
                        translations: BTreeMap::new(),
                    }),
                }
            }
            Ok(applied)
        }
        .boxed()
    }
}
