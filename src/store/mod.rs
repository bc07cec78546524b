//! Document storage for word records.
//!
//! [`WordStore`] is the seam between the record service and persistence.
//! [`MemoryWordStore`] backs tests and database-less runs; the PostgreSQL
//! implementation lives in [`crate::db`].

mod memory;

pub use memory::MemoryWordStore;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::error::WordResult;
use crate::model::{CsvRow, Pagination, SortKey, SortOrder, WordRecord};

/// Ordering for list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub order: SortOrder,
}

pub trait WordStore: Send + Sync {
    /// One page of all records in `sort` order.
    fn list(&self, sort: Sort, pagination: Pagination)
        -> BoxFuture<'_, WordResult<Vec<WordRecord>>>;

    fn count(&self) -> BoxFuture<'_, WordResult<u64>>;

    fn get(&self, id: Uuid) -> BoxFuture<'_, WordResult<Option<WordRecord>>>;

    fn insert(&self, record: WordRecord) -> BoxFuture<'_, WordResult<WordRecord>>;

    /// Overwrite the record with the same id. `None` when it does not exist.
    fn replace(&self, record: WordRecord) -> BoxFuture<'_, WordResult<Option<WordRecord>>>;

    /// Remove by id; `false` when nothing was removed.
    fn delete(&self, id: Uuid) -> BoxFuture<'_, WordResult<bool>>;

    /// Records whose canonical fields or translation values contain
    /// `keyword`, case-insensitively.
    fn search<'a>(
        &'a self,
        keyword: &'a str,
        pagination: Pagination,
    ) -> BoxFuture<'a, WordResult<Vec<WordRecord>>>;

    fn count_matching<'a>(&'a self, keyword: &'a str) -> BoxFuture<'a, WordResult<u64>>;

    /// Apply rows in order, updating `word2`/`word3` of the first record with
    /// the same `word` or inserting a new one. Returns the rows applied.
    fn upsert_by_word(&self, rows: Vec<CsvRow>) -> BoxFuture<'_, WordResult<usize>>;
}
