use anyhow::{Context, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

use crate::error::WordResult;
use crate::model::{CsvRow, Pagination, SortKey, SortOrder, WordRecord};
use crate::store::{Sort, WordStore};

const WORD_COLUMNS: &str = "id, word, word2, word3, translations";

/// Predicate shared by search and its count; `$1` is the ILIKE pattern.
const KEYWORD_FILTER: &str = "word ILIKE $1 ESCAPE '\\'
    OR word2 ILIKE $1 ESCAPE '\\'
    OR word3 ILIKE $1 ESCAPE '\\'
    OR EXISTS (
        SELECT 1 FROM jsonb_each_text(translations) AS t(language, value)
        WHERE t.value ILIKE $1 ESCAPE '\\'
    )";

#[derive(Debug, FromRow)]
struct WordRow {
    id: Uuid,
    word: String,
    word2: String,
    word3: String,
    translations: Json<BTreeMap<String, String>>,
}

impl From<WordRow> for WordRecord {
    fn from(row: WordRow) -> Self {
        Self {
            id: row.id,
            word: row.word,
            word2: row.word2,
            word3: row.word3,
            translations: row.translations.0,
        }
    }
}

/// PostgreSQL-backed word store.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect and create the schema if needed.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        Self::run_migrations(&pool).await?;
        info!("✓ Database ready");

        Ok(Self { pool })
    }

    async fn run_migrations(pool: &PgPool) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS words (
                id UUID PRIMARY KEY,
                word TEXT NOT NULL,
                word2 TEXT NOT NULL,
                word3 TEXT NOT NULL,
                translations JSONB NOT NULL DEFAULT '{}'::jsonb
            )",
        )
        .execute(pool)
        .await
        .context("Failed to create words table")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS words_word_idx ON words (word)")
            .execute(pool)
            .await
            .context("Failed to create words index")?;

        Ok(())
    }

    async fn list_records(&self, sort: Sort, pagination: Pagination) -> WordResult<Vec<WordRecord>> {
        let sql = format!(
            "SELECT {} FROM words ORDER BY {} LIMIT $1 OFFSET $2",
            WORD_COLUMNS,
            order_clause(sort)
        );
        let rows: Vec<WordRow> = sqlx::query_as(&sql)
            .bind(i64::from(pagination.limit))
            .bind(offset_param(pagination))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(WordRecord::from).collect())
    }

    async fn count_records(&self) -> WordResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn get_record(&self, id: Uuid) -> WordResult<Option<WordRecord>> {
        let sql = format!("SELECT {} FROM words WHERE id = $1", WORD_COLUMNS);
        let row: Option<WordRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(WordRecord::from))
    }

    async fn insert_record(&self, record: WordRecord) -> WordResult<WordRecord> {
        sqlx::query(
            "INSERT INTO words (id, word, word2, word3, translations)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(record.id)
        .bind(&record.word)
        .bind(&record.word2)
        .bind(&record.word3)
        .bind(Json(record.translations.clone()))
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn replace_record(&self, record: WordRecord) -> WordResult<Option<WordRecord>> {
        let sql = format!(
            "UPDATE words SET word = $2, word2 = $3, word3 = $4, translations = $5
             WHERE id = $1
             RETURNING {}",
            WORD_COLUMNS
        );
        let row: Option<WordRow> = sqlx::query_as(&sql)
            .bind(record.id)
            .bind(&record.word)
            .bind(&record.word2)
            .bind(&record.word3)
            .bind(Json(record.translations.clone()))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(WordRecord::from))
    }

    async fn delete_record(&self, id: Uuid) -> WordResult<bool> {
        let result = sqlx::query("DELETE FROM words WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_records(
        &self,
        keyword: &str,
        pagination: Pagination,
    ) -> WordResult<Vec<WordRecord>> {
        let sql = format!(
            "SELECT {} FROM words WHERE {} ORDER BY word, id LIMIT $2 OFFSET $3",
            WORD_COLUMNS, KEYWORD_FILTER
        );
        let rows: Vec<WordRow> = sqlx::query_as(&sql)
            .bind(like_pattern(keyword))
            .bind(i64::from(pagination.limit))
            .bind(offset_param(pagination))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(WordRecord::from).collect())
    }

    async fn count_matching_records(&self, keyword: &str) -> WordResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM words WHERE {}", KEYWORD_FILTER);
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(like_pattern(keyword))
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    /// Rows are applied one statement at a time inside a single transaction,
    /// so a later row with the same `word` overwrites an earlier one.
    async fn upsert_rows(&self, rows: Vec<CsvRow>) -> WordResult<usize> {
        let mut tx = self.pool.begin().await?;

        for row in &rows {
            let updated = sqlx::query(
                "UPDATE words SET word2 = $2, word3 = $3
                 WHERE id = (SELECT id FROM words WHERE word = $1 ORDER BY id LIMIT 1)",
            )
            .bind(&row.word)
            .bind(&row.word2)
            .bind(&row.word3)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                sqlx::query(
                    "INSERT INTO words (id, word, word2, word3, translations)
                     VALUES ($1, $2, $3, $4, '{}'::jsonb)",
                )
                .bind(Uuid::new_v4())
                .bind(&row.word)
                .bind(&row.word2)
                .bind(&row.word3)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(rows.len())
    }
}

impl WordStore for Database {
    fn list(
        &self,
        sort: Sort,
        pagination: Pagination,
    ) -> BoxFuture<'_, WordResult<Vec<WordRecord>>> {
        self.list_records(sort, pagination).boxed()
    }

    fn count(&self) -> BoxFuture<'_, WordResult<u64>> {
        self.count_records().boxed()
    }

    fn get(&self, id: Uuid) -> BoxFuture<'_, WordResult<Option<WordRecord>>> {
        self.get_record(id).boxed()
    }

    fn insert(&self, record: WordRecord) -> BoxFuture<'_, WordResult<WordRecord>> {
        self.insert_record(record).boxed()
    }

    fn replace(&self, record: WordRecord) -> BoxFuture<'_, WordResult<Option<WordRecord>>> {
        self.replace_record(record).boxed()
    }

    fn delete(&self, id: Uuid) -> BoxFuture<'_, WordResult<bool>> {
        self.delete_record(id).boxed()
    }

    fn search<'a>(
        &'a self,
        keyword: &'a str,
        pagination: Pagination,
    ) -> BoxFuture<'a, WordResult<Vec<WordRecord>>> {
        self.search_records(keyword, pagination).boxed()
    }

    fn count_matching<'a>(&'a self, keyword: &'a str) -> BoxFuture<'a, WordResult<u64>> {
        self.count_matching_records(keyword).boxed()
    }

    fn upsert_by_word(&self, rows: Vec<CsvRow>) -> BoxFuture<'_, WordResult<usize>> {
        self.upsert_rows(rows).boxed()
    }
}

/// `ORDER BY` body for a list query. Column names come from the enum, never
/// from user input.
fn order_clause(sort: Sort) -> String {
    let column = match sort.key {
        SortKey::Word => "word",
        SortKey::Word2 => "word2",
        SortKey::Word3 => "word3",
    };
    let direction = match sort.order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    format!("{} COLLATE \"C\" {}, id", column, direction)
}

/// `%keyword%` with LIKE wildcards in the keyword escaped.
fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn offset_param(pagination: Pagination) -> i64 {
    i64::try_from(pagination.offset()).unwrap_or(i64::MAX)
}
