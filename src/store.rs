//! Durable document persistence over embedded SQLite.
//!
//! [`DocumentStore`] exclusively owns the persisted collection of
//! [`UploadedDocument`]s. Every operation acquires its own transaction and
//! releases it on all exit paths — an uncommitted `sqlx` transaction rolls
//! back when dropped. Extraction and chunking run before any store
//! mutation, so a failed `save` never leaves a partial chunk set behind.
//!
//! Chunks are keyed by the composite `(document_id, chunk_index)`; the
//! display id string (`"<source>-chunk-<index>"`) is stored as a plain
//! column for presentation and name resolution.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::chunk;
use crate::config::Config;
use crate::error::Error;
use crate::extract::Extractor;
use crate::models::{DocumentChunk, FileUpload, UploadedDocument};

pub struct DocumentStore {
    pool: SqlitePool,
    extractor: Extractor,
    max_chunk_chars: usize,
}

impl DocumentStore {
    /// Open the store, creating the database file and schema on first use.
    /// Reopening an existing database is safe; schema creation is
    /// idempotent.
    pub async fn open(config: &Config) -> Result<Self, Error> {
        let pool = connect(config).await?;
        ensure_schema(&pool).await?;
        Ok(Self {
            pool,
            extractor: Extractor::new(),
            max_chunk_chars: config.chunking.max_chars,
        })
    }

    /// Replace the default extractor, e.g. to inject a custom PDF engine.
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Run extraction + chunking on the upload, generate a document id, and
    /// insert the completed record in a single transaction.
    ///
    /// Extraction happens before any store mutation; an extraction failure
    /// leaves the store untouched. [`Error::DuplicateId`] is only possible
    /// on a generated-id collision.
    pub async fn save(&self, file: &FileUpload) -> Result<UploadedDocument, Error> {
        let text = self.extractor.extract(file).await?;
        let chunks = chunk::chunk_text(&text, &file.name, self.max_chunk_chars);

        let doc = UploadedDocument {
            id: generate_doc_id(),
            name: file.name.clone(),
            size: file.bytes.len() as i64,
            content_type: file.content_type.clone(),
            uploaded_at: chrono::Utc::now().timestamp_millis(),
            chunks,
        };

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO documents (id, name, size, content_type, uploaded_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&doc.id)
        .bind(&doc.name)
        .bind(doc.size)
        .bind(&doc.content_type)
        .bind(doc.uploaded_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_insert_error(&doc.id, e))?;

        for chunk in &doc.chunks {
            sqlx::query(
                "INSERT INTO chunks (document_id, chunk_index, chunk_id, text, source) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&doc.id)
            .bind(chunk.index)
            .bind(&chunk.id)
            .bind(&chunk.text)
            .bind(&chunk.source)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(doc)
    }

    /// All stored documents with their chunks in index order. Document
    /// order is not guaranteed; callers must not rely on it.
    pub async fn list_all(&self) -> Result<Vec<UploadedDocument>, Error> {
        let mut tx = self.pool.begin().await?;

        let doc_rows = sqlx::query(
            "SELECT id, name, size, content_type, uploaded_at FROM documents",
        )
        .fetch_all(&mut *tx)
        .await?;

        let mut docs = Vec::with_capacity(doc_rows.len());
        for row in &doc_rows {
            let id: String = row.get("id");
            let chunk_rows = sqlx::query(
                "SELECT chunk_id, text, source, chunk_index FROM chunks \
                 WHERE document_id = ? ORDER BY chunk_index ASC",
            )
            .bind(&id)
            .fetch_all(&mut *tx)
            .await?;

            let chunks = chunk_rows
                .iter()
                .map(|c| DocumentChunk {
                    id: c.get("chunk_id"),
                    text: c.get("text"),
                    source: c.get("source"),
                    index: c.get("chunk_index"),
                })
                .collect();

            docs.push(UploadedDocument {
                id,
                name: row.get("name"),
                size: row.get("size"),
                content_type: row.get("content_type"),
                uploaded_at: row.get("uploaded_at"),
                chunks,
            });
        }

        tx.commit().await?;
        Ok(docs)
    }

    /// Remove the document and all its chunks atomically. A missing id is a
    /// no-op, not an error.
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM chunks WHERE document_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn connect(config: &Config) -> Result<SqlitePool, Error> {
    let db_path = &config.db.path;

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::StorageFailure(e.to_string()))?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))
        .map_err(|e| Error::StorageFailure(e.to_string()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

async fn ensure_schema(pool: &SqlitePool) -> Result<(), Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            size INTEGER NOT NULL,
            content_type TEXT NOT NULL DEFAULT '',
            uploaded_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chunks (
            document_id TEXT NOT NULL,
            chunk_index INTEGER NOT NULL,
            chunk_id TEXT NOT NULL,
            text TEXT NOT NULL,
            source TEXT NOT NULL,
            PRIMARY KEY (document_id, chunk_index),
            FOREIGN KEY (document_id) REFERENCES documents(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_document_id ON chunks(document_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// `doc-<millis>-<random suffix>`: timestamp plus a slice of a v4 UUID.
/// Collisions are astronomically unlikely; the primary key catches the
/// pathological case as [`Error::DuplicateId`].
fn generate_doc_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("doc-{}-{}", millis, &suffix[..9])
}

fn map_insert_error(id: &str, e: sqlx::Error) -> Error {
    if let sqlx::Error::Database(ref db_err) = e {
        if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            return Error::DuplicateId(id.to_string());
        }
    }
    Error::StorageFailure(e.to_string())
}
