//! SQLite-backed vector store using the `sqlite-vec` extension.

use std::mem::transmute;
use std::os::raw::c_char;
use std::path::Path;
use std::sync::Once;

use async_trait::async_trait;
use chrono::Utc;
use tokio_rusqlite::{Connection, OptionalExtension, ffi};
use uuid::Uuid;

use super::{ChunkInsert, ChunkRow, DocumentRow, NewDocument, VectorStore};
use crate::ranking::Candidate;
use crate::types::RagError;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS documents (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    url         TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chunks (
    id          TEXT PRIMARY KEY,
    document_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_chunks_document ON chunks(document_id);

CREATE TABLE IF NOT EXISTS vectors (
    id          TEXT PRIMARY KEY,
    chunk_id    TEXT NOT NULL UNIQUE REFERENCES chunks(id) ON DELETE CASCADE,
    content     TEXT NOT NULL,
    embedding   BLOB NOT NULL
);
";

/// Document/chunk/vector store over a single SQLite database.
///
/// Embeddings are canonicalized through `vec_f32()` at insert time and read
/// back as little-endian `f32` blobs. Dimensionality is checked in Rust
/// against the value fixed at [`open`](SqliteRagStore::open); changing the
/// embedding model means re-ingesting every document.
#[derive(Clone)]
pub struct SqliteRagStore {
    conn: Connection,
    dims: usize,
}

impl SqliteRagStore {
    /// Opens (or creates) the store at `path`, expecting `dims`-component
    /// embeddings.
    pub async fn open(path: impl AsRef<Path>, dims: usize) -> Result<Self, RagError> {
        if dims == 0 {
            return Err(RagError::InvalidConfig("dims must be positive".into()));
        }
        Self::register_sqlite_vec()?;
        let conn = Connection::open(path)
            .await
            .map_err(|err| RagError::Storage(err.to_string()))?;
        conn.call(|conn| {
            let _version: String = conn
                .query_row("select vec_version()", [], |row| row.get(0))?;
            conn.pragma_update(None, "foreign_keys", 1)?;
            conn.execute_batch(SCHEMA_SQL)?;
            Ok(())
        })
        .await
        .map_err(|err: tokio_rusqlite::Error| RagError::Storage(err.to_string()))?;
        Ok(Self { conn, dims })
    }

    /// Embedding dimensionality this store was opened with.
    pub fn dims(&self) -> usize {
        self.dims
    }

    fn register_sqlite_vec() -> Result<(), RagError> {
        use std::sync::Mutex;

        static INIT: Once = Once::new();
        static INIT_RESULT: Mutex<Option<Result<(), String>>> = Mutex::new(None);

        INIT.call_once(|| {
            let result = unsafe {
                type SqliteExtensionInit = unsafe extern "C" fn(
                    *mut ffi::sqlite3,
                    *mut *mut c_char,
                    *const ffi::sqlite3_api_routines,
                ) -> i32;

                let init: unsafe extern "C" fn() = sqlite_vec::sqlite3_vec_init;
                let init_fn: SqliteExtensionInit =
                    transmute::<unsafe extern "C" fn(), SqliteExtensionInit>(init);
                let rc = ffi::sqlite3_auto_extension(Some(init_fn));
                if rc != 0 {
                    Err(format!(
                        "failed to register sqlite-vec extension (code {rc})"
                    ))
                } else {
                    Ok(())
                }
            };
            *INIT_RESULT.lock().expect("init result mutex poisoned") = Some(result);
        });

        INIT_RESULT
            .lock()
            .expect("init result mutex poisoned")
            .clone()
            .expect("init was called but result not set")
            .map_err(RagError::Storage)
    }

    fn check_dims(&self, chunks: &[ChunkInsert]) -> Result<(), RagError> {
        for chunk in chunks {
            if chunk.embedding.len() != self.dims {
                return Err(RagError::Storage(format!(
                    "embedding has {} dimensions, store expects {}",
                    chunk.embedding.len(),
                    self.dims
                )));
            }
        }
        Ok(())
    }
}

fn decode_embedding(blob: &[u8]) -> Result<Vec<f32>, RagError> {
    if blob.len() % 4 != 0 {
        return Err(RagError::Storage(format!(
            "stored embedding blob has invalid length {}",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        .collect())
}

#[async_trait]
impl VectorStore for SqliteRagStore {
    async fn replace_document(
        &self,
        doc: NewDocument,
        chunks: Vec<ChunkInsert>,
    ) -> Result<DocumentRow, RagError> {
        for chunk in &chunks {
            if chunk.content.trim().is_empty() {
                return Err(RagError::InvalidDocument(
                    "chunk content must not be empty".into(),
                ));
            }
        }
        self.check_dims(&chunks)?;

        let now = Utc::now().to_rfc3339();
        let row = DocumentRow {
            id: Uuid::new_v4().to_string(),
            title: doc.title,
            url: doc.url,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        // (chunk id, content, vector id, embedding as JSON for vec_f32).
        let mut prepared = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let embedding_json = serde_json::to_string(&chunk.embedding)
                .map_err(|err| RagError::Storage(err.to_string()))?;
            prepared.push((
                Uuid::new_v4().to_string(),
                chunk.content.clone(),
                Uuid::new_v4().to_string(),
                embedding_json,
            ));
        }

        let inserted = row.clone();
        self.conn
            .call(move |conn| {
                let tx = conn
                    .transaction()?;

                // Delete-then-insert inside one transaction keeps re-ingestion
                // idempotent without a window where the document is absent.
                tx.execute(
                    "DELETE FROM documents WHERE url = ?",
                    [inserted.url.as_str()],
                )?;

                tx.execute(
                    "INSERT INTO documents (id, title, url, created_at, updated_at) \
                     VALUES (?, ?, ?, ?, ?)",
                    [
                        inserted.id.as_str(),
                        inserted.title.as_str(),
                        inserted.url.as_str(),
                        inserted.created_at.as_str(),
                        inserted.updated_at.as_str(),
                    ],
                )?;

                {
                    let mut chunk_stmt = tx
                        .prepare(
                            "INSERT INTO chunks (id, document_id, content, created_at, updated_at) \
                             VALUES (?, ?, ?, ?, ?)",
                        )?;
                    let mut vector_stmt = tx
                        .prepare(
                            "INSERT INTO vectors (id, chunk_id, content, embedding) \
                             VALUES (?, ?, ?, vec_f32(?))",
                        )?;

                    for (chunk_id, content, vector_id, embedding_json) in &prepared {
                        chunk_stmt
                            .execute([
                                chunk_id.as_str(),
                                inserted.id.as_str(),
                                content.as_str(),
                                inserted.created_at.as_str(),
                                inserted.updated_at.as_str(),
                            ])?;
                        vector_stmt
                            .execute([
                                vector_id.as_str(),
                                chunk_id.as_str(),
                                content.as_str(),
                                embedding_json.as_str(),
                            ])?;
                    }
                }

                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(|err: tokio_rusqlite::Error| RagError::Storage(err.to_string()))?;

        Ok(row)
    }

    async fn documents(&self) -> Result<Vec<DocumentRow>, RagError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn
                    .prepare(
                        "SELECT id, title, url, created_at, updated_at FROM documents \
                         ORDER BY created_at ASC, rowid ASC",
                    )?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(DocumentRow {
                            id: row.get(0)?,
                            title: row.get(1)?,
                            url: row.get(2)?,
                            created_at: row.get(3)?,
                            updated_at: row.get(4)?,
                        })
                    })?;

                let mut results = Vec::new();
                for row in rows {
                    results.push(row?);
                }
                Ok(results)
            })
            .await
            .map_err(|err: tokio_rusqlite::Error| RagError::Storage(err.to_string()))
    }

    async fn find_document_by_url(&self, url: &str) -> Result<Option<DocumentRow>, RagError> {
        let url = url.to_string();
        self.conn
            .call(move |conn| {
                let result = conn
                    .query_row(
                        "SELECT id, title, url, created_at, updated_at FROM documents \
                         WHERE url = ?",
                        [url.as_str()],
                        |row| {
                            Ok(DocumentRow {
                                id: row.get(0)?,
                                title: row.get(1)?,
                                url: row.get(2)?,
                                created_at: row.get(3)?,
                                updated_at: row.get(4)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(result)
            })
            .await
            .map_err(|err: tokio_rusqlite::Error| RagError::Storage(err.to_string()))
    }

    async fn document_chunks(&self, document_id: &str) -> Result<Vec<ChunkRow>, RagError> {
        let document_id = document_id.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(
                        "SELECT id, document_id, content, created_at FROM chunks \
                         WHERE document_id = ? ORDER BY created_at ASC, rowid ASC",
                    )?;
                let rows = stmt
                    .query_map([document_id.as_str()], |row| {
                        Ok(ChunkRow {
                            id: row.get(0)?,
                            document_id: row.get(1)?,
                            content: row.get(2)?,
                            created_at: row.get(3)?,
                        })
                    })?;

                let mut results = Vec::new();
                for row in rows {
                    results.push(row?);
                }
                Ok(results)
            })
            .await
            .map_err(|err: tokio_rusqlite::Error| RagError::Storage(err.to_string()))
    }

    async fn candidate_pool(&self, scope: Option<&str>) -> Result<Vec<Candidate>, RagError> {
        let scope = scope.map(str::to_string);
        let raw: Vec<(String, String, Vec<u8>)> = self
            .conn
            .call(move |conn| {
                let mut results = Vec::new();
                if let Some(document_id) = scope {
                    let mut stmt = conn
                        .prepare(
                            "SELECT c.document_id, v.content, v.embedding \
                             FROM vectors v JOIN chunks c ON c.id = v.chunk_id \
                             WHERE c.document_id = ? ORDER BY c.rowid ASC",
                        )?;
                    let rows = stmt
                        .query_map([document_id.as_str()], |row| {
                            Ok((
                                row.get::<_, String>(0)?,
                                row.get::<_, String>(1)?,
                                row.get::<_, Vec<u8>>(2)?,
                            ))
                        })?;
                    for row in rows {
                        results.push(row?);
                    }
                } else {
                    let mut stmt = conn
                        .prepare(
                            "SELECT c.document_id, v.content, v.embedding \
                             FROM vectors v JOIN chunks c ON c.id = v.chunk_id \
                             ORDER BY c.rowid ASC",
                        )?;
                    let rows = stmt
                        .query_map([], |row| {
                            Ok((
                                row.get::<_, String>(0)?,
                                row.get::<_, String>(1)?,
                                row.get::<_, Vec<u8>>(2)?,
                            ))
                        })?;
                    for row in rows {
                        results.push(row?);
                    }
                }
                Ok(results)
            })
            .await
            .map_err(|err: tokio_rusqlite::Error| RagError::Storage(err.to_string()))?;

        raw.into_iter()
            .map(|(document_id, content, blob)| {
                Ok(Candidate {
                    document_id,
                    content,
                    embedding: decode_embedding(&blob)?,
                })
            })
            .collect()
    }

    async fn delete_document_by_url(&self, url: &str) -> Result<usize, RagError> {
        let url = url.to_string();
        self.conn
            .call(move |conn| {
                let deleted = conn
                    .execute("DELETE FROM documents WHERE url = ?", [url.as_str()])?;
                Ok(deleted)
            })
            .await
            .map_err(|err: tokio_rusqlite::Error| RagError::Storage(err.to_string()))
    }

    async fn chunk_count(&self) -> Result<usize, RagError> {
        self.conn
            .call(|conn| {
                let count: i64 = conn
                    .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
            .map_err(|err: tokio_rusqlite::Error| RagError::Storage(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn chunk(content: &str, embedding: Vec<f32>) -> ChunkInsert {
        ChunkInsert {
            content: content.to_string(),
            embedding,
        }
    }

    async fn open_store(dir: &tempfile::TempDir) -> SqliteRagStore {
        SqliteRagStore::open(dir.path().join("store.sqlite"), 3)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn roundtrips_documents_chunks_and_vectors() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;

        let row = store
            .replace_document(
                NewDocument {
                    title: "Essay".into(),
                    url: "https://example.com/essay".into(),
                },
                vec![
                    chunk("first chunk", vec![1.0, 0.0, 0.0]),
                    chunk("second chunk", vec![0.0, 1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        let documents = store.documents().await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].url, "https://example.com/essay");

        let chunks = store.document_chunks(&row.id).await.unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "first chunk");
        assert_eq!(chunks[1].content, "second chunk");

        let pool = store.candidate_pool(None).await.unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool[0].embedding, vec![1.0, 0.0, 0.0]);
        assert_eq!(pool[1].embedding, vec![0.0, 1.0, 0.0]);
        assert_eq!(pool[0].document_id, row.id);
    }

    #[tokio::test]
    async fn replacing_a_url_leaves_only_the_latest_rows() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;
        let url = "https://example.com/essay";

        store
            .replace_document(
                NewDocument {
                    title: "v1".into(),
                    url: url.into(),
                },
                vec![
                    chunk("old one", vec![1.0, 0.0, 0.0]),
                    chunk("old two", vec![0.0, 1.0, 0.0]),
                    chunk("old three", vec![0.0, 0.0, 1.0]),
                ],
            )
            .await
            .unwrap();

        let second = store
            .replace_document(
                NewDocument {
                    title: "v2".into(),
                    url: url.into(),
                },
                vec![chunk("new only", vec![0.5, 0.5, 0.0])],
            )
            .await
            .unwrap();

        let documents = store.documents().await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].title, "v2");
        assert_eq!(documents[0].id, second.id);

        assert_eq!(store.chunk_count().await.unwrap(), 1);
        let pool = store.candidate_pool(None).await.unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].content, "new only");
    }

    #[tokio::test]
    async fn deleting_a_document_cascades() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;
        let url = "https://example.com/gone";

        store
            .replace_document(
                NewDocument {
                    title: "doomed".into(),
                    url: url.into(),
                },
                vec![chunk("content", vec![1.0, 2.0, 3.0])],
            )
            .await
            .unwrap();

        assert_eq!(store.delete_document_by_url(url).await.unwrap(), 1);
        assert_eq!(store.chunk_count().await.unwrap(), 0);
        assert!(store.candidate_pool(None).await.unwrap().is_empty());
        assert!(store.find_document_by_url(url).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn scoped_pool_only_returns_that_document() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;

        let first = store
            .replace_document(
                NewDocument {
                    title: "first".into(),
                    url: "https://example.com/a".into(),
                },
                vec![chunk("alpha", vec![1.0, 0.0, 0.0])],
            )
            .await
            .unwrap();
        store
            .replace_document(
                NewDocument {
                    title: "second".into(),
                    url: "https://example.com/b".into(),
                },
                vec![chunk("beta", vec![0.0, 1.0, 0.0])],
            )
            .await
            .unwrap();

        let pool = store.candidate_pool(Some(&first.id)).await.unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].content, "alpha");
    }

    #[tokio::test]
    async fn wrong_dimensionality_is_rejected() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;

        let err = store
            .replace_document(
                NewDocument {
                    title: "bad".into(),
                    url: "https://example.com/bad".into(),
                },
                vec![chunk("content", vec![1.0, 2.0])],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Storage(_)));
    }

    #[tokio::test]
    async fn empty_chunk_content_is_rejected_before_persistence() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;

        let err = store
            .replace_document(
                NewDocument {
                    title: "bad".into(),
                    url: "https://example.com/empty".into(),
                },
                vec![chunk("   ", vec![1.0, 0.0, 0.0])],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::InvalidDocument(_)));
        assert!(
            store
                .find_document_by_url("https://example.com/empty")
                .await
                .unwrap()
                .is_none()
        );
    }
}
