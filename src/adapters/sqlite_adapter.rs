//! SQLite document store.
//!
//! Each database is one SQLite file under `[sqlite] data_dir`; each collection
//! is a table holding documents as JSON text next to an indexed copy of their
//! `Date` in canonical text form. Rows come back in insertion order.

use crate::adapters::quote_identifier;
use crate::domain::database_name::validate_database_name;
use crate::domain::date_range::{format_instant, parse_stored_instant};
use crate::domain::document::{DATE_FIELD, Document, DocumentId, ID_FIELD};
use crate::domain::error::PriceTrendError;
use crate::domain::range_query::RangeFilter;
use crate::ports::config_port::ConfigPort;
use crate::ports::document_port::{DocumentPort, DocumentSession};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_POOL_SIZE: i64 = 4;

pub struct SqliteDocumentStore {
    database: String,
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteDocumentStore {
    pub fn from_config(config: &dyn ConfigPort, database: &str) -> Result<Self, PriceTrendError> {
        validate_database_name(database)?;

        let data_dir = config
            .get_string("sqlite", "data_dir")
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

        let pool_size = config.get_int("sqlite", "pool_size", DEFAULT_POOL_SIZE);
        let pool_size = u32::try_from(pool_size)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| PriceTrendError::ConfigInvalid {
                section: "sqlite".into(),
                key: "pool_size".into(),
                reason: format!("expected a positive integer, got {pool_size}"),
            })?;

        std::fs::create_dir_all(&data_dir)?;
        let path = database_path(Path::new(&data_dir), database);
        Self::open(&path, database, pool_size)
    }

    pub fn open(path: &Path, database: &str, pool_size: u32) -> Result<Self, PriceTrendError> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| PriceTrendError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self {
            database: database.to_string(),
            pool,
        })
    }

    /// Single-connection in-memory store. The connection is never recycled,
    /// since that would discard the data.
    pub fn in_memory(database: &str) -> Result<Self, PriceTrendError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)
            .map_err(|e: r2d2::Error| PriceTrendError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self {
            database: database.to_string(),
            pool,
        })
    }

    fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>, PriceTrendError> {
        self.pool.get().map_err(|e: r2d2::Error| PriceTrendError::Database {
            reason: e.to_string(),
        })
    }

    /// Append documents to `collection`, creating it if needed. Every
    /// document needs a `Date` the store can read; it is rewritten in
    /// canonical form. A string `_id` is kept, otherwise one is generated.
    pub fn insert_documents(
        &self,
        collection: &str,
        docs: &[Map<String, Value>],
    ) -> Result<Vec<DocumentId>, PriceTrendError> {
        let mut conn = self.connection()?;
        create_collection(&conn, collection)?;

        let tx = conn
            .transaction()
            .map_err(|e: rusqlite::Error| PriceTrendError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let sql = format!(
            "INSERT INTO {} (id, date, body) VALUES (?1, ?2, ?3)",
            quote_identifier(collection)
        );

        let mut ids = Vec::with_capacity(docs.len());
        for doc in docs {
            let mut fields = doc.clone();
            let id = match fields.remove(ID_FIELD) {
                Some(Value::String(id)) => id,
                _ => hex::encode(rand::random::<[u8; 12]>()),
            };

            let date = fields
                .get(DATE_FIELD)
                .and_then(Value::as_str)
                .and_then(parse_stored_instant)
                .ok_or_else(|| PriceTrendError::MalformedDocument {
                    id: id.clone(),
                    reason: format!("missing or unreadable '{DATE_FIELD}'"),
                })?;
            let date = format_instant(date);
            fields.insert(DATE_FIELD.to_string(), Value::String(date.clone()));

            let body = serde_json::to_string(&fields).map_err(|e| {
                PriceTrendError::MalformedDocument {
                    id: id.clone(),
                    reason: e.to_string(),
                }
            })?;

            tx.execute(&sql, params![id, date, body])
                .map_err(|e: rusqlite::Error| PriceTrendError::DatabaseQuery {
                    reason: e.to_string(),
                })?;
            ids.push(DocumentId::new(id));
        }

        tx.commit()
            .map_err(|e: rusqlite::Error| PriceTrendError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(ids)
    }
}

pub fn database_path(data_dir: &Path, database: &str) -> PathBuf {
    data_dir.join(format!("{database}.sqlite3"))
}

fn create_collection(conn: &Connection, collection: &str) -> Result<(), PriceTrendError> {
    let table = quote_identifier(collection);
    let index = quote_identifier(&format!("{collection}_date_idx"));
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            seq INTEGER PRIMARY KEY,
            id TEXT NOT NULL UNIQUE,
            date TEXT NOT NULL,
            body TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS {index} ON {table}(date);"
    ))
    .map_err(|e: rusqlite::Error| PriceTrendError::DatabaseQuery {
        reason: e.to_string(),
    })
}

fn collection_exists(conn: &Connection, collection: &str) -> Result<bool, PriceTrendError> {
    if collection.starts_with("sqlite_") {
        return Ok(false);
    }
    conn.query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![collection],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
    .map_err(|e: rusqlite::Error| PriceTrendError::DatabaseQuery {
        reason: e.to_string(),
    })
}

impl DocumentPort for SqliteDocumentStore {
    fn database(&self) -> &str {
        &self.database
    }

    fn open_session(&self) -> Result<Box<dyn DocumentSession + Send>, PriceTrendError> {
        Ok(Box::new(SqliteSession {
            conn: self.connection()?,
        }))
    }
}

/// A pooled connection checked out for one request.
pub struct SqliteSession {
    conn: PooledConnection<SqliteConnectionManager>,
}

impl DocumentSession for SqliteSession {
    fn find(
        &mut self,
        collection: &str,
        filter: &RangeFilter,
    ) -> Result<Vec<Document>, PriceTrendError> {
        if !collection_exists(&self.conn, collection)? {
            return Ok(Vec::new());
        }

        let (start, end) = filter.text_bounds();
        let query = format!(
            "SELECT id, body FROM {} WHERE date >= ?1 AND date <= ?2 ORDER BY seq ASC",
            quote_identifier(collection)
        );

        let mut stmt =
            self.conn
                .prepare(&query)
                .map_err(|e: rusqlite::Error| PriceTrendError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let rows = stmt
            .query_map(params![start, end], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e: rusqlite::Error| PriceTrendError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut docs = Vec::new();
        for row in rows {
            let (id, body) = row.map_err(|e: rusqlite::Error| PriceTrendError::DatabaseQuery {
                reason: e.to_string(),
            })?;
            let fields: Map<String, Value> =
                serde_json::from_str(&body).map_err(|e| PriceTrendError::MalformedDocument {
                    id: id.clone(),
                    reason: e.to_string(),
                })?;
            docs.push(Document::new(DocumentId::new(id), fields));
        }

        Ok(docs)
    }

    fn list_collections(&mut self) -> Result<Vec<String>, PriceTrendError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
                 ORDER BY name",
            )
            .map_err(|e: rusqlite::Error| PriceTrendError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e: rusqlite::Error| PriceTrendError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut names = Vec::new();
        for row in rows {
            names.push(
                row.map_err(|e: rusqlite::Error| PriceTrendError::DatabaseQuery {
                    reason: e.to_string(),
                })?,
            );
        }

        Ok(names)
    }
}
