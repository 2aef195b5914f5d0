//! PostgreSQL document store.
//!
//! The startup database name selects the PostgreSQL database; each collection
//! is a table in `public` populated by the external loader:
//!
//! ```sql
//! CREATE TABLE "BTC" (
//!     seq  BIGSERIAL PRIMARY KEY,
//!     id   TEXT NOT NULL UNIQUE,
//!     date TIMESTAMPTZ NOT NULL,
//!     body JSONB NOT NULL
//! );
//! ```

use crate::adapters::quote_identifier;
use crate::domain::database_name::validate_database_name;
use crate::domain::document::{Document, DocumentId};
use crate::domain::error::PriceTrendError;
use crate::domain::range_query::RangeFilter;
use crate::ports::config_port::ConfigPort;
use crate::ports::document_port::{DocumentPort, DocumentSession};
use postgres::{Config, NoTls};
use r2d2::{Pool, PooledConnection};
use r2d2_postgres::PostgresConnectionManager;
use serde_json::Value;

const DEFAULT_POOL_SIZE: i64 = 4;

pub struct PostgresDocumentStore {
    database: String,
    pool: Pool<PostgresConnectionManager<NoTls>>,
}

impl PostgresDocumentStore {
    pub fn from_config(config: &dyn ConfigPort, database: &str) -> Result<Self, PriceTrendError> {
        validate_database_name(database)?;

        // Try [postgres] connection_string first, fall back to [database] conninfo
        let connection_string = config
            .get_string("postgres", "connection_string")
            .or_else(|| config.get_string("database", "conninfo"))
            .ok_or_else(|| PriceTrendError::ConfigMissing {
                section: "postgres".into(),
                key: "connection_string".into(),
            })?;

        let mut pg_config: Config =
            connection_string
                .parse()
                .map_err(|e: postgres::Error| PriceTrendError::ConfigInvalid {
                    section: "postgres".into(),
                    key: "connection_string".into(),
                    reason: e.to_string(),
                })?;
        pg_config.dbname(database);

        let pool_size = config.get_int("postgres", "pool_size", DEFAULT_POOL_SIZE);
        let pool_size = u32::try_from(pool_size)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| PriceTrendError::ConfigInvalid {
                section: "postgres".into(),
                key: "pool_size".into(),
                reason: format!("expected a positive integer, got {pool_size}"),
            })?;

        let manager = PostgresConnectionManager::new(pg_config, NoTls);
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
}

impl DocumentPort for PostgresDocumentStore {
    fn database(&self) -> &str {
        &self.database
    }

    fn open_session(&self) -> Result<Box<dyn DocumentSession + Send>, PriceTrendError> {
        let client = self.pool.get().map_err(|e: r2d2::Error| PriceTrendError::Database {
            reason: e.to_string(),
        })?;
        Ok(Box::new(PostgresSession { client }))
    }
}

pub struct PostgresSession {
    client: PooledConnection<PostgresConnectionManager<NoTls>>,
}

impl DocumentSession for PostgresSession {
    fn find(
        &mut self,
        collection: &str,
        filter: &RangeFilter,
    ) -> Result<Vec<Document>, PriceTrendError> {
        let table = format!("public.{}", quote_identifier(collection));

        let exists: bool = self
            .client
            .query_one("SELECT to_regclass($1::text) IS NOT NULL", &[&table])
            .map_err(|e| PriceTrendError::DatabaseQuery {
                reason: e.to_string(),
            })?
            .get(0);
        if !exists {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT id, body FROM {table} WHERE date >= $1 AND date <= $2 ORDER BY seq ASC"
        );
        let start = filter.start();
        let end = filter.end();
        let rows = self
            .client
            .query(query.as_str(), &[&start, &end])
            .map_err(|e| PriceTrendError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        rows.into_iter()
            .map(|row| {
                let id: String = row.get(0);
                match row.get::<_, Value>(1) {
                    Value::Object(fields) => Ok(Document::new(DocumentId::new(id), fields)),
                    other => Err(PriceTrendError::MalformedDocument {
                        id,
                        reason: format!("body is not an object: {other}"),
                    }),
                }
            })
            .collect()
    }

    fn list_collections(&mut self) -> Result<Vec<String>, PriceTrendError> {
        let rows = self
            .client
            .query(
                "SELECT table_name::text FROM information_schema.tables \
                 WHERE table_schema = 'public' ORDER BY table_name",
                &[],
            )
            .map_err(|e| PriceTrendError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }
}
