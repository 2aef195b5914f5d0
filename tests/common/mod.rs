#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use pricetrend::domain::date_range::format_instant;
use pricetrend::domain::document::{Document, DocumentId};
use pricetrend::domain::error::PriceTrendError;
use pricetrend::domain::range_query::RangeFilter;
use pricetrend::ports::document_port::{DocumentPort, DocumentSession};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory store. Tracks how many sessions are currently checked out, and
/// how many checkouts were ever attempted, so tests can assert when sessions
/// are taken and that they are always released.
pub struct MockDocumentStore {
    pub collections: HashMap<String, Vec<Document>>,
    pub open_error: Option<String>,
    pub query_error: Option<String>,
    pub open_sessions: Arc<AtomicUsize>,
    pub open_attempts: Arc<AtomicUsize>,
}

impl MockDocumentStore {
    pub fn new() -> Self {
        Self {
            collections: HashMap::new(),
            open_error: None,
            query_error: None,
            open_sessions: Arc::new(AtomicUsize::new(0)),
            open_attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_docs(mut self, collection: &str, docs: Vec<Document>) -> Self {
        self.collections.insert(collection.to_string(), docs);
        self
    }

    pub fn with_open_error(mut self, reason: &str) -> Self {
        self.open_error = Some(reason.to_string());
        self
    }

    pub fn with_query_error(mut self, reason: &str) -> Self {
        self.query_error = Some(reason.to_string());
        self
    }

    pub fn session_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.open_sessions)
    }

    pub fn sessions_opened(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.open_attempts)
    }
}

impl DocumentPort for MockDocumentStore {
    fn database(&self) -> &str {
        "mock"
    }

    fn open_session(&self) -> Result<Box<dyn DocumentSession + Send>, PriceTrendError> {
        self.open_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.open_error {
            return Err(PriceTrendError::Database {
                reason: reason.clone(),
            });
        }
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            collections: self.collections.clone(),
            query_error: self.query_error.clone(),
            open_sessions: Arc::clone(&self.open_sessions),
        }))
    }
}

struct MockSession {
    collections: HashMap<String, Vec<Document>>,
    query_error: Option<String>,
    open_sessions: Arc<AtomicUsize>,
}

impl DocumentSession for MockSession {
    fn find(
        &mut self,
        collection: &str,
        filter: &RangeFilter,
    ) -> Result<Vec<Document>, PriceTrendError> {
        if let Some(reason) = &self.query_error {
            return Err(PriceTrendError::DatabaseQuery {
                reason: reason.clone(),
            });
        }
        Ok(self
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.matches_document(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_collections(&mut self) -> Result<Vec<String>, PriceTrendError> {
        let mut names: Vec<String> = self.collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

/// 2024-06-15T12:00:00Z, the "now" used by router tests.
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

pub fn make_doc(id: &str, date: DateTime<Utc>, open: Option<f64>) -> Document {
    let mut fields = Map::new();
    fields.insert("Date".into(), Value::String(format_instant(date)));
    if let Some(open) = open {
        fields.insert("Open".into(), json!(open));
    }
    fields.insert("Volume".into(), json!(1000));
    Document::new(DocumentId::new(id), fields)
}

/// One document per day at midnight, starting at `first`.
pub fn daily_docs(first: DateTime<Utc>, opens: &[f64]) -> Vec<Document> {
    opens
        .iter()
        .enumerate()
        .map(|(i, &open)| {
            make_doc(
                &format!("{:024x}", i + 1),
                first + chrono::TimeDelta::days(i as i64),
                Some(open),
            )
        })
        .collect()
}
