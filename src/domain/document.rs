//! Price point documents as returned by the document store.

use crate::domain::date_range::parse_stored_instant;
use crate::domain::error::PriceTrendError;
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::fmt;

pub const ID_FIELD: &str = "_id";
pub const DATE_FIELD: &str = "Date";
pub const OPEN_FIELD: &str = "Open";

/// Opaque identity token assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ordered field map plus its identity. Fields other than `Date` and
/// `Open` are carried through uninterpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: DocumentId, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.get(DATE_FIELD)
            .and_then(Value::as_str)
            .and_then(parse_stored_instant)
    }

    /// `Ok(None)` when `Open` is absent or null.
    pub fn open(&self) -> Result<Option<f64>, PriceTrendError> {
        match self.get(OPEN_FIELD) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(|| {
                PriceTrendError::MalformedDocument {
                    id: self.id.to_string(),
                    reason: format!("'{OPEN_FIELD}' is out of range: {n}"),
                }
            }),
            Some(other) => Err(PriceTrendError::MalformedDocument {
                id: self.id.to_string(),
                reason: format!("'{OPEN_FIELD}' is not numeric: {other}"),
            }),
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = self.fields.keys().filter(|k| *k != ID_FIELD).count();
        let mut map = serializer.serialize_map(Some(extra + 1))?;
        map.serialize_entry(ID_FIELD, self.id.as_str())?;
        for (key, value) in &self.fields {
            if key != ID_FIELD {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}
