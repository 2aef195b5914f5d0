//! Document store port traits.
//!
//! A `DocumentPort` is bound to one database at startup. Each request opens
//! its own `DocumentSession`; dropping the session returns the underlying
//! connection to the store.

use crate::domain::document::Document;
use crate::domain::error::PriceTrendError;
use crate::domain::range_query::RangeFilter;

pub trait DocumentPort {
    /// Name of the database this store was opened against.
    fn database(&self) -> &str;

    fn open_session(&self) -> Result<Box<dyn DocumentSession + Send>, PriceTrendError>;
}

pub trait DocumentSession {
    /// Documents of `collection` matching `filter`, in storage order. A
    /// collection that does not exist yields an empty vector.
    fn find(
        &mut self,
        collection: &str,
        filter: &RangeFilter,
    ) -> Result<Vec<Document>, PriceTrendError>;

    fn list_collections(&mut self) -> Result<Vec<String>, PriceTrendError>;
}
