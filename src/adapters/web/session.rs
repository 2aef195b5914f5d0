//! Request-scoped store sessions.
//!
//! `StoreSession` is an extractor that only holds a handle to the store.
//! Nothing is checked out until [`StoreSession::find`] runs, so handlers
//! validate their parameters first. The checked-out session goes back to the
//! pool as soon as the query finishes, whichever way it ends.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;
use std::sync::Arc;

use crate::domain::document::Document;
use crate::domain::error::PriceTrendError;
use crate::domain::range_query::RangeFilter;
use crate::ports::document_port::DocumentPort;

use super::{AppState, WebError};

pub struct StoreSession {
    store: Arc<dyn DocumentPort + Send + Sync>,
}

impl FromRequestParts<Arc<AppState>> for StoreSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(StoreSession {
            store: Arc::clone(&state.store),
        })
    }
}

impl StoreSession {
    /// Opens a session and runs the query on the blocking pool.
    pub async fn find(
        self,
        collection: String,
        filter: RangeFilter,
    ) -> Result<Vec<Document>, WebError> {
        let store = self.store;
        run_blocking(move || {
            let mut session = store.open_session()?;
            session.find(&collection, &filter)
        })
        .await
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, WebError>
where
    F: FnOnce() -> Result<T, PriceTrendError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| WebError::internal(e.to_string()))?
        .map_err(WebError::from)
}
