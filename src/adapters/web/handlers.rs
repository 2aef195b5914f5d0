//! HTTP request handlers for web adapter.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::date_range::{DateRange, parse_timestamp};
use crate::domain::document::Document;
use crate::domain::error::PriceTrendError;
use crate::domain::range_query::build_filter;
use crate::domain::trend::{TrendSummary, compute_trend};
use crate::domain::window::parse_window;

use super::{AppState, StoreSession, WebError};

#[derive(Debug, Deserialize)]
pub struct GetDataParams {
    pub collection_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrendParams {
    pub collection_name: Option<String>,
    pub window: Option<String>,
}

fn required(value: Option<String>, name: &'static str) -> Result<String, PriceTrendError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(PriceTrendError::MissingParameter { name })
}

/// `GET /get_data?collection_name=&start_date=&end_date=`
pub async fn get_data(
    query: Result<Query<GetDataParams>, QueryRejection>,
    session: StoreSession,
) -> Result<Json<Vec<Document>>, WebError> {
    let Query(params) = query?;
    let collection = required(params.collection_name, "collection_name")?;
    let start = parse_timestamp(&required(params.start_date, "start_date")?)?;
    let end = parse_timestamp(&required(params.end_date, "end_date")?)?;

    tracing::debug!(%collection, %start, %end, "get_data");

    let docs = session
        .find(collection, build_filter(DateRange::new(start, end)))
        .await?;
    Ok(Json(docs))
}

/// `GET /trend?collection_name=&window=`
pub async fn trend(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TrendParams>, QueryRejection>,
    session: StoreSession,
) -> Result<Json<TrendSummary>, WebError> {
    let Query(params) = query?;
    let collection = required(params.collection_name, "collection_name")?;
    let window = parse_window(&required(params.window, "window")?)?;
    let range = window.range_ending_at(state.clock.now())?;

    tracing::debug!(%collection, %window, start = %range.start, end = %range.end, "trend");

    let docs = session.find(collection, build_filter(range)).await?;
    let summary = compute_trend(&docs)?;
    Ok(Json(summary))
}

pub async fn not_found() -> WebError {
    WebError::not_found("Not Found")
}

pub async fn method_not_allowed() -> WebError {
    WebError::method_not_allowed("Method Not Allowed")
}
