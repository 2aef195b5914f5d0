//! pricetrend: price history and trend API over a document store.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], process entry in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
