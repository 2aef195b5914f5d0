//! Core domain types and logic.

pub mod clock;
pub mod database_name;
pub mod date_range;
pub mod document;
pub mod error;
pub mod range_query;
pub mod trend;
pub mod window;
