//! Domain error types.
//!
//! Request validation failures carry the exact messages returned to HTTP
//! clients; everything else is surfaced verbatim as an internal error.

/// Top-level error type for pricetrend.
#[derive(Debug, thiserror::Error)]
pub enum PriceTrendError {
    #[error("Invalid date format. Please use ISO 8601 format: %Y-%m-%dT%H:%M:%S.%fZ")]
    InvalidDateFormat,

    #[error("Invalid parameter format.")]
    InvalidParameterFormat,

    #[error("Invalid period indicator in 'window' parameter. Use 'd', 'h', or 'm'.")]
    InvalidPeriodIndicator,

    #[error("Invalid 'window' parameter for minute-level data.")]
    InvalidWindowForMinutes,

    #[error("Missing required parameter '{name}'.")]
    MissingParameter { name: &'static str },

    #[error("No data available for the requested time period.")]
    NoData,

    #[error("No 'Open' column found in the data.")]
    MissingColumn,

    #[error("malformed document {id}: {reason}")]
    MalformedDocument { id: String, reason: String },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid database name {name:?}: {reason}")]
    InvalidDatabaseName { name: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PriceTrendError {
    /// True for errors caused by the caller's request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PriceTrendError::InvalidDateFormat
                | PriceTrendError::InvalidParameterFormat
                | PriceTrendError::InvalidPeriodIndicator
                | PriceTrendError::InvalidWindowForMinutes
                | PriceTrendError::MissingParameter { .. }
                | PriceTrendError::NoData
                | PriceTrendError::MissingColumn
        )
    }
}

impl From<&PriceTrendError> for std::process::ExitCode {
    fn from(err: &PriceTrendError) -> Self {
        let code: u8 = match err {
            PriceTrendError::Io(_) => 1,
            PriceTrendError::ConfigParse { .. }
            | PriceTrendError::ConfigMissing { .. }
            | PriceTrendError::ConfigInvalid { .. }
            | PriceTrendError::InvalidDatabaseName { .. } => 2,
            PriceTrendError::Database { .. }
            | PriceTrendError::DatabaseQuery { .. }
            | PriceTrendError::MalformedDocument { .. } => 3,
            PriceTrendError::InvalidDateFormat
            | PriceTrendError::InvalidParameterFormat
            | PriceTrendError::InvalidPeriodIndicator
            | PriceTrendError::InvalidWindowForMinutes
            | PriceTrendError::MissingParameter { .. }
            | PriceTrendError::NoData
            | PriceTrendError::MissingColumn => 4,
        };
        std::process::ExitCode::from(code)
    }
}
