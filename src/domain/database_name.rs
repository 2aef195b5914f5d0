//! Validation of the database name supplied at startup.

use crate::domain::error::PriceTrendError;

pub const MAX_DATABASE_NAME_LEN: usize = 63;

/// Accepts 1-63 ASCII letters, digits, `_` or `-`. The name ends up in a file
/// path or a PostgreSQL database name, so anything else is refused.
pub fn validate_database_name(name: &str) -> Result<(), PriceTrendError> {
    let invalid = |reason: &str| PriceTrendError::InvalidDatabaseName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if name.len() > MAX_DATABASE_NAME_LEN {
        return Err(invalid("longer than 63 characters"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(invalid(&format!("unexpected character {c:?}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        assert!(validate_database_name("topten_crypto").is_ok());
        assert!(validate_database_name("prices-2024").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert!(validate_database_name("").is_err());
    }

    #[test]
    fn rejects_path_separators_and_dots() {
        assert!(validate_database_name("../etc").is_err());
        assert!(validate_database_name("a/b").is_err());
        assert!(validate_database_name("a.b").is_err());
        assert!(validate_database_name("with space").is_err());
    }

    #[test]
    fn rejects_overlong() {
        let name = "a".repeat(MAX_DATABASE_NAME_LEN + 1);
        match validate_database_name(&name) {
            Err(PriceTrendError::InvalidDatabaseName { reason, .. }) => {
                assert!(reason.contains("63"));
            }
            other => panic!("expected InvalidDatabaseName, got {other:?}"),
        }
        assert!(validate_database_name(&"a".repeat(MAX_DATABASE_NAME_LEN)).is_ok());
    }
}
