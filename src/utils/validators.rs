use crate::error::EtlError;

/// Postgres truncates identifiers longer than this many bytes
const MAX_IDENTIFIER_LEN: usize = 63;

/// Validate a database name before it is quoted into `DROP/CREATE DATABASE`.
///
/// Identifiers cannot be bound as statement parameters, so only plain names
/// (ASCII letters, digits, underscores, not starting with a digit) are allowed.
pub fn validate_database_name(name: &str) -> Result<(), EtlError> {
    if name.is_empty() || name.len() > MAX_IDENTIFIER_LEN {
        return Err(EtlError::Config(format!(
            "Database name must be between 1 and {} characters",
            MAX_IDENTIFIER_LEN
        )));
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(EtlError::Config(format!(
            "Database name '{}' must not start with a digit",
            name
        )));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(EtlError::Config(format!(
            "Database name '{}' can only contain ASCII letters, digits, and underscores",
            name
        )));
    }

    Ok(())
}

/// Quote an already validated identifier for Postgres
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
