//! Identifier validation for generated SQL.
//!
//! Column names reach the aggregation queries from configuration and from CSV
//! headers, so they are validated and quoted before being spliced into SQL.

use crate::error::{AurelionError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// SQL identifier validation and escaping utilities.
pub struct SqlSecurity;

impl SqlSecurity {
    /// Validates and quotes a SQL identifier (table or column name).
    ///
    /// # Examples
    /// ```rust
    /// use aurelion_analytics::security::SqlSecurity;
    ///
    /// assert_eq!(SqlSecurity::escape_identifier("id_cliente").unwrap(), "\"id_cliente\"");
    /// assert!(SqlSecurity::escape_identifier("id; DROP TABLE ventas--").is_err());
    /// ```
    pub fn escape_identifier(identifier: &str) -> Result<String> {
        Self::validate_identifier(identifier)?;
        let escaped = identifier.replace('"', "\"\"");
        Ok(format!("\"{escaped}\""))
    }

    /// Validates a SQL identifier without quoting it.
    pub fn validate_identifier(identifier: &str) -> Result<()> {
        if identifier.trim().is_empty() {
            return Err(AurelionError::SecurityError(
                "SQL identifier cannot be empty or whitespace-only".to_string(),
            ));
        }

        if identifier.len() > 128 {
            return Err(AurelionError::SecurityError(
                "SQL identifier too long (max 128 characters)".to_string(),
            ));
        }

        // Letters of any script so Spanish headers ("categoría") pass.
        static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
            #[allow(clippy::expect_used)]
            Regex::new(r"^[\p{L}_][\p{L}\p{N}_]*$")
                .expect("Hard-coded regex pattern should be valid")
        });

        if !IDENTIFIER_REGEX.is_match(identifier) {
            return Err(AurelionError::SecurityError(format!(
                "Invalid SQL identifier format: '{identifier}'. Identifiers must start with a letter or underscore and contain only letters, numbers and underscores"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert_eq!(
            SqlSecurity::escape_identifier("medio_pago").unwrap(),
            "\"medio_pago\""
        );
        assert!(SqlSecurity::escape_identifier("_private").is_ok());
        assert!(SqlSecurity::escape_identifier("categoría").is_ok());
        assert!(SqlSecurity::escape_identifier("ID_Cliente").is_ok());
    }

    #[test]
    fn test_rejected_identifiers() {
        assert!(SqlSecurity::validate_identifier("").is_err());
        assert!(SqlSecurity::validate_identifier("   ").is_err());
        assert!(SqlSecurity::validate_identifier("1st_column").is_err());
        assert!(SqlSecurity::validate_identifier("id\"; DROP TABLE ventas").is_err());
        assert!(SqlSecurity::validate_identifier("a b").is_err());
        assert!(SqlSecurity::validate_identifier(&"x".repeat(129)).is_err());
    }
}
