//! Utility functions for SQLite storage operations.
//!
//! Helpers for splitting multi-row statements so they stay under SQLite's
//! bound-parameter limit, and for checking identifiers that have to be
//! interpolated into SQL text.

use secmaster_core::errors::{DatabaseError, Error, Result};

/// Maximum number of bound parameters per statement.
///
/// SQLite has a compile-time limit on the number of parameters in a SQL statement,
/// as low as 999 (SQLITE_MAX_VARIABLE_NUMBER) on older builds. 500 leaves room
/// for any extra parameters a statement carries.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Chunk rows for a multi-row `INSERT ... VALUES (...), (...)`.
///
/// Each chunk holds as many rows as fit in [`SQLITE_MAX_PARAMS_CHUNK`] when
/// every row binds `params_per_row` parameters.
pub fn chunk_rows_for_sqlite<T>(items: &[T], params_per_row: usize) -> impl Iterator<Item = &[T]> {
    let rows_per_chunk = (SQLITE_MAX_PARAMS_CHUNK / params_per_row.max(1)).max(1);
    items.chunks(rows_per_chunk)
}

/// Reject table names that are not plain identifiers (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::Database(DatabaseError::InvalidIdentifier(
            name.to_string(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_rows_empty() {
        let items: Vec<i32> = vec![];
        assert_eq!(chunk_rows_for_sqlite(&items, 4).count(), 0);
    }

    #[test]
    fn test_chunk_rows_under_limit() {
        let items: Vec<i32> = (0..100).collect();
        let chunks: Vec<_> = chunk_rows_for_sqlite(&items, 4).collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 100);
    }

    #[test]
    fn test_chunk_rows_over_limit() {
        let items: Vec<i32> = (0..300).collect();
        let chunks: Vec<_> = chunk_rows_for_sqlite(&items, 4).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 125);
        assert_eq!(chunks[1].len(), 125);
        assert_eq!(chunks[2].len(), 50);
    }

    #[test]
    fn test_chunk_rows_wide_rows_still_progress() {
        let items: Vec<i32> = (0..3).collect();
        assert_eq!(chunk_rows_for_sqlite(&items, 1000).count(), 3);
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("SECURITY").is_ok());
        assert!(validate_identifier("_staging_2").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("2fast").is_err());
        assert!(validate_identifier("SECURITY; DROP TABLE x").is_err());
        assert!(matches!(
            validate_identifier("a-b"),
            Err(Error::Database(DatabaseError::InvalidIdentifier(_)))
        ));
    }
}
