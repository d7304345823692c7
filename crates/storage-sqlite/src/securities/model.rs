//! Database models for securities.

use diesel::prelude::*;
use diesel::sql_types::Text;

use secmaster_core::errors::{DatabaseError, Error};
use secmaster_core::securities::{Board, Exchange, SecurityRecord};

/// Column list shared by every security-shaped table, in insert order
pub const SECURITY_COLUMNS: [&str; 4] = ["exchange", "code", "name", "board"];

/// Database model for a security row
#[derive(Debug, Clone, PartialEq, Eq, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = crate::schema::security)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SecurityDB {
    pub exchange: String,
    pub code: String,
    pub name: String,
    pub board: String,
}

impl From<&SecurityRecord> for SecurityDB {
    fn from(record: &SecurityRecord) -> Self {
        Self {
            exchange: record.exchange.as_str().to_string(),
            code: record.code.clone(),
            name: record.name.clone(),
            board: record.board.label().to_string(),
        }
    }
}

impl TryFrom<SecurityDB> for SecurityRecord {
    type Error = Error;

    fn try_from(db: SecurityDB) -> Result<Self, Self::Error> {
        let exchange = db.exchange.parse::<Exchange>().map_err(|_| {
            Error::Database(DatabaseError::Internal(format!(
                "unknown exchange '{}' for {}",
                db.exchange, db.code
            )))
        })?;
        let board = db.board.parse::<Board>().map_err(|_| {
            Error::Database(DatabaseError::Internal(format!(
                "unknown board '{}' for {}.{}",
                db.board, db.exchange, db.code
            )))
        })?;

        Ok(SecurityRecord {
            exchange,
            code: db.code,
            name: db.name,
            board,
        })
    }
}

/// Row of `sqlite_master` / `PRAGMA table_info`, name column only
#[derive(Debug, QueryableByName)]
pub struct NameRow {
    #[diesel(sql_type = Text)]
    pub name: String,
}
