use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use log::{info, warn};

use secmaster_core::constants::SECURITY_TABLE;
use secmaster_core::errors::{DatabaseError, Error, Result};
use secmaster_core::securities::{
    Exchange, InsertMode, InsertReport, PartitionReport, SecurityFilter, SecurityRecord,
    SecurityRepositoryTrait, TableCreation,
};

use super::model::{NameRow, SecurityDB, SECURITY_COLUMNS};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{security, table_registry};
use crate::utils::{chunk_rows_for_sqlite, validate_identifier};

/// Repository for the security reference table
pub struct SecurityRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SecurityRepository {
    /// Creates a new SecurityRepository instance
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn table_exists_on(conn: &mut SqliteConnection, table: &str) -> Result<bool> {
    let rows = sql_query(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND lower(name) = lower(?)",
    )
    .bind::<Text, _>(table)
    .load::<NameRow>(conn)
    .map_err(StorageError::from)?;
    Ok(!rows.is_empty())
}

/// Column names of `table`, lowercased.
fn table_columns(conn: &mut SqliteConnection, table: &str) -> Result<Vec<String>> {
    let rows = sql_query(format!("PRAGMA table_info({})", table))
        .load::<NameRow>(conn)
        .map_err(StorageError::from)?;
    Ok(rows.into_iter().map(|r| r.name.to_lowercase()).collect())
}

fn ensure_compatible(conn: &mut SqliteConnection, table: &str) -> Result<()> {
    let columns = table_columns(conn, table)?;
    let missing: Vec<&str> = SECURITY_COLUMNS
        .iter()
        .copied()
        .filter(|c| !columns.iter().any(|existing| existing == c))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::Database(DatabaseError::SchemaMismatch(format!(
            "{} lacks columns {}",
            table,
            missing.join(", ")
        ))))
    }
}

/// Create `table` and record it in the bookkeeping table.
///
/// `replacing` is set when the caller has just dropped the table itself.
/// Otherwise the result tells a first creation apart from a table that had
/// been created before and has since disappeared.
fn create_table(
    conn: &mut SqliteConnection,
    table: &str,
    replacing: bool,
) -> Result<TableCreation> {
    let key = table.to_uppercase();
    let recorded = table_registry::table
        .filter(table_registry::name.eq(&key))
        .count()
        .get_result::<i64>(conn)
        .map_err(StorageError::from)?
        > 0;

    sql_query(format!(
        "CREATE TABLE {} (
            exchange TEXT NOT NULL,
            code TEXT NOT NULL,
            name TEXT NOT NULL,
            board TEXT NOT NULL,
            PRIMARY KEY (exchange, code)
        )",
        table
    ))
    .execute(conn)
    .map_err(StorageError::from)?;

    diesel::replace_into(table_registry::table)
        .values((
            table_registry::name.eq(&key),
            table_registry::created_at.eq(Utc::now().to_rfc3339()),
        ))
        .execute(conn)
        .map_err(StorageError::from)?;

    if replacing {
        info!("Replaced table {}", table);
        Ok(TableCreation::Replaced)
    } else if recorded {
        warn!("Table {} was expected but missing; recreated it", table);
        Ok(TableCreation::MissingExpected)
    } else {
        info!("Created table {}", table);
        Ok(TableCreation::FirstRun)
    }
}

fn insert_rows(conn: &mut SqliteConnection, table: &str, rows: &[SecurityDB]) -> Result<usize> {
    let mut written = 0;
    for chunk in chunk_rows_for_sqlite(rows, SECURITY_COLUMNS.len()) {
        let placeholders = vec!["(?, ?, ?, ?)"; chunk.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            table,
            SECURITY_COLUMNS.join(", "),
            placeholders
        );

        let mut query = sql_query(sql).into_boxed::<Sqlite>();
        for row in chunk {
            query = query
                .bind::<Text, _>(row.exchange.clone())
                .bind::<Text, _>(row.code.clone())
                .bind::<Text, _>(row.name.clone())
                .bind::<Text, _>(row.board.clone());
        }
        written += query.execute(conn).map_err(StorageError::from)?;
    }
    Ok(written)
}

#[async_trait]
impl SecurityRepositoryTrait for SecurityRepository {
    fn table_exists(&self, table: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        table_exists_on(&mut conn, table)
    }

    async fn execute(&self, statement: &str, params: Vec<String>) -> Result<usize> {
        let statement = statement.to_string();
        self.writer
            .exec(move |conn| {
                let mut query = sql_query(statement).into_boxed::<Sqlite>();
                for param in params {
                    query = query.bind::<Text, _>(param);
                }
                Ok(query.execute(conn).map_err(StorageError::from)?)
            })
            .await
    }

    async fn insert(
        &self,
        table: &str,
        rows: Vec<SecurityRecord>,
        mode: InsertMode,
    ) -> Result<InsertReport> {
        validate_identifier(table)?;
        let table = table.to_string();
        let rows: Vec<SecurityDB> = rows.iter().map(SecurityDB::from).collect();

        self.writer
            .exec(move |conn| {
                let exists = table_exists_on(conn, &table)?;
                let created = match mode {
                    InsertMode::Append if exists => {
                        ensure_compatible(conn, &table)?;
                        None
                    }
                    InsertMode::Replace if exists => {
                        sql_query(format!("DROP TABLE {}", table))
                            .execute(conn)
                            .map_err(StorageError::from)?;
                        Some(create_table(conn, &table, true)?)
                    }
                    InsertMode::Fail if exists => {
                        return Err(Error::Database(DatabaseError::TableExists(table.clone())));
                    }
                    _ => Some(create_table(conn, &table, false)?),
                };

                let rows_written = insert_rows(conn, &table, &rows)?;
                Ok(InsertReport {
                    rows_written,
                    created,
                })
            })
            .await
    }

    fn query(&self, filter: &SecurityFilter) -> Result<Vec<SecurityRecord>> {
        let mut conn = get_connection(&self.pool)?;
        if !table_exists_on(&mut conn, SECURITY_TABLE)? {
            return Ok(Vec::new());
        }

        let mut query = security::table
            .select(SecurityDB::as_select())
            .order((security::exchange.asc(), security::code.asc()))
            .into_boxed();
        if !filter.exchanges.is_empty() {
            let codes: Vec<&str> = filter.exchanges.iter().map(Exchange::as_str).collect();
            query = query.filter(security::exchange.eq_any(codes));
        }

        let rows = query
            .load::<SecurityDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(SecurityRecord::try_from).collect()
    }

    async fn replace_partition(
        &self,
        exchanges: &[Exchange],
        rows: Vec<SecurityRecord>,
    ) -> Result<PartitionReport> {
        if let Some(stray) = rows.iter().find(|r| !exchanges.contains(&r.exchange)) {
            return Err(Error::Unexpected(format!(
                "row {}.{} is outside the partition being replaced",
                stray.exchange, stray.code
            )));
        }

        let codes: Vec<String> = exchanges.iter().map(|e| e.as_str().to_string()).collect();
        let rows: Vec<SecurityDB> = rows.iter().map(SecurityDB::from).collect();

        self.writer
            .exec(move |conn| {
                let created = if table_exists_on(conn, SECURITY_TABLE)? {
                    ensure_compatible(conn, SECURITY_TABLE)?;
                    None
                } else {
                    Some(create_table(conn, SECURITY_TABLE, false)?)
                };

                let deleted = diesel::delete(security::table.filter(security::exchange.eq_any(&codes)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                let inserted = insert_rows(conn, SECURITY_TABLE, &rows)?;

                Ok(PartitionReport {
                    deleted,
                    inserted,
                    created,
                })
            })
            .await
    }
}
