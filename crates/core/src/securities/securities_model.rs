use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use secmaster_market_data::{Board, Exchange, SecurityRecord};

/// How `insert` treats an existing target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertMode {
    /// Add rows to the existing table, creating it when missing
    Append,
    /// Drop the table if present, then create and insert
    Replace,
    /// Refuse when the table already exists
    Fail,
}

/// Why an insert had to create its target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableCreation {
    /// The table was never created by this store before
    FirstRun,
    /// The store created the table earlier and it has since disappeared
    MissingExpected,
    /// A replace-mode insert dropped the table and created it again
    Replaced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertReport {
    pub rows_written: usize,
    pub created: Option<TableCreation>,
}

/// Outcome of a transactional partition replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionReport {
    pub deleted: usize,
    pub inserted: usize,
    pub created: Option<TableCreation>,
}

/// Read filter for the security table. An empty exchange list matches all rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityFilter {
    pub exchanges: Vec<Exchange>,
}

impl SecurityFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn exchanges(exchanges: &[Exchange]) -> Self {
        Self {
            exchanges: exchanges.to_vec(),
        }
    }
}

/// Snapshot of one market's securities, as cached by the market service.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityList {
    exchanges: Vec<Exchange>,
    records: Vec<SecurityRecord>,
    loaded_at: DateTime<Utc>,
}

impl SecurityList {
    pub fn new(exchanges: Vec<Exchange>, records: Vec<SecurityRecord>) -> Self {
        Self {
            exchanges,
            records,
            loaded_at: Utc::now(),
        }
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn records(&self) -> &[SecurityRecord] {
        &self.records
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SecurityRecord> {
        self.records.iter()
    }

    pub fn find(&self, exchange: Exchange, code: &str) -> Option<&SecurityRecord> {
        self.records
            .iter()
            .find(|r| r.exchange == exchange && r.code == code)
    }

    /// Row counts per `(exchange, board)`.
    pub fn board_counts(&self) -> BTreeMap<(Exchange, &'static str), usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts
                .entry((record.exchange, record.board.label()))
                .or_insert(0) += 1;
        }
        counts
    }
}
