use serde::{Deserialize, Serialize};

use super::exchange::{Board, Exchange};

/// One row as delivered by an upstream source, before normalization.
///
/// `board` is the source's own classification: the query label for paged
/// sources, the raw sub-category for spreadsheet sources.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawListing {
    pub code: String,
    pub name: String,
    pub board: String,
    /// Top-level category (HKEX `分類`)
    pub category: Option<String>,
    /// Trading currency (HKEX `交易貨幣`)
    pub currency: Option<String>,
}

impl RawListing {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// One page of a paged source. Never persisted.
#[derive(Debug, Clone)]
pub struct SourcePage {
    pub page_no: usize,
    pub page_size: usize,
    /// Total row count reported by the upstream for the whole query
    pub total: usize,
    pub rows: Vec<RawListing>,
}

/// A board-level query against a paged source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardQuery {
    pub board: Board,
    /// Source-specific selector (Eastmoney `fs` filter, SSE `STOCK_TYPE`)
    pub filter: String,
}

impl BoardQuery {
    pub fn new(board: Board, filter: impl Into<String>) -> Self {
        Self {
            board,
            filter: filter.into(),
        }
    }
}

/// Canonical security row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecurityRecord {
    pub exchange: Exchange,
    pub code: String,
    pub name: String,
    pub board: Board,
}
