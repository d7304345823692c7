//! Eastmoney `clist` response models.

use serde::Deserialize;
use serde_json::Value;

/// Top-level response of `/api/qt/clist/get`.
#[derive(Debug, Deserialize)]
pub struct ClistResponse {
    /// Return code, 0 on success
    pub rc: i64,
    /// `null` when the filter matches nothing
    #[serde(default)]
    pub data: Option<ClistData>,
}

#[derive(Debug, Deserialize)]
pub struct ClistData {
    pub total: usize,
    #[serde(default)]
    pub diff: Vec<ClistRow>,
}

/// One listing row. Codes arrive as strings or numbers depending on market.
#[derive(Debug, Deserialize)]
pub struct ClistRow {
    /// Security code
    pub f12: Value,
    /// Short name
    pub f14: Value,
}
