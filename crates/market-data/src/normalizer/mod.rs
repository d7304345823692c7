//! Per-exchange normalization of raw listing rows.
//!
//! Turns whatever a source delivered into canonical [`SecurityRecord`]s:
//! codes are padded to the exchange width, upstream board taxonomies are
//! collapsed onto [`Board`], rows outside the tradable set are dropped, and
//! the output is unique per `(exchange, code)`.

use std::collections::HashSet;

use log::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{Board, Exchange, RawListing, SecurityRecord};

/// HKEX category kept for ingestion
const HK_EQUITY_CATEGORY: &str = "股本";
const HK_CURRENCY: &str = "HKD";
const HK_MAIN_BOARD: &str = "股本證券(主板)";
const HK_GEM_BOARD: &str = "股本證券(創業板)";

/// Normalize the raw rows of one exchange.
///
/// Fails on the first row whose board cannot be mapped.
pub fn normalize(
    exchange: Exchange,
    rows: Vec<RawListing>,
) -> Result<Vec<SecurityRecord>, MarketDataError> {
    let received = rows.len();
    let mut seen = HashSet::with_capacity(received);
    let mut records = Vec::with_capacity(received);
    let mut filtered = 0usize;
    let mut empty_codes = 0usize;
    let mut duplicates = 0usize;

    for row in rows {
        let board = match map_board(exchange, &row)? {
            Some(board) => board,
            None => {
                filtered += 1;
                continue;
            }
        };

        let code = match exchange.code_width() {
            Some(width) => pad_code(&row.code, width),
            None => row.code.trim().to_string(),
        };
        if code.is_empty() {
            empty_codes += 1;
            continue;
        }

        if !seen.insert(code.clone()) {
            duplicates += 1;
            continue;
        }

        records.push(SecurityRecord {
            exchange,
            code,
            name: row.name.trim().to_string(),
            board,
        });
    }

    if empty_codes > 0 {
        warn!(
            "{}: dropped {} rows without a security code",
            exchange, empty_codes
        );
    }
    if duplicates > 0 {
        warn!("{}: dropped {} duplicate codes", exchange, duplicates);
    }
    debug!(
        "{}: normalized {} of {} rows ({} outside the tradable set)",
        exchange,
        records.len(),
        received,
        filtered
    );

    Ok(records)
}

/// Left-pad `raw` with zeros to `width` after stripping any `.suffix`.
///
/// A missing upstream code (rendered `nan`) normalizes to the empty string.
///
/// ```
/// use secmaster_market_data::normalizer::pad_code;
///
/// assert_eq!(pad_code("1.SZ", 6), "000001");
/// assert_eq!(pad_code("nan", 6), "");
/// ```
pub fn pad_code(raw: &str, width: usize) -> String {
    let head = raw.trim().split('.').next().unwrap_or_default();
    if head.is_empty() || head.eq_ignore_ascii_case("nan") {
        return String::new();
    }
    format!("{:0>width$}", head, width = width).replace("000nan", "")
}

/// Map a row onto a board, `Ok(None)` when the row is outside the tradable set.
fn map_board(exchange: Exchange, row: &RawListing) -> Result<Option<Board>, MarketDataError> {
    match exchange {
        Exchange::Sz => sz_board(&row.board).map(Some).ok_or_else(|| unmapped(exchange, row)),
        Exchange::Sh => match row.board.parse::<Board>() {
            Ok(board @ (Board::AShares | Board::Star)) => Ok(Some(board)),
            _ => Err(unmapped(exchange, row)),
        },
        Exchange::Hk => Ok(hk_board(row)),
        Exchange::Us => Ok(Some(Board::All)),
        Exchange::Bse => Ok(Some(Board::AShares)),
    }
}

/// Collapse the Shenzhen taxonomy (main board, SME board, ChiNext) onto two labels.
fn sz_board(raw: &str) -> Option<Board> {
    match raw.trim() {
        "A-shares" | "主板" | "主板A股" | "中小企业板" | "中小板" | "A股" => Some(Board::AShares),
        "ChiNext" | "创业板" | "创业板A股" => Some(Board::ChiNext),
        _ => None,
    }
}

/// Keep HKD ordinary shares on the main board or GEM; drop everything else.
fn hk_board(row: &RawListing) -> Option<Board> {
    if row.category.as_deref().map(str::trim) != Some(HK_EQUITY_CATEGORY) {
        return None;
    }
    if row.currency.as_deref().map(str::trim) != Some(HK_CURRENCY) {
        return None;
    }
    match row.board.trim() {
        HK_MAIN_BOARD => Some(Board::Main),
        HK_GEM_BOARD => Some(Board::Gem),
        _ => None,
    }
}

fn unmapped(exchange: Exchange, row: &RawListing) -> MarketDataError {
    MarketDataError::UnmappedBoard {
        exchange: exchange.to_string(),
        board: row.board.clone(),
    }
}
