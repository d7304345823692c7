//! HKEX list-of-securities provider.
//!
//! HKEX publishes the full securities list as a single xlsx workbook. The
//! first two rows carry a title and a date stamp; the header row is row 2
//! (zero-based). Columns are selected by header name, not position.

use std::io::Cursor;

use async_trait::async_trait;
use calamine::{Data, Reader, Xlsx};

use crate::errors::MarketDataError;
use crate::models::RawListing;
use crate::provider::http::UpstreamClient;
use crate::provider::DocumentSource;

const DOCUMENT_URL: &str = "https://sc.hkex.com.hk/TuniS/www.hkex.com.hk/chi/services/trading/securities/securitieslists/ListOfSecurities_c.xlsx";
const REFERER: &str = "https://www.hkex.com.hk/";
const PROVIDER_ID: &str = "HKEX";

/// Zero-based row index of the header row
const HEADER_ROW: usize = 2;

const COL_CODE: &str = "股份代號";
const COL_NAME: &str = "股份名稱";
const COL_CATEGORY: &str = "分類";
const COL_SUB_CATEGORY: &str = "次分類";
const COL_CURRENCY: &str = "交易貨幣";

/// Spreadsheet source for the Hong Kong listing.
pub struct HkexSource {
    client: UpstreamClient,
    url: String,
}

impl HkexSource {
    pub fn new(client: UpstreamClient) -> Self {
        Self {
            client,
            url: DOCUMENT_URL.to_string(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl DocumentSource for HkexSource {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_listings(&self) -> Result<Vec<RawListing>, MarketDataError> {
        let bytes = self.client.get_bytes(PROVIDER_ID, &self.url, REFERER).await?;
        let grid = read_first_sheet(bytes)?;
        listings_from_grid(&grid)
    }
}

/// Read the first worksheet into a grid of display strings.
///
/// Grid indices are absolute sheet positions: leading blank rows and columns,
/// which calamine trims from the range, are restored as empty cells.
fn read_first_sheet(bytes: Vec<u8>) -> Result<Vec<Vec<String>>, MarketDataError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).map_err(|e| {
        MarketDataError::schema_drift(PROVIDER_ID, format!("not a readable workbook: {}", e))
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| MarketDataError::schema_drift(PROVIDER_ID, "workbook has no sheets"))?
        .map_err(|e| MarketDataError::schema_drift(PROVIDER_ID, format!("unreadable sheet: {}", e)))?;

    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    let mut grid: Vec<Vec<String>> = vec![Vec::new(); first_row as usize];
    grid.extend(range.rows().map(|row| {
        let mut cells = vec![String::new(); first_col as usize];
        cells.extend(row.iter().map(cell_text));
        cells
    }));
    Ok(grid)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        // Codes are stored as numbers; 1.0 must read back as "1"
        Data::Float(f) if f.fract() == 0.0 => format!("{:.0}", f),
        other => other.to_string(),
    }
}

/// Turn the sheet grid into raw rows, keyed by the header row's column names.
pub fn listings_from_grid(grid: &[Vec<String>]) -> Result<Vec<RawListing>, MarketDataError> {
    let header = grid.get(HEADER_ROW).ok_or_else(|| {
        MarketDataError::schema_drift(PROVIDER_ID, format!("sheet has fewer than {} rows", HEADER_ROW + 1))
    })?;

    let column = |name: &str| {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| MarketDataError::schema_drift(PROVIDER_ID, format!("missing column {}", name)))
    };
    let code_idx = column(COL_CODE)?;
    let name_idx = column(COL_NAME)?;
    let category_idx = column(COL_CATEGORY)?;
    let sub_category_idx = column(COL_SUB_CATEGORY)?;
    let currency_idx = column(COL_CURRENCY)?;

    let cell = |row: &[String], idx: usize| row.get(idx).map(|s| s.trim().to_string()).unwrap_or_default();

    Ok(grid
        .iter()
        .skip(HEADER_ROW + 1)
        .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
        .map(|row| RawListing {
            code: cell(row, code_idx),
            name: cell(row, name_idx),
            board: cell(row, sub_category_idx),
            category: Some(cell(row, category_idx)),
            currency: Some(cell(row, currency_idx)),
        })
        .collect())
}
