//! Upstream listing sources.
//!
//! This module contains:
//! - The `PagedSource` and `DocumentSource` traits every source implements
//! - The shared `UpstreamClient` (timeouts, browser headers, status mapping)
//! - Concrete sources: Eastmoney (SZ, US, BSE), SSE (SH), HKEX (HK)
//!
//! Sources return raw rows only. Padding, board mapping and filtering belong
//! to the normalizer.

pub mod http;
mod traits;

pub mod eastmoney;
pub mod hkex;
pub mod sse;

use serde_json::Value;

pub use http::UpstreamClient;
pub use traits::{DocumentSource, PagedSource};

/// Render a JSON scalar as the text stored in a listing column.
///
/// `null` becomes the empty string; whole numbers lose any fractional part.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_u64() {
                i.to_string()
            } else if let Some(f) = n.as_f64().filter(|f| f.fract() == 0.0) {
                format!("{:.0}", f)
            } else {
                n.to_string()
            }
        }
        other => other.to_string(),
    }
}
