//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all ingestion operations
//! - [`RetryClass`]: Classification for deciding whether a retry is useful

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while fetching or normalizing upstream listings.
///
/// Transport problems and upstream format problems are kept apart so the
/// caller can tell "try again later" from "the upstream changed its format".
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The request could not be sent or the body could not be read.
    #[error("Network error: {provider} - {message}")]
    Network {
        /// The upstream source that failed
        provider: String,
        /// Transport error description
        message: String,
    },

    /// The request exceeded the per-request timeout.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The upstream source that timed out
        provider: String,
    },

    /// The upstream answered with a non-success HTTP status.
    #[error("Upstream {provider} returned HTTP {status}")]
    UpstreamStatus {
        /// The upstream source that answered
        provider: String,
        /// HTTP status code
        status: u16,
    },

    /// An expected field or column is missing or cannot be parsed.
    /// Retrying will not fix this.
    #[error("Schema drift in {provider}: {message}")]
    SchemaDrift {
        /// The upstream source whose payload changed
        provider: String,
        /// What was expected and not found
        message: String,
    },

    /// A row carried a board classification this exchange does not know.
    #[error("Unmapped board '{board}' for exchange {exchange}")]
    UnmappedBoard {
        /// Exchange code (e.g. "SZ")
        exchange: String,
        /// The board label as received
        board: String,
    },

    /// Ingestion settings are unusable (e.g. zero workers).
    #[error("Invalid ingestion config: {0}")]
    InvalidConfig(String),
}

impl MarketDataError {
    /// Maps a transport error from `reqwest` into the network/timeout kinds.
    pub fn from_request(provider: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                provider: provider.to_string(),
            }
        } else {
            Self::Network {
                provider: provider.to_string(),
                message: error.to_string(),
            }
        }
    }

    pub fn schema_drift(provider: &str, message: impl Into<String>) -> Self {
        Self::SchemaDrift {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use secmaster_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::Timeout { provider: "EASTMONEY".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::Transient);
    ///
    /// let error = MarketDataError::schema_drift("HKEX", "missing column 次分類");
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => RetryClass::Transient,

            // Throttling and server-side failures can clear up; client errors will not
            Self::UpstreamStatus { status, .. } => {
                if *status == 429 || *status >= 500 {
                    RetryClass::Transient
                } else {
                    RetryClass::Never
                }
            }

            Self::SchemaDrift { .. } | Self::UnmappedBoard { .. } | Self::InvalidConfig(_) => {
                RetryClass::Never
            }
        }
    }
}
