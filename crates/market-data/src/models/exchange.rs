use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Exchanges whose listings are ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    /// Shanghai Stock Exchange
    Sh,
    /// Shenzhen Stock Exchange
    Sz,
    /// Hong Kong Exchanges
    Hk,
    /// US markets (NASDAQ, NYSE, AMEX) as one partition
    Us,
    /// Beijing Stock Exchange
    Bse,
}

impl Exchange {
    pub const ALL: [Exchange; 5] = [
        Exchange::Sh,
        Exchange::Sz,
        Exchange::Hk,
        Exchange::Us,
        Exchange::Bse,
    ];

    /// Code stored in the `exchange` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Sh => "SH",
            Exchange::Sz => "SZ",
            Exchange::Hk => "HK",
            Exchange::Us => "US",
            Exchange::Bse => "BSE",
        }
    }

    /// Canonical code width after padding, `None` when codes are kept as received.
    pub fn code_width(&self) -> Option<usize> {
        match self {
            Exchange::Sh | Exchange::Sz => Some(6),
            Exchange::Hk => Some(5),
            Exchange::Us | Exchange::Bse => None,
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SH" => Ok(Exchange::Sh),
            "SZ" => Ok(Exchange::Sz),
            "HK" => Ok(Exchange::Hk),
            "US" => Ok(Exchange::Us),
            "BSE" => Ok(Exchange::Bse),
            other => Err(MarketDataError::InvalidConfig(format!(
                "unknown exchange '{}'",
                other
            ))),
        }
    }
}

/// Board classification after normalization.
///
/// The set is closed; upstream taxonomies are collapsed onto it by the
/// normalizer of each exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Board {
    #[serde(rename = "A-shares")]
    AShares,
    #[serde(rename = "STAR")]
    Star,
    #[serde(rename = "ChiNext")]
    ChiNext,
    #[serde(rename = "Main")]
    Main,
    #[serde(rename = "GEM")]
    Gem,
    #[serde(rename = "All")]
    All,
}

impl Board {
    /// Label stored in the `board` column.
    pub fn label(&self) -> &'static str {
        match self {
            Board::AShares => "A-shares",
            Board::Star => "STAR",
            Board::ChiNext => "ChiNext",
            Board::Main => "Main",
            Board::Gem => "GEM",
            Board::All => "All",
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Board {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A-shares" => Ok(Board::AShares),
            "STAR" => Ok(Board::Star),
            "ChiNext" => Ok(Board::ChiNext),
            "Main" => Ok(Board::Main),
            "GEM" => Ok(Board::Gem),
            "All" => Ok(Board::All),
            other => Err(MarketDataError::InvalidConfig(format!(
                "unknown board label '{}'",
                other
            ))),
        }
    }
}
