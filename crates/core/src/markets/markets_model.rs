use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::securities::Exchange;

/// Market groups, each owning a fixed set of exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketKind {
    /// Mainland China: Shanghai and Shenzhen
    Cn,
    Hk,
    Us,
    /// Beijing Stock Exchange
    Bse,
}

impl MarketKind {
    pub const ALL: [MarketKind; 4] = [MarketKind::Cn, MarketKind::Hk, MarketKind::Us, MarketKind::Bse];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketKind::Cn => "cn",
            MarketKind::Hk => "hk",
            MarketKind::Us => "us",
            MarketKind::Bse => "bse",
        }
    }

    /// The exchange partition refreshed and read by this market.
    pub fn exchanges(&self) -> &'static [Exchange] {
        match self {
            MarketKind::Cn => &[Exchange::Sh, Exchange::Sz],
            MarketKind::Hk => &[Exchange::Hk],
            MarketKind::Us => &[Exchange::Us],
            MarketKind::Bse => &[Exchange::Bse],
        }
    }

    /// Regular continuous-trading sessions in exchange local time.
    pub fn trading_hours(&self) -> TradingHours {
        match self {
            MarketKind::Cn | MarketKind::Bse => TradingHours::new(
                chrono_tz::Asia::Shanghai,
                vec![TradingSession::new(9, 30, 11, 30), TradingSession::new(13, 0, 15, 0)],
            ),
            MarketKind::Hk => TradingHours::new(
                chrono_tz::Asia::Hong_Kong,
                vec![TradingSession::new(9, 30, 12, 0), TradingSession::new(13, 0, 16, 0)],
            ),
            MarketKind::Us => TradingHours::new(
                chrono_tz::America::New_York,
                vec![TradingSession::new(9, 30, 16, 0)],
            ),
        }
    }
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cn" => Ok(MarketKind::Cn),
            "hk" => Ok(MarketKind::Hk),
            "us" => Ok(MarketKind::Us),
            "bse" => Ok(MarketKind::Bse),
            other => Err(Error::Config(format!(
                "unknown market '{}', expected one of cn, hk, us, bse",
                other
            ))),
        }
    }
}

/// A continuous-trading window, `[open, close)` in exchange local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingSession {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl TradingSession {
    fn new(open_hour: u32, open_minute: u32, close_hour: u32, close_minute: u32) -> Self {
        Self {
            open: NaiveTime::from_hms_opt(open_hour, open_minute, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(close_hour, close_minute, 0).unwrap_or_default(),
        }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.open && time < self.close
    }
}

impl fmt::Display for TradingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.open.format("%H:%M"), self.close.format("%H:%M"))
    }
}

/// Weekday trading sessions of a market. Holidays and auctions are not modelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingHours {
    pub timezone: Tz,
    pub sessions: Vec<TradingSession>,
}

impl TradingHours {
    pub fn new(timezone: Tz, sessions: Vec<TradingSession>) -> Self {
        Self { timezone, sessions }
    }

    pub fn is_open_at(&self, instant: DateTime<Utc>) -> bool {
        let local = instant.with_timezone(&self.timezone);
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        let time = local.time();
        self.sessions.iter().any(|session| session.contains(time))
    }
}

impl fmt::Display for TradingHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sessions: Vec<String> = self.sessions.iter().map(ToString::to_string).collect();
        write!(f, "{} {}", self.timezone, sessions.join(", "))
    }
}
