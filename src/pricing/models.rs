//! Price extraction results and export rows.

use crate::browser::BrowserError;
use crate::discovery::LinkRecord;
use chrono::{DateTime, Local, SecondsFormat};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Why a price could not be read, after retries were exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("Timed out (navigation)")]
    NavigationTimeout,

    #[error("Timed out (price selector)")]
    SelectorTimeout,

    #[error("Browser error: {0}")]
    Browser(String),
}

impl From<BrowserError> for PriceError {
    fn from(e: BrowserError) -> Self {
        match e {
            BrowserError::NavigationTimeout(_) => Self::NavigationTimeout,
            BrowserError::SelectorTimeout { .. } => Self::SelectorTimeout,
            BrowserError::Driver(msg) => Self::Browser(msg),
        }
    }
}

impl Serialize for PriceError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of reading one marketplace page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriceResult {
    /// Current (sale) price text, as shown
    pub current_price: Option<String>,
    /// Original price text when the item is discounted
    pub original_price: Option<String>,
    /// Set exactly when extraction failed; prices are then empty
    pub error: Option<PriceError>,
}

impl PriceResult {
    /// A successful read.
    pub fn found(current_price: Option<String>, original_price: Option<String>) -> Self {
        Self { current_price, original_price, error: None }
    }

    /// A failed read with no prices.
    pub fn failed(error: PriceError) -> Self {
        Self { current_price: None, original_price: None, error: Some(error) }
    }
}

/// One line of the exported sheet: a link, its prices and when they were read.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRow {
    pub board_name: String,
    pub link_text: String,
    pub link: String,
    pub current_price: Option<String>,
    pub original_price: Option<String>,
    pub error: Option<PriceError>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Local>,
}

impl ResultRow {
    pub fn new(record: LinkRecord, result: PriceResult, timestamp: DateTime<Local>) -> Self {
        Self {
            board_name: record.board_name,
            link_text: record.link_text,
            link: record.link,
            current_price: result.current_price,
            original_price: result.original_price,
            error: result.error,
            timestamp,
        }
    }

    /// Capture time as ISO 8601 with millisecond precision.
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, false)
    }
}

fn serialize_timestamp<S: Serializer>(
    ts: &DateTime<Local>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, false))
}
