//! board-prices - AliExpress price tracker for the boards a GitHub README lists
//!
//! Reads the "Current Supported Boards" section of a repository README over
//! plain HTTP, opens each board's marketplace link in a WebDriver-controlled
//! Chrome, and exports the current and original prices to a spreadsheet.

pub mod browser;
pub mod commands;
pub mod config;
pub mod discovery;
pub mod format;
pub mod pricing;
pub mod report;
pub mod selectors;

pub use config::{Config, TimeoutProfile};
pub use discovery::LinkRecord;
pub use pricing::{PriceError, PriceResult, ResultRow};
