//! Price extraction from marketplace pages.

pub mod extractor;
pub mod models;

pub use extractor::{PriceExtractor, MAX_ATTEMPTS};
pub use models::{PriceError, PriceResult, ResultRow};
