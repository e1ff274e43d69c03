//! CLI command implementations.

pub mod prices;

pub use prices::{PricesCommand, RunReport};
