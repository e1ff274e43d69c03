//! Link discovery: README page fetch and board-link extraction.

pub mod client;
pub mod models;
pub mod parser;

pub use client::{DocsClient, DocsSource};
pub use models::LinkRecord;
pub use parser::Parser;

use anyhow::{Context, Result};
use tracing::{error, info};
use url::Url;

/// Finds the boards and their marketplace links on the source page.
pub struct Discoverer<'a, S: DocsSource + ?Sized> {
    source: &'a S,
    source_url: &'a str,
}

impl<'a, S: DocsSource + ?Sized> Discoverer<'a, S> {
    /// Creates a discoverer reading `source_url` through `source`.
    pub fn new(source: &'a S, source_url: &'a str) -> Self {
        Self { source, source_url }
    }

    /// Fetches and parses the page, returning any failure to the caller.
    pub async fn try_discover(&self) -> Result<Vec<LinkRecord>> {
        let base = Url::parse(self.source_url)
            .with_context(|| format!("Invalid source URL: {}", self.source_url))?;

        let html = self.source.fetch(self.source_url).await?;
        let records = Parser::new(base).parse_boards(&html);

        info!("Extracted {} links from {}", records.len(), self.source_url);
        Ok(records)
    }

    /// Like [`try_discover`](Self::try_discover), but a failure is logged and
    /// turned into an empty list.
    pub async fn discover(&self) -> Vec<LinkRecord> {
        match self.try_discover().await {
            Ok(records) => records,
            Err(e) => {
                error!("Link discovery failed: {:#}", e);
                Vec::new()
            }
        }
    }
}
