//! Browser automation seam.
//!
//! - [`Browser`]: a running session that hands out isolated pages
//! - [`Page`]: one tab, used for a single price fetch and then closed
//! - [`driver::WebDriverBrowser`]: the fantoccini-backed implementation
//!
//! The price extractor only talks to these traits, so tests can script
//! timeouts and failures without a real browser.

pub mod driver;

pub use driver::WebDriverBrowser;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failures reported by the browser layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowserError {
    /// The page did not reach its load event in time.
    #[error("navigation timed out after {}ms", .0.as_millis())]
    NavigationTimeout(Duration),

    /// The awaited element never appeared.
    #[error("timed out after {}ms waiting for selector {selector}", .timeout.as_millis())]
    SelectorTimeout { selector: String, timeout: Duration },

    /// Anything else the driver reported.
    #[error("{0}")]
    Driver(String),
}

impl BrowserError {
    /// True for the failures that are worth one more attempt.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::NavigationTimeout(_) | Self::SelectorTimeout { .. })
    }
}

/// A single isolated browser page.
#[async_trait]
pub trait Page: Send {
    /// Navigates to `url` and waits for the load event.
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Waits until an element matching `selector` is present.
    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError>;

    /// Trimmed text content of the first element matching `selector`, without waiting.
    async fn text_content(&mut self, selector: &str) -> Result<Option<String>, BrowserError>;

    /// Closes the page. Calling it twice is a no-op.
    async fn close(&mut self) -> Result<(), BrowserError>;
}

/// A browser session that opens pages.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Opens a fresh page that shares nothing with earlier pages of this run.
    async fn new_page(&self) -> Result<Box<dyn Page>, BrowserError>;

    /// Ends the session.
    async fn shutdown(&self) -> Result<(), BrowserError> {
        Ok(())
    }
}
