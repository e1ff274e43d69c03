//! Per-link price extraction with a single retry on timeouts.

use crate::browser::{Browser, BrowserError, Page};
use crate::config::TimeoutProfile;
use crate::pricing::models::{PriceError, PriceResult};
use crate::selectors::price;
use tracing::{debug, info, warn};

/// Attempts per link. Only timeouts earn the second one.
pub const MAX_ATTEMPTS: u32 = 2;

/// Reads prices from marketplace pages through a [`Browser`].
pub struct PriceExtractor<'a, B: Browser + ?Sized> {
    browser: &'a B,
}

impl<'a, B: Browser + ?Sized> PriceExtractor<'a, B> {
    pub fn new(browser: &'a B) -> Self {
        Self { browser }
    }

    /// Fetches the current and original price for `url`.
    ///
    /// Never fails outright: a failure after the retry policy is exhausted is
    /// reported in [`PriceResult::error`]. Every page opened here is closed
    /// before returning.
    pub async fn fetch_price(&self, url: &str, timeouts: TimeoutProfile) -> PriceResult {
        let mut attempt = 1;

        loop {
            info!("Navigating to {} (attempt {})", url, attempt);

            let mut page = match self.browser.new_page().await {
                Ok(page) => page,
                Err(e) => {
                    warn!("Could not open a page for {}: {}", url, e);
                    return PriceResult::failed(e.into());
                }
            };

            let outcome = read_prices(page.as_mut(), url, timeouts).await;
            close_quietly(page.as_mut()).await;

            match outcome {
                Ok(result) => return result,
                Err(e) => {
                    warn!("Error on attempt {} for {}: {}", attempt, url, e);

                    if e.is_timeout() && attempt < MAX_ATTEMPTS {
                        info!("Retrying...");
                        attempt += 1;
                        continue;
                    }

                    return PriceResult::failed(PriceError::from(e));
                }
            }
        }
    }
}

/// One attempt against an already opened page.
async fn read_prices(
    page: &mut dyn Page,
    url: &str,
    timeouts: TimeoutProfile,
) -> Result<PriceResult, BrowserError> {
    page.goto(url, timeouts.navigation()).await?;

    debug!("Waiting for price selector: {}", price::CURRENT);
    page.wait_for_selector(price::CURRENT, timeouts.selector()).await?;

    let current = page.text_content(price::CURRENT).await?;
    info!("Current price: {}", current.as_deref().unwrap_or("N/A"));

    // Missing or unreadable original price is normal for items not on sale.
    let original = match page.text_content(price::ORIGINAL).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Original price element found but failed to retrieve text: {}", e);
            None
        }
    };
    if let Some(original) = &original {
        info!("Original price: {}", original);
    }

    Ok(PriceResult::found(current, original))
}

async fn close_quietly(page: &mut dyn Page) {
    if let Err(e) = page.close().await {
        debug!("Ignoring error while closing page: {}", e);
    }
}
