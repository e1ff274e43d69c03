//! WebDriver-backed browser using fantoccini.

use super::{Browser, BrowserError, Page};
use crate::config::BrowserConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::wd::{TimeoutConfiguration, WindowHandle};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, info};

/// Extra time given to the driver before the local navigation guard fires.
const NAVIGATION_GRACE: Duration = Duration::from_secs(2);

/// A Chrome session driven through a WebDriver endpoint (chromedriver).
///
/// Every page is a new tab; the tab the session started with stays open as
/// the home window so the session survives closing the last page.
pub struct WebDriverBrowser {
    client: Client,
    home: WindowHandle,
}

impl WebDriverBrowser {
    /// Connects to the WebDriver service and starts a session.
    pub async fn connect(config: &BrowserConfig) -> Result<Self> {
        info!("Starting browser session via {}", config.webdriver_url);

        let caps = build_capabilities(config);
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&config.webdriver_url)
            .await
            .with_context(|| {
                format!("Failed to connect to WebDriver at {}", config.webdriver_url)
            })?;

        client
            .set_window_size(config.window_width, config.window_height)
            .await
            .context("Failed to size browser window")?;

        let home = client.window().await.context("Failed to read the initial window handle")?;

        info!("Browser launched successfully");
        Ok(Self { client, home })
    }
}

fn build_capabilities(config: &BrowserConfig) -> Map<String, Value> {
    let mut args = vec![
        json!(format!("--window-size={},{}", config.window_width, config.window_height)),
        json!("--lang=en-US"),
    ];

    if config.headless {
        args.push(json!("--headless=new"));
        args.push(json!("--disable-gpu"));
    }

    let mut caps = Map::new();
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn new_page(&self) -> Result<Box<dyn Page>, BrowserError> {
        let window = self.client.new_window(true).await.map_err(driver_error)?;
        self.client.switch_to_window(window.handle.clone()).await.map_err(driver_error)?;

        Ok(Box::new(WebDriverPage {
            client: self.client.clone(),
            home: self.home.clone(),
            closed: false,
        }))
    }

    async fn shutdown(&self) -> Result<(), BrowserError> {
        info!("Closing browser...");
        self.client.clone().close().await.map_err(driver_error)?;
        info!("Browser closed");
        Ok(())
    }
}

/// One browser tab. The session has it focused until it is closed.
struct WebDriverPage {
    client: Client,
    home: WindowHandle,
    closed: bool,
}

#[async_trait]
impl Page for WebDriverPage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.client
            .update_timeouts(TimeoutConfiguration::new(None, Some(timeout), None))
            .await
            .map_err(driver_error)?;

        match tokio::time::timeout(timeout + NAVIGATION_GRACE, self.client.goto(url)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) if is_driver_timeout(&e) => Err(BrowserError::NavigationTimeout(timeout)),
            Ok(Err(e)) => Err(driver_error(e)),
            Err(_) => Err(BrowserError::NavigationTimeout(timeout)),
        }
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let waited =
            self.client.wait().at_most(timeout).for_element(Locator::Css(selector)).await;

        match waited {
            Ok(_) => Ok(()),
            Err(e) if matches!(e, CmdError::WaitTimeout) || is_driver_timeout(&e) => {
                Err(BrowserError::SelectorTimeout { selector: selector.to_string(), timeout })
            }
            Err(e) => Err(driver_error(e)),
        }
    }

    async fn text_content(&mut self, selector: &str) -> Result<Option<String>, BrowserError> {
        let elements = self.client.find_all(Locator::Css(selector)).await.map_err(driver_error)?;

        let Some(element) = elements.into_iter().next() else {
            return Ok(None);
        };

        let text = element.prop("textContent").await.map_err(driver_error)?;
        Ok(text.map(|t| t.trim().to_string()))
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        debug!("Closing page");
        // Refocus home even when the tab refused to close, or every later
        // command would target a dead window.
        let closed = self.client.close_window().await.map_err(driver_error);
        let refocused =
            self.client.switch_to_window(self.home.clone()).await.map_err(driver_error);
        closed.and(refocused)
    }
}

fn is_driver_timeout(e: &CmdError) -> bool {
    matches!(e, CmdError::Standard(w) if w.error == ErrorStatus::Timeout)
}

fn driver_error(e: CmdError) -> BrowserError {
    BrowserError::Driver(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fantoccini::error::WebDriver;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn browser_config(headless: bool) -> BrowserConfig {
        BrowserConfig { headless, ..BrowserConfig::default() }
    }

    fn args(caps: &Map<String, Value>) -> Vec<String> {
        caps["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_capabilities_windowed() {
        let caps = build_capabilities(&browser_config(false));
        let args = args(&caps);

        assert!(args.contains(&"--window-size=1280,720".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--headless")));
    }

    #[test]
    fn test_capabilities_headless() {
        let caps = build_capabilities(&browser_config(true));
        let args = args(&caps);

        assert!(args.contains(&"--headless=new".to_string()));
        assert!(args.contains(&"--disable-gpu".to_string()));
    }

    #[test]
    fn test_wait_timeout_is_not_a_driver_timeout() {
        assert!(!is_driver_timeout(&CmdError::WaitTimeout));
    }

    #[test]
    fn test_page_load_timeout_status_is_a_driver_timeout() {
        let timeout = CmdError::Standard(WebDriver::new(ErrorStatus::Timeout, "page load"));
        assert!(is_driver_timeout(&timeout));

        let gone = CmdError::Standard(WebDriver::new(ErrorStatus::NoSuchWindow, "closed"));
        assert!(!is_driver_timeout(&gone));
    }

    async fn session(server: &MockServer) -> Client {
        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": { "sessionId": "s1", "capabilities": {} }
            })))
            .mount(server)
            .await;

        ClientBuilder::native().connect(&server.uri()).await.unwrap()
    }

    #[tokio::test]
    async fn test_close_refocuses_home_when_tab_close_fails() {
        let server = MockServer::start().await;
        let client = session(&server).await;

        Mock::given(method("DELETE"))
            .and(path("/session/s1/window"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "value": { "error": "unknown error", "message": "tab crashed" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/session/s1/window"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
            .expect(1)
            .mount(&server)
            .await;

        let mut page = WebDriverPage {
            client,
            home: WindowHandle::try_from("home".to_string()).unwrap(),
            closed: false,
        };

        assert!(page.close().await.is_err());
        // Second close is a no-op
        assert!(page.close().await.is_ok());

        server.verify().await;
    }
}
