//! Batch run: discover links, read every price, export the sheet.

use crate::browser::{Browser, WebDriverBrowser};
use crate::config::Config;
use crate::discovery::{Discoverer, DocsClient, DocsSource};
use crate::format::{output_filename, Formatter};
use crate::pricing::{PriceExtractor, ResultRow};
use crate::report::Reporter;
use anyhow::{Context, Result};
use chrono::Local;
use std::path::PathBuf;
use tracing::error;

/// What a run produced.
#[derive(Debug, Default)]
pub struct RunReport {
    /// One row per discovered link, in discovery order
    pub rows: Vec<ResultRow>,
    /// Export file, if one was written
    pub saved_to: Option<PathBuf>,
}

/// Executes the price run.
pub struct PricesCommand {
    config: Config,
}

impl PricesCommand {
    /// Creates a new prices command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Starts the HTTP client and browser session, runs the batch, and shuts
    /// the browser down again.
    pub async fn execute(&self, reporter: &dyn Reporter) -> Result<RunReport> {
        let docs = DocsClient::new(&self.config).context("Failed to create HTTP client")?;
        let browser = WebDriverBrowser::connect(&self.config.browser)
            .await
            .context("Failed to start browser session")?;

        Ok(self.execute_in_session(&docs, &browser, reporter).await)
    }

    /// Runs the batch with provided sessions and releases the browser on every
    /// path.
    pub async fn execute_in_session<S, B>(
        &self,
        docs: &S,
        browser: &B,
        reporter: &dyn Reporter,
    ) -> RunReport
    where
        S: DocsSource + ?Sized,
        B: Browser + ?Sized,
    {
        let report = self.execute_with(docs, browser, reporter).await;

        if let Err(e) = browser.shutdown().await {
            error!("Error during browser shutdown: {}", e);
        }

        report
    }

    /// Runs the batch with provided sessions (for testing).
    pub async fn execute_with<S, B>(
        &self,
        docs: &S,
        browser: &B,
        reporter: &dyn Reporter,
    ) -> RunReport
    where
        S: DocsSource + ?Sized,
        B: Browser + ?Sized,
    {
        let started = Local::now();

        let records = Discoverer::new(docs, &self.config.source_url).discover().await;
        if records.is_empty() {
            reporter.no_links();
            return RunReport::default();
        }

        let total = records.len();
        reporter.discovered(total);

        let extractor = PriceExtractor::new(browser);
        let mut rows = Vec::with_capacity(total);

        for (i, record) in records.into_iter().enumerate() {
            reporter.processing(i + 1, total, &record);

            let timeouts = self.config.timeouts.profile_for(i);
            let result = extractor.fetch_price(&record.link, timeouts).await;

            let row = ResultRow::new(record, result, Local::now());
            reporter.row_done(&row);
            rows.push(row);
        }

        let path = self.config.output_dir.join(output_filename(self.config.format, started));
        let saved_to = match Formatter::new(self.config.format).write(&path, &rows) {
            Ok(()) => {
                reporter.saved(&path);
                Some(path)
            }
            Err(e) => {
                reporter.save_failed(&path, &e);
                None
            }
        };

        RunReport { rows, saved_to }
    }
}
