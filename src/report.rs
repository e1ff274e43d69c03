//! Progress reporting for a batch run.

use crate::discovery::LinkRecord;
use crate::pricing::ResultRow;
use std::path::Path;
use tracing::{error, info, warn};

/// Observer for batch progress. Every method defaults to a no-op.
pub trait Reporter: Send + Sync {
    fn discovered(&self, _count: usize) {}

    fn no_links(&self) {}

    /// `position` is one-based.
    fn processing(&self, _position: usize, _total: usize, _record: &LinkRecord) {}

    fn row_done(&self, _row: &ResultRow) {}

    fn saved(&self, _path: &Path) {}

    fn save_failed(&self, _path: &Path, _error: &anyhow::Error) {}
}

/// Reports through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn discovered(&self, count: usize) {
        info!("Found {} links to process", count);
    }

    fn no_links(&self) {
        warn!("No links found!");
    }

    fn processing(&self, position: usize, total: usize, record: &LinkRecord) {
        info!("Processing {}/{}: {}", position, total, record.board_name);
        info!("URL: {}", record.link);
    }

    fn row_done(&self, row: &ResultRow) {
        info!("Price: {}", row.current_price.as_deref().unwrap_or("N/A"));
        if let Some(error) = &row.error {
            warn!("Error: {}", error);
        }
    }

    fn saved(&self, path: &Path) {
        info!("All done! Results saved to {}", path.display());
    }

    fn save_failed(&self, path: &Path, error: &anyhow::Error) {
        error!("Error saving to {}: {:#}", path.display(), error);
    }
}
