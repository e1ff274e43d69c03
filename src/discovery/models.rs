//! Records produced by link discovery.

use serde::Serialize;

/// A board from the README together with its marketplace link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    /// Board name, the list item text before the first `(`
    pub board_name: String,
    /// Absolute marketplace URL
    pub link: String,
    /// Visible anchor text
    pub link_text: String,
}

impl LinkRecord {
    /// Creates a new link record.
    pub fn new(
        board_name: impl Into<String>,
        link: impl Into<String>,
        link_text: impl Into<String>,
    ) -> Self {
        Self { board_name: board_name.into(), link: link.into(), link_text: link_text.into() }
    }
}
