//! HTML parser for the README "supported boards" section.

use crate::discovery::models::LinkRecord;
use crate::selectors::boards;
use scraper::{ElementRef, Html};
use tracing::{debug, trace, warn};
use url::Url;

/// Parser for the rendered README page.
pub struct Parser {
    base_url: Url,
}

impl Parser {
    /// Creates a parser that resolves relative links against `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Extracts one record per board entry that carries a marketplace link.
    ///
    /// A missing heading or list is not an error: the page simply has no
    /// boards section and the result is empty.
    pub fn parse_boards(&self, html: &str) -> Vec<LinkRecord> {
        let document = Html::parse_document(html);

        let Some(heading) = find_heading(&document) else {
            warn!("Couldn't find the '{}' heading", boards::HEADING_TEXT);
            return Vec::new();
        };

        let Some(list) = boards_list(heading) else {
            warn!("Couldn't find the boards list below '{}'", boards::HEADING_TEXT);
            return Vec::new();
        };

        let mut records = Vec::new();
        for item in list.select(&boards::ITEM) {
            match self.parse_item(item) {
                Some(record) => {
                    trace!("Parsed board: {} -> {}", record.board_name, record.link);
                    records.push(record);
                }
                None => trace!("Skipping board entry without a marketplace link"),
            }
        }

        debug!("Parsed {} board links", records.len());
        records
    }

    /// Parses a single list item. The first marketplace anchor wins.
    fn parse_item(&self, item: ElementRef) -> Option<LinkRecord> {
        let text = item.text().collect::<String>();
        let board_name = board_name(&text);

        item.select(&boards::LINK).find_map(|anchor| {
            let href = anchor.value().attr("href")?;
            if !href.contains(boards::MARKETPLACE_DOMAIN) {
                return None;
            }

            let link_text = anchor.text().collect::<String>().trim().to_string();
            Some(LinkRecord::new(board_name.clone(), self.normalize_href(href), link_text))
        })
    }

    /// Makes an href absolute. Scheme-relative links get `https:`.
    pub fn normalize_href(&self, href: &str) -> String {
        if href.starts_with("http") {
            href.to_string()
        } else if href.starts_with("//") {
            format!("https:{}", href)
        } else {
            self.base_url.join(href).map(String::from).unwrap_or_else(|_| href.to_string())
        }
    }
}

/// Board name is everything before the first `(`, trimmed.
pub fn board_name(text: &str) -> String {
    text.split('(').next().unwrap_or_default().trim().to_string()
}

fn find_heading(document: &Html) -> Option<ElementRef<'_>> {
    document
        .select(&boards::HEADING)
        .find(|h| h.text().collect::<String>().trim() == boards::HEADING_TEXT)
}

/// The list is the first `ul` sibling after the heading's enclosing `div`.
fn boards_list(heading: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let container =
        heading.ancestors().filter_map(ElementRef::wrap).find(|e| e.value().name() == "div")?;

    container.next_siblings().filter_map(ElementRef::wrap).find(|e| e.value().name() == "ul")
}
