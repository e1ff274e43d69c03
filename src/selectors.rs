//! Selectors and fixed markers for the README page and the AliExpress item page.
//!
//! Both pages are third-party markup. When extraction starts returning empty
//! results, capture an HTML sample, update the values here and add a fixture.

/// README "supported boards" section.
pub mod boards {
    use scraper::Selector;
    use std::sync::LazyLock;

    /// Exact heading text that introduces the boards list.
    pub const HEADING_TEXT: &str = "Current Supported Boards";

    /// Substring an anchor's href must contain to count as a marketplace link.
    pub const MARKETPLACE_DOMAIN: &str = "aliexpress.com";

    /// Candidate heading elements.
    pub static HEADING: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());

    /// Board entries inside the list.
    pub static ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());

    /// Links inside a board entry.
    pub static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
}

/// AliExpress product page, queried through the browser.
pub mod price {
    /// Current (sale) price text.
    pub const CURRENT: &str = ".price--currentPriceText--V8_y_b5";

    /// Struck-through original price, only present on discounted items.
    pub const ORIGINAL: &str = ".price--originalText--gxVO5_d";
}
