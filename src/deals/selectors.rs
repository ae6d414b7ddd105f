//! CSS selectors for storefront markup.
//!
//! One module per source, each stamped with the date its markup was last
//! verified. When a storefront changes its HTML, capture a sample, update
//! the selectors and `VERSION` here, and refresh the fixture under
//! `tests/fixtures`.

use scraper::Selector;
use std::sync::LazyLock;

/// Daraz catalog search results (client-rendered).
pub mod daraz {
    use super::*;

    /// Markup revision these selectors were verified against.
    pub const VERSION: &str = "2025-07";

    /// Product card marker, also used to wait for rendering to finish.
    pub const CARD_MARKER: &str = "div[data-qa-locator='product-item']";

    /// Product card container.
    pub static CARD: LazyLock<Selector> = LazyLock::new(|| Selector::parse(CARD_MARKER).unwrap());

    /// Card image; its alt text doubles as the title.
    pub static IMAGE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

    /// Price element. Daraz has shipped both class names; first match wins.
    pub static PRICE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".price--NVB62, .ooOxS").unwrap());

    /// Product link.
    pub static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
}

/// Shwapno single product page.
pub mod shwapno {
    use super::*;

    /// Markup revision these selectors were verified against.
    pub const VERSION: &str = "2025-09";

    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());

    pub static PRICE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".price span").unwrap());

    pub static UNIT: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".product-unit").unwrap());

    pub static IMAGE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
}
