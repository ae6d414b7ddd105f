//! HTML extraction for browser-rendered storefront pages.

use crate::deals::models::RawDeal;
use crate::deals::selectors::{daraz, shwapno};
use scraper::{ElementRef, Html};
use tracing::{debug, trace};

/// Extracts raw deal fields from rendered markup.
pub struct Parser {
    base_url: String,
}

impl Parser {
    /// Creates a parser resolving relative links against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into().trim_end_matches('/').to_string() }
    }

    /// Parses every product card on a Daraz catalog page.
    ///
    /// Returns an empty list when the card marker is absent.
    pub fn parse_daraz_cards(&self, html: &str) -> Vec<RawDeal> {
        let document = Html::parse_document(html);

        let cards: Vec<RawDeal> =
            document.select(&daraz::CARD).map(|card| self.parse_daraz_card(card)).collect();

        debug!("Parsed {} Daraz cards (selectors {})", cards.len(), daraz::VERSION);
        cards
    }

    fn parse_daraz_card(&self, card: ElementRef) -> RawDeal {
        let image_el = card.select(&daraz::IMAGE).next();
        let anchor = card.select(&daraz::LINK).next();

        // Image alt text is the most reliable title; older markup only had it on the anchor
        let title = image_el
            .and_then(|img| img.value().attr("alt"))
            .map(str::to_string)
            .filter(|t| !t.trim().is_empty())
            .or_else(|| anchor.and_then(|a| a.value().attr("title")).map(str::to_string))
            .or_else(|| anchor.map(text_of))
            .filter(|t| !t.trim().is_empty());

        let price = card.select(&daraz::PRICE).next().map(text_of);

        let image = image_el.and_then(image_source).map(|src| self.resolve(src));

        let link = anchor.and_then(|a| a.value().attr("href")).map(|href| self.resolve(href));

        trace!("Daraz card: {:?}", title);

        RawDeal { title, price, image, link, ..RawDeal::default() }
    }

    /// Parses a Shwapno product page into a single record.
    ///
    /// `page_url` is the URL the browser ended up on and becomes the link.
    pub fn parse_shwapno_product(&self, html: &str, page_url: &str) -> RawDeal {
        let document = Html::parse_document(html);

        let title = document.select(&shwapno::TITLE).next().map(text_of);
        let price = document.select(&shwapno::PRICE).next().map(text_of);
        let unit = document.select(&shwapno::UNIT).next().map(text_of);
        let image = document
            .select(&shwapno::IMAGE)
            .next()
            .and_then(image_source)
            .map(|src| self.resolve(src));

        debug!(
            "Parsed Shwapno product page {} (selectors {}): {:?}",
            page_url,
            shwapno::VERSION,
            title
        );

        RawDeal {
            title,
            price,
            image,
            link: Some(page_url.to_string()).filter(|u| !u.is_empty()),
            unit,
            ..RawDeal::default()
        }
    }

    /// Resolves a path against the storefront base URL.
    ///
    /// Absolute and schema-relative URLs are kept; the latter are completed
    /// during normalization.
    fn resolve(&self, href: &str) -> String {
        let href = href.trim();
        if href.is_empty() || href.starts_with("//") || href.contains("://") {
            href.to_string()
        } else if href.starts_with('/') {
            format!("{}{}", self.base_url, href)
        } else {
            format!("{}/{}", self.base_url, href)
        }
    }
}

/// Returns the real image URL, skipping inline lazy-load placeholders.
fn image_source<'a>(img: ElementRef<'a>) -> Option<&'a str> {
    let src = img.value().attr("src").filter(|s| !s.trim().is_empty() && !s.starts_with("data:"));
    src.or_else(|| img.value().attr("data-src"))
}

/// Element text with whitespace runs collapsed.
fn text_of(element: ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}
