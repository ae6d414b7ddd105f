//! Maps adapter output into [`Deal`] records.
//!
//! Every source goes through the same policy: values are trimmed, empty
//! values count as absent, image and link URLs are made absolute, and a record
//! missing any of title, price, image or link is dropped.

use crate::deals::models::{Deal, RawDeal};
use tracing::trace;

/// Makes a URL absolute where possible.
///
/// Schema-relative URLs (`//host/path`) get `https:` and host-only URLs
/// (`cdn.host/path`) get `https://`. Absolute URLs are returned unchanged, so
/// this is idempotent. Root-relative paths and `data:` URIs cannot be completed
/// without an origin and are returned as-is; [`normalize`] rejects them.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("//") {
        format!("https:{}", url)
    } else if url.contains("://") || url.starts_with('/') || url.starts_with("data:") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// Normalizes one raw record, or returns `None` if a required field is missing.
pub fn normalize(raw: RawDeal) -> Option<Deal> {
    let title = present(raw.title);
    let price = present(raw.price);
    let image = present(raw.image).map(|u| normalize_url(&u)).filter(|u| is_absolute(u));
    let link = present(raw.link).map(|u| normalize_url(&u)).filter(|u| is_absolute(u));

    match (title, price, image, link) {
        (Some(title), Some(price), Some(image), Some(link)) => Some(Deal {
            title,
            price,
            image,
            link,
            stock: present(raw.stock),
            unit: present(raw.unit),
            old_price: present(raw.old_price),
        }),
        (title, price, image, link) => {
            trace!(
                "Dropping incomplete record (title: {}, price: {}, image: {}, link: {})",
                title.is_some(),
                price.is_some(),
                image.is_some(),
                link.is_some()
            );
            None
        }
    }
}

/// Normalizes a batch, preserving order and dropping incomplete records.
pub fn normalize_all(raws: impl IntoIterator<Item = RawDeal>) -> Vec<Deal> {
    raws.into_iter().filter_map(normalize).collect()
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
