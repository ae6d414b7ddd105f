//! Integration tests for the HTML parser using fixture files.

use deal_scout::deals::normalize::normalize_all;
use deal_scout::deals::Parser;

const DARAZ_FIXTURE: &str = include_str!("fixtures/daraz_search.html");
const SHWAPNO_FIXTURE: &str = include_str!("fixtures/shwapno_product.html");

#[test]
fn test_parse_daraz_search_results() {
    let parser = Parser::new("https://daraz.com.bd");
    let cards = parser.parse_daraz_cards(DARAZ_FIXTURE);

    // Every card is extracted, complete or not
    assert_eq!(cards.len(), 3);

    let first = &cards[0];
    assert_eq!(first.title.as_deref(), Some("Xiaomi Redmi Buds 6 Active"));
    assert_eq!(first.price.as_deref(), Some("৳ 1,649"));
    assert_eq!(
        first.link.as_deref(),
        Some("//www.daraz.com.bd/products/xiaomi-redmi-buds-6-i1001.html")
    );

    // Lazy-loaded image falls back to data-src
    let second = &cards[1];
    assert_eq!(second.image.as_deref(), Some("//img.drz.lazcdn.com/static/bd/p/rice.jpg"));
    assert_eq!(
        second.link.as_deref(),
        Some("https://daraz.com.bd/products/miniket-rice-5kg-i1002.html")
    );

    assert!(cards[2].price.is_none());
}

#[test]
fn test_daraz_fixture_normalizes_complete_cards() {
    let parser = Parser::new("https://daraz.com.bd");
    let deals = normalize_all(parser.parse_daraz_cards(DARAZ_FIXTURE));

    // The card without a price is dropped
    assert_eq!(deals.len(), 2);
    assert_eq!(deals[0].link, "https://www.daraz.com.bd/products/xiaomi-redmi-buds-6-i1001.html");
    assert_eq!(deals[1].title, "Miniket Rice 5kg");
    assert_eq!(deals[1].image, "https://img.drz.lazcdn.com/static/bd/p/rice.jpg");
    assert!(deals.iter().all(|d| d.link.starts_with("https://")));
}

#[test]
fn test_parse_shwapno_product_page() {
    let parser = Parser::new("https://www.shwapno.com");
    let raw = parser.parse_shwapno_product(SHWAPNO_FIXTURE, "https://www.shwapno.com/new-alu");

    assert_eq!(raw.title.as_deref(), Some("Potato Regular (Alu)"));
    assert_eq!(raw.price.as_deref(), Some("৳ 55"));
    assert_eq!(raw.unit.as_deref(), Some("per kg"));
    assert_eq!(
        raw.image.as_deref(),
        Some("https://www.shwapno.com/images/product/potato-regular.webp")
    );
    assert_eq!(raw.link.as_deref(), Some("https://www.shwapno.com/new-alu"));
}

#[test]
fn test_parse_empty_results() {
    let parser = Parser::new("https://daraz.pk");
    let html = r#"
        <html>
        <body>
            <div class="searchEmpty--Gf8cm">Search No Result</div>
        </body>
        </html>
    "#;

    assert!(parser.parse_daraz_cards(html).is_empty());
}
