//! Deal records: the raw shape adapters produce and the normalized shape served.

use serde::{Deserialize, Serialize};

/// A normalized product deal.
///
/// Built only through [`crate::deals::normalize`], which guarantees that
/// `title`, `price`, `image` and `link` are non-empty and that both URLs are
/// absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    /// Display name of the product
    pub title: String,
    /// Display-formatted price, as shown by the storefront
    pub price: String,
    /// Absolute image URL
    pub image: String,
    /// Absolute product page URL
    pub link: String,
    /// Availability text, when the source reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<String>,
    /// Package size or unit descriptor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Price before discount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_price: Option<String>,
}

/// Field values as extracted by an adapter, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDeal {
    pub title: Option<String>,
    pub price: Option<String>,
    pub old_price: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
    pub stock: Option<String>,
    pub unit: Option<String>,
}

impl RawDeal {
    /// Creates a raw record with the four required fields set.
    pub fn new(
        title: impl Into<String>,
        price: impl Into<String>,
        image: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            price: Some(price.into()),
            image: Some(image.into()),
            link: Some(link.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_deal() -> Deal {
        Deal {
            title: "Miniket Rice 5kg".to_string(),
            price: "৳ 420".to_string(),
            image: "https://cdn.example.com/rice.jpg".to_string(),
            link: "https://chaldal.com/miniket-rice-5-kg".to_string(),
            stock: None,
            unit: None,
            old_price: None,
        }
    }

    #[test]
    fn test_optional_fields_omitted_from_json() {
        let json = serde_json::to_value(make_deal()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert!(!obj.contains_key("stock"));
        assert!(!obj.contains_key("unit"));
        assert!(!obj.contains_key("old_price"));
    }

    #[test]
    fn test_optional_fields_present_when_set() {
        let mut deal = make_deal();
        deal.stock = Some("In Stock".to_string());
        deal.unit = Some("5 kg".to_string());

        let json = serde_json::to_value(&deal).unwrap();
        assert_eq!(json["stock"], "In Stock");
        assert_eq!(json["unit"], "5 kg");
        assert_eq!(json["title"], "Miniket Rice 5kg");
    }

    #[test]
    fn test_deal_deserializes_without_optional_fields() {
        let json = r#"{"title":"A","price":"1","image":"https://i/a","link":"https://l/a"}"#;
        let deal: Deal = serde_json::from_str(json).unwrap();
        assert_eq!(deal.title, "A");
        assert!(deal.stock.is_none());
    }

    #[test]
    fn test_raw_deal_new() {
        let raw = RawDeal::new("t", "p", "i", "l");
        assert_eq!(raw.title.as_deref(), Some("t"));
        assert_eq!(raw.link.as_deref(), Some("l"));
        assert!(raw.stock.is_none());
        assert!(raw.unit.is_none());
    }
}
