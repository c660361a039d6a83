use serde::{Deserialize, Serialize};

/// What to read from the first element a selector matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadKind {
    /// Trimmed text content
    Text,
    /// `src` attribute, resolved against the page URL
    Src,
    /// Any other attribute, read verbatim
    Attr(String),
}

/// One candidate in a fallback chain.
///
/// In TOML either a bare selector string, or a table when the read kind
/// differs from the field's natural one:
///
/// ```toml
/// rating = [".a-icon-alt", { selector = "#averageRating", read = { attr = "title" } }]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorEntry {
    Css(String),
    Detailed {
        selector: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        read: Option<ReadKind>,
    },
}

impl SelectorEntry {
    pub fn selector(&self) -> &str {
        match self {
            SelectorEntry::Css(s) => s,
            SelectorEntry::Detailed { selector, .. } => selector,
        }
    }

    pub fn read_kind(&self, natural: &ReadKind) -> ReadKind {
        match self {
            SelectorEntry::Detailed {
                read: Some(kind), ..
            } => kind.clone(),
            _ => natural.clone(),
        }
    }
}

impl From<&str> for SelectorEntry {
    fn from(s: &str) -> Self {
        SelectorEntry::Css(s.to_string())
    }
}

/// Ordered fallback chains for every extracted field, first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub title: Vec<SelectorEntry>,
    pub price: Vec<SelectorEntry>,
    pub image: Vec<SelectorEntry>,
    pub rating: Vec<SelectorEntry>,
}

fn chain(selectors: &[&str]) -> Vec<SelectorEntry> {
    selectors.iter().map(|s| SelectorEntry::from(*s)).collect()
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            title: chain(&["#productTitle", "h1.a-size-large", ".product-title", "h1"]),
            price: chain(&[
                ".a-price .a-offscreen",
                ".a-price-whole",
                "#priceblock_dealprice",
                "#priceblock_ourprice",
                ".a-price.a-text-price.a-size-medium.apexPriceToPay .a-offscreen",
                ".a-price-range .a-offscreen",
                ".a-price.a-text-price .a-offscreen",
            ]),
            image: chain(&[
                "#landingImage",
                ".a-dynamic-image",
                "#imgTagWrapperId img",
                ".a-button-thumbnail img",
            ]),
            rating: chain(&[
                ".a-icon-alt",
                "[data-hook=\"rating-out-of-text\"]",
                "#acrCustomerReviewText",
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chain_order() {
        let config = SelectorConfig::default();
        assert_eq!(config.title[0].selector(), "#productTitle");
        assert_eq!(config.title.last().unwrap().selector(), "h1");
        assert_eq!(config.price.len(), 7);
        assert_eq!(config.image[0].selector(), "#landingImage");
        assert_eq!(config.rating[0].selector(), ".a-icon-alt");
    }

    #[test]
    fn test_mixed_entries_from_toml() {
        let content = r##"
title = ["h2.name"]
rating = [".stars", { selector = "#avg", read = { attr = "title" } }, { selector = ".count" }]
"##;
        let config: SelectorConfig = toml::from_str(content).unwrap();

        assert_eq!(config.title, vec![SelectorEntry::Css("h2.name".into())]);
        assert_eq!(config.rating.len(), 3);
        assert_eq!(
            config.rating[1].read_kind(&ReadKind::Text),
            ReadKind::Attr("title".into())
        );
        assert_eq!(config.rating[2].read_kind(&ReadKind::Text), ReadKind::Text);
        // Unspecified chains keep their defaults
        assert_eq!(config.price, SelectorConfig::default().price);
    }

    #[test]
    fn test_read_kind_string_form() {
        let content = r##"image = [{ selector = "img.hero", read = "src" }]"##;
        let config: SelectorConfig = toml::from_str(content).unwrap();
        assert_eq!(config.image[0].read_kind(&ReadKind::Text), ReadKind::Src);
    }
}
