use scraper::{Html, Selector};
use url::Url;

use crate::extractor::{DomQuery, ReadKind};

/// A parsed DOM snapshot of a loaded page.
pub struct HtmlDocument {
    html: Html,
    base_url: Option<Url>,
}

impl HtmlDocument {
    /// Parse a full document. `base_url` is the page's final URL, used to
    /// resolve relative image sources the way a browser's `img.src` does.
    pub fn parse(html: &str, base_url: Option<&str>) -> Self {
        Self {
            html: Html::parse_document(html),
            base_url: base_url.and_then(|u| Url::parse(u).ok()),
        }
    }

    fn resolve(&self, src: &str) -> String {
        match &self.base_url {
            Some(base) => base
                .join(src)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| src.to_string()),
            None => src.to_string(),
        }
    }
}

impl DomQuery for HtmlDocument {
    fn query(&self, selector: &Selector, read: &ReadKind) -> Option<String> {
        let element = self.html.select(selector).next()?;

        match read {
            ReadKind::Text => Some(element.text().collect::<String>()),
            ReadKind::Src => {
                let src = element.value().attr("src")?.trim();
                if src.is_empty() {
                    return None;
                }
                Some(self.resolve(src))
            }
            ReadKind::Attr(name) => element.value().attr(name).map(String::from),
        }
    }
}
