//! Field extraction from a loaded product page.
//!
//! Every field owns an ordered chain of CSS selectors. For each selector the
//! first matching element in document order is read; the first non-empty
//! value wins, and an exhausted chain falls back to the field's default.
//! Nothing here performs I/O, so it can be exercised against fixture HTML.
//!
//! ```rust,ignore
//! use pricetrack::extractor::{Extractor, HtmlDocument, SelectorConfig};
//!
//! let extractor = Extractor::new(&SelectorConfig::default())?;
//! let doc = HtmlDocument::parse(&html, Some("https://shop.example/dp/1"));
//! let fields = extractor.extract(&doc);
//! ```

mod document;
mod selectors;

pub use document::HtmlDocument;
pub use selectors::{ReadKind, SelectorConfig, SelectorEntry};

use scraper::Selector;
use tracing::debug;

use crate::app::{Result, TrackerError};
use crate::domain::ProductFields;

/// DOM access needed by the extractor: read one property of the first
/// element matching a selector.
pub trait DomQuery {
    fn query(&self, selector: &Selector, read: &ReadKind) -> Option<String>;
}

struct Candidate {
    source: String,
    selector: Selector,
    read: ReadKind,
}

/// A compiled fallback chain for one field.
pub struct FieldChain {
    name: &'static str,
    candidates: Vec<Candidate>,
}

impl FieldChain {
    pub fn compile(
        name: &'static str,
        entries: &[SelectorEntry],
        natural: ReadKind,
    ) -> Result<Self> {
        let candidates = entries
            .iter()
            .map(|entry| -> Result<Candidate> {
                let source = entry.selector().to_string();
                let selector = Selector::parse(&source).map_err(|e| TrackerError::Selector {
                    selector: source.clone(),
                    reason: e.to_string(),
                })?;
                Ok(Candidate {
                    read: entry.read_kind(&natural),
                    source,
                    selector,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { name, candidates })
    }

    /// First non-empty (after trimming) value along the chain
    pub fn resolve<D: DomQuery + ?Sized>(&self, dom: &D) -> Option<String> {
        for candidate in &self.candidates {
            let Some(value) = dom.query(&candidate.selector, &candidate.read) else {
                continue;
            };
            let value = value.trim();
            if !value.is_empty() {
                debug!("{} matched '{}'", self.name, candidate.source);
                return Some(value.to_string());
            }
        }

        debug!("{}: no selector matched, using default", self.name);
        None
    }
}

/// Product field extractor built from a [`SelectorConfig`]
pub struct Extractor {
    title: FieldChain,
    price: FieldChain,
    image: FieldChain,
    rating: FieldChain,
}

impl Extractor {
    /// Compile all chains. Fails on the first selector that does not parse.
    pub fn new(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            title: FieldChain::compile("title", &config.title, ReadKind::Text)?,
            price: FieldChain::compile("price", &config.price, ReadKind::Text)?,
            image: FieldChain::compile("image", &config.image, ReadKind::Src)?,
            rating: FieldChain::compile("rating", &config.rating, ReadKind::Text)?,
        })
    }

    pub fn extract<D: DomQuery + ?Sized>(&self, dom: &D) -> ProductFields {
        let defaults = ProductFields::default();

        ProductFields {
            title: self.title.resolve(dom).unwrap_or(defaults.title),
            price: self.price.resolve(dom).unwrap_or(defaults.price),
            image_url: self.image.resolve(dom),
            rating: self.rating.resolve(dom).unwrap_or(defaults.rating),
        }
    }

    /// Parse `html` and extract from it in one step.
    pub fn extract_html(&self, html: &str, base_url: Option<&str>) -> ProductFields {
        let document = HtmlDocument::parse(html, base_url);
        self.extract(&document)
    }
}
