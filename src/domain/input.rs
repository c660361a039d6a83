use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app::{Result, TrackerError};

pub const DEFAULT_MAX_ITEMS: usize = 10;

/// Input of a single run, in the `{ "productUrls": [...], "maxItems": n }` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunInput {
    pub product_urls: Vec<String>,
    pub max_items: usize,
}

impl Default for RunInput {
    fn default() -> Self {
        Self {
            product_urls: Vec::new(),
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

impl RunInput {
    pub fn new(product_urls: Vec<String>, max_items: usize) -> Self {
        Self {
            product_urls,
            max_items,
        }
    }

    /// Load input from a JSON file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let input = serde_json::from_str(&content)?;
        Ok(input)
    }

    /// The URLs a run will actually visit: the first `max_items`, in input order.
    pub fn urls_to_visit(&self) -> &[String] {
        let end = self.product_urls.len().min(self.max_items);
        &self.product_urls[..end]
    }

    pub fn validate(&self) -> Result<()> {
        if self.product_urls.is_empty() {
            return Err(TrackerError::EmptyInput);
        }
        Ok(())
    }
}
