use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const TITLE_NOT_FOUND: &str = "Title not found";
pub const PRICE_NOT_FOUND: &str = "Price not found";
pub const NO_RATING: &str = "No rating available";
pub const ERROR_TITLE: &str = "Error occurred";
pub const ERROR_PRICE: &str = "Could not retrieve";

/// Fields read from one product page, before the source URL and timestamp are attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFields {
    pub title: String,
    pub price: String,
    pub image_url: Option<String>,
    pub rating: String,
}

impl Default for ProductFields {
    fn default() -> Self {
        Self {
            title: TITLE_NOT_FOUND.to_string(),
            price: PRICE_NOT_FOUND.to_string(),
            image_url: None,
            rating: NO_RATING.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub title: String,
    pub price: String,
    pub image_url: Option<String>,
    pub rating: String,
    pub url: String,
    #[serde(with = "iso8601")]
    pub scraped_at: DateTime<Utc>,
}

impl ProductRecord {
    pub fn new(fields: ProductFields, url: impl Into<String>, scraped_at: DateTime<Utc>) -> Self {
        Self {
            title: fields.title,
            price: fields.price,
            image_url: fields.image_url,
            rating: fields.rating,
            url: url.into(),
            scraped_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub url: String,
    pub title: String,
    pub price: String,
    pub error: String,
    #[serde(with = "iso8601")]
    pub scraped_at: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn new(url: impl Into<String>, error: impl Into<String>, scraped_at: DateTime<Utc>) -> Self {
        Self {
            url: url.into(),
            title: ERROR_TITLE.to_string(),
            price: ERROR_PRICE.to_string(),
            error: error.into(),
            scraped_at,
        }
    }
}

/// One dataset entry: every visited URL produces exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScrapeRecord {
    // Error first: its `error` key is what tells the two shapes apart.
    Error(ErrorRecord),
    Product(ProductRecord),
}

impl ScrapeRecord {
    pub fn url(&self) -> &str {
        match self {
            ScrapeRecord::Product(r) => &r.url,
            ScrapeRecord::Error(r) => &r.url,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ScrapeRecord::Product(r) => &r.title,
            ScrapeRecord::Error(r) => &r.title,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ScrapeRecord::Error(_))
    }

    /// Short status tag stored next to the payload
    pub fn status(&self) -> &'static str {
        if self.is_error() {
            "error"
        } else {
            "ok"
        }
    }
}

impl From<ProductRecord> for ScrapeRecord {
    fn from(record: ProductRecord) -> Self {
        ScrapeRecord::Product(record)
    }
}

impl From<ErrorRecord> for ScrapeRecord {
    fn from(record: ErrorRecord) -> Self {
        ScrapeRecord::Error(record)
    }
}

/// Totals reported when a run finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// URLs supplied in the input, before truncation
    pub requested: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, record: &ScrapeRecord) {
        self.processed += 1;
        if record.is_error() {
            self.failed += 1;
        } else {
            self.succeeded += 1;
        }
    }
}

/// `scrapedAt` timestamps in the `2024-01-01T00:00:00.000Z` form.
mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
