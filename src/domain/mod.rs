pub mod input;
pub mod record;

pub use input::RunInput;
pub use record::{ErrorRecord, ProductFields, ProductRecord, RunSummary, ScrapeRecord};
