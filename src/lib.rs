//! # pricetrack
//!
//! A batch scraper for e-commerce product detail pages.
//!
//! ## Architecture
//!
//! ```text
//! Input URLs → Orchestrator → Visitor (per URL) → Extractor (per page) → Dataset
//! ```
//!
//! Given N URLs and a cap M, a run visits the first `min(N, M)` pages and
//! appends exactly one record per visited page: the extracted fields, or an
//! error record when the visit failed.
//!
//! ## Quick Start
//!
//! ```bash
//! # Scrape two pages
//! pricetrack run --url https://www.amazon.com/dp/B000000001 --url https://www.amazon.com/dp/B000000002
//!
//! # Scrape from an input file
//! pricetrack run --input input.json
//!
//! # Print the latest run's records
//! pricetrack export --jsonl
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together configuration,
/// the dataset and the compiled extractor.
pub mod app;

/// Page navigation backends: headless Chrome and plain HTTP.
pub mod browser;

/// Command-line interface using clap.
///
/// - `run` - Visit product pages and record the results
/// - `extract <file>` - Extract fields from saved HTML
/// - `export` - Print a run's records
/// - `runs` - List recorded runs
pub mod cli;

/// Configuration loaded from `~/.config/pricetrack/config.toml`.
pub mod config;

/// Append-only record storage in SQLite.
pub mod dataset;

/// Core domain models: run input, product and error records.
pub mod domain;

/// Selector fallback-chain field extraction.
pub mod extractor;

/// Batch orchestration over a [`Platform`](platform::Platform).
pub mod orchestrator;

/// Run lifecycle hooks: input, record pushes, completion.
pub mod platform;

/// Single page visits.
pub mod visitor;
