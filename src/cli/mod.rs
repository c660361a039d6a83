pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::browser::Engine;

#[derive(Parser)]
#[command(name = "pricetrack")]
#[command(about = "Scrape title, price, image and rating from product pages", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/pricetrack/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Dataset database file, overriding the configured one
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Number of concurrent page visits, overriding the configured one
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Visit product pages and append one record per URL to the dataset
    Run {
        /// JSON input file: {"productUrls": [...], "maxItems": 10}
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Product URL to visit (repeatable); replaces the file's URLs
        #[arg(short, long = "url")]
        urls: Vec<String>,

        /// Maximum number of URLs to visit
        #[arg(short, long)]
        max_items: Option<usize>,

        /// Page engine, overriding the configured one
        #[arg(short, long, value_enum)]
        engine: Option<Engine>,
    },
    /// Extract fields from a saved HTML file and print them as JSON
    Extract {
        /// Path to the HTML file
        path: PathBuf,

        /// URL the page was saved from, for resolving relative image sources
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Print the records of a run (default: latest)
    Export {
        /// Run id
        #[arg(short, long)]
        run: Option<i64>,

        /// One JSON object per line instead of a JSON array
        #[arg(long)]
        jsonl: bool,
    },
    /// List recorded runs
    Runs,
}
