use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pricetrack::app::AppContext;
use pricetrack::cli::{commands, Cli, Commands};
use pricetrack::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pricetrack=info")))
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(workers) = cli.workers {
        config.scraper.max_concurrency = workers;
    }

    match cli.command {
        Commands::Run {
            input,
            urls,
            max_items,
            engine,
        } => {
            if let Some(engine) = engine {
                config.scraper.engine = engine;
            }
            let run_input = commands::build_input(input.as_deref(), urls, max_items)?;
            let ctx = AppContext::new(config, cli.db)?;
            commands::run_batch(&ctx, run_input).await?;
        }
        Commands::Extract { path, base_url } => {
            let ctx = AppContext::in_memory(config)?;
            commands::extract_file(&ctx, &path, base_url.as_deref())?;
        }
        Commands::Export { run, jsonl } => {
            let ctx = AppContext::new(config, cli.db)?;
            commands::export_records(&ctx, run, jsonl)?;
        }
        Commands::Runs => {
            let ctx = AppContext::new(config, cli.db)?;
            commands::list_runs(&ctx)?;
        }
    }

    Ok(())
}
