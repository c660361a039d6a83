use std::path::Path;

use crate::app::{AppContext, Result, TrackerError};
use crate::dataset::Dataset;
use crate::domain::{RunInput, RunSummary, ScrapeRecord};
use crate::platform::LocalPlatform;

/// Merge the input file (if any) with command-line overrides.
///
/// URLs given on the command line replace the file's list; `max_items`
/// replaces the file's cap.
pub fn build_input(
    input_path: Option<&Path>,
    urls: Vec<String>,
    max_items: Option<usize>,
) -> Result<RunInput> {
    let mut input = match input_path {
        Some(path) => RunInput::from_file(path)?,
        None => RunInput::default(),
    };

    if !urls.is_empty() {
        input.product_urls = urls;
    }
    if let Some(max_items) = max_items {
        input.max_items = max_items;
    }

    Ok(input)
}

pub async fn run_batch(ctx: &AppContext, input: RunInput) -> Result<RunSummary> {
    // Checked here too so a bad input never launches a browser
    input.validate()?;

    let orchestrator = ctx.orchestrator().await?;
    let platform = LocalPlatform::new(input, ctx.dataset.clone());
    let summary = orchestrator.run(&platform).await?;

    if let Some(run_id) = platform.run_id() {
        println!("Run {}", run_id);
    }
    println!(
        "Scraped {} of {} URLs: {} ok, {} errors",
        summary.processed, summary.requested, summary.succeeded, summary.failed
    );

    Ok(summary)
}

pub fn extract_file(ctx: &AppContext, path: &Path, base_url: Option<&str>) -> Result<()> {
    let html = std::fs::read_to_string(path)?;
    let fields = ctx.extractor.extract_html(&html, base_url);
    println!("{}", serde_json::to_string_pretty(&fields)?);
    Ok(())
}

pub fn export_records(ctx: &AppContext, run: Option<i64>, jsonl: bool) -> Result<()> {
    let run_id = match run {
        Some(id) => ctx
            .dataset
            .get_run(id)?
            .ok_or(TrackerError::RunNotFound(id))?
            .id,
        None => match ctx.dataset.latest_run()? {
            Some(run) => run.id,
            None => {
                eprintln!("No runs recorded");
                return Ok(());
            }
        },
    };

    let records = ctx.dataset.get_records(run_id)?;
    println!("{}", render_records(&records, jsonl)?);
    Ok(())
}

/// Serialize records as a pretty JSON array, or as JSON lines.
pub fn render_records(records: &[ScrapeRecord], jsonl: bool) -> Result<String> {
    if !jsonl {
        return Ok(serde_json::to_string_pretty(records)?);
    }

    let lines = records
        .iter()
        .map(serde_json::to_string)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

pub fn list_runs(ctx: &AppContext) -> Result<()> {
    let runs = ctx.dataset.get_all_runs()?;

    if runs.is_empty() {
        println!("No runs");
        return Ok(());
    }

    for run in runs {
        let started = run.started_at.format("%Y-%m-%d %H:%M:%S");
        match run.summary {
            Some(s) => println!(
                "#{} {}  {} records ({} ok, {} errors)",
                run.id, started, s.processed, s.succeeded, s.failed
            ),
            None => {
                let count = ctx.dataset.record_count(run.id)?;
                println!("#{} {}  {} records (unfinished)", run.id, started, count);
            }
        }
    }

    Ok(())
}
