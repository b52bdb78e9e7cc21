use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use lootfilter::{Item, ItemFilter, MatchOutcome};

/// Dry-run a filter file against a set of items and show what it keeps.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Filter file (blank-line-separated rule blocks)
    #[arg(short, long)]
    filter: PathBuf,

    /// JSON array of items to test the filter against
    #[arg(short, long)]
    items: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let filter = ItemFilter::load(&cli.filter)?;

    let content = std::fs::read_to_string(&cli.items)
        .with_context(|| format!("CLI: Failed to read items file {}", cli.items.display()))?;
    let items: Vec<Item> = serde_json::from_str(&content)
        .with_context(|| format!("CLI: Failed to parse items file {}", cli.items.display()))?;

    let mut kept = 0usize;
    for item in &items {
        match filter.evaluate(item) {
            MatchOutcome::Matched(rule) => {
                kept += 1;
                println!(
                    "keep  {:<28} rule at line {}",
                    item.base_name,
                    rule.start_line()
                );
            }
            MatchOutcome::NoMatch => {
                println!("skip  {}", item.base_name);
            }
            MatchOutcome::Failed { rule, error } => {
                println!(
                    "skip  {:<28} rule at line {} failed: {}",
                    item.base_name,
                    rule.start_line(),
                    error
                );
            }
        }
    }

    println!(
        "{} of {} items kept ({} rules loaded, {} rejected)",
        kept,
        items.len(),
        filter.len(),
        filter.errors().len()
    );

    Ok(())
}
