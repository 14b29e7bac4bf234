// Command-line front end: apply a highlight job to an HTML file.
//
// Logging goes to stderr and is controlled by RUST_LOG (default: info).

use anyhow::{Context, Result};
use clap::Parser;
use kodegen_tools_domfind::{Document, HighlightJob};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "kodegen-domfind",
    version,
    about = "Highlight terms in an HTML document without disturbing its markup"
)]
struct Args {
    /// HTML file to process
    #[arg(short, long)]
    input: PathBuf,

    /// JSON highlight job
    #[arg(short, long)]
    job: PathBuf,

    /// Where to write the result (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Parse the input as a fragment instead of a full document
    #[arg(long)]
    fragment: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let html = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let job = HighlightJob::load(&args.job)?;

    let mut doc = if args.fragment {
        Document::parse_fragment(&html)
    } else {
        Document::parse(&html)
    };

    let outcome = job.apply(&mut doc)?;
    tracing::info!(
        rules = outcome.rules.len(),
        matches = outcome.total_matches(),
        "Highlight job complete"
    );

    let rendered = doc.to_html();
    match &args.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{rendered}"),
    }

    Ok(())
}
