#![forbid(unsafe_code)]

use clap::Parser;
use status_lib::{
    dashboard::{panels::size_rows, Cell, Page},
    resolve_page, HttpSizeSource, MonitoredPath,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Resolves directory sizes through a running status board.
#[derive(Debug, Parser)]
#[command(name = "status-sizes", version)]
struct Args {
    /// Base URL of the status board.
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Directories to measure.
    #[arg(required = true)]
    paths: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let source = HttpSizeSource::new(&args.server).map_err(|e| e.to_string())?;

    let monitored: Vec<MonitoredPath> = args
        .paths
        .iter()
        .map(|p| MonitoredPath::new(p.as_str(), p.as_str()))
        .collect();
    let mut page = Page::new();
    page.push_section("Sizes", size_rows(&monitored));

    let job_id = format!("status-sizes-{}", std::process::id());
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            status_lib::cancel_all();
        }
    });

    let summary = resolve_page(&mut page, &job_id, Arc::new(source))
        .await
        .map_err(|e| e.to_string())?;

    for row in page.sections().iter().flat_map(|s| s.rows.iter()) {
        if let Cell::Text(mb) = &row.value {
            println!("{}\t{mb}", row.title.trim_end_matches(" directory size"));
        }
    }
    for (path, error) in &summary.failures {
        eprintln!("{path}\t{error}");
    }
    if summary.dropped > 0 {
        eprintln!("{} path(s) could not be measured", summary.dropped);
    }
    Ok(())
}
