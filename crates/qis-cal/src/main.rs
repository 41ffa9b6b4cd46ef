//! qis-cal: HIS-QIS room schedules as calendars
//!
//! Usage:
//!   qis-cal [OPTIONS] <SOURCE>...
//!
//! Every SOURCE is the week view of one room, given as URL or as a saved
//! HTML file. All reservations found end up in one iCalendar file.

mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use futures::future::try_join_all;
use qis_calendar::{build_calendar, write_calendar};
use qis_core::{Config, GridLayout, Schedule};
use qis_fetch::ScheduleFetcher;
use tracing_subscriber::EnvFilter;

use cli::{Cli, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(output) = &cli.output {
        config.output.path = output.display().to_string();
    }

    let fetcher = ScheduleFetcher::new(&config.source).context("Failed to create HTTP client")?;
    let schedules = load_schedules(&fetcher, &cli.sources, config.grid).await?;

    if cli.debug {
        for schedule in &schedules {
            eprintln!("{} (week {})", schedule.room_name, schedule.week);
            eprintln!("{}", schedule);
        }
    }

    match cli.format {
        OutputFormat::Ics => {
            let calendar = build_calendar(&schedules, &config.output);
            write_calendar(&calendar, &config.output.path).context("Failed to write calendar")?;
        }
        OutputFormat::Json => write_json(&schedules, cli.output.as_deref())?,
    }

    let reservations: usize = schedules.iter().map(Schedule::len).sum();
    tracing::info!(schedules = schedules.len(), reservations, "Done");

    Ok(())
}

/// Load all sources concurrently and parse each page on its own
async fn load_schedules(fetcher: &ScheduleFetcher, sources: &[String], layout: GridLayout) -> Result<Vec<Schedule>> {
    let pages = try_join_all(sources.iter().map(|source| async move {
        fetcher
            .load_source(source)
            .await
            .with_context(|| format!("Failed to load {}", source))
    }))
    .await?;

    sources
        .iter()
        .zip(&pages)
        .map(|(source, html)| {
            Schedule::parse_with_layout(html, layout).with_context(|| format!("Failed to parse schedule from {}", source))
        })
        .collect()
}

/// Write schedules as JSON to `path`, or to stdout without one
fn write_json(schedules: &[Schedule], path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(schedules).context("Failed to serialize schedules")?;

    match path {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Wrote schedules");
        }
        None => println!("{}", json),
    }

    Ok(())
}
