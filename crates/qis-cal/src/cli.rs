//! Command line arguments

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Extract reservations from HIS-QIS room schedules into a calendar
#[derive(Parser, Debug)]
#[command(name = "qis-cal", version)]
pub struct Cli {
    /// Room schedule pages: URLs or saved HTML files
    #[arg(required = true, value_name = "SOURCE")]
    pub sources: Vec<String>,

    /// Output file (default: output.path from the config, schedule.ics)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the parsed schedules and log at debug level
    #[arg(short, long)]
    pub debug: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Ics)]
    pub format: OutputFormat,

    /// Configuration file (default: qis-cal.toml if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// iCalendar file
    Ics,
    /// Schedules as JSON
    Json,
}
