//! Command-line parsing for the FRED regression tool.
//!
//! Argument parsing lives here; dispatch lives in `app`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::data::credentials::DEFAULT_KEY_QUERY;
use crate::data::fred::BASE_URL;
use crate::domain::{Frequency, Units};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fredfit", version, about = "Regress one FRED series on another (CPI vs. unemployment by default)")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct GlobalArgs {
    /// FRED API base URL.
    #[arg(long, global = true, default_value = BASE_URL)]
    pub base_url: String,

    /// Where to read the FRED API key from.
    #[arg(long, global = true, value_enum, default_value_t = CredentialKind::Env)]
    pub credentials: CredentialKind,

    /// SQLite URL holding the key (required with `--credentials sqlite`).
    #[arg(long, global = true, value_name = "URL")]
    pub db_url: Option<String>,

    /// Query returning the key as its first column.
    #[arg(long, global = true, default_value = DEFAULT_KEY_QUERY)]
    pub db_query: String,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CredentialKind {
    /// `FRED_API_KEY` from the environment or `.env`.
    Env,
    /// A single-value query against a SQLite database.
    Sqlite,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch both series, merge on date, fit a line, print and optionally export.
    Fit(FitArgs),
    /// Fetch one series and print its head.
    Series(SeriesArgs),
    /// List FRED releases.
    Releases,
    /// List the series in one release.
    ReleaseSeries {
        /// Release id (see `fredfit releases`).
        #[arg(long)]
        id: u32,
    },
    /// Plot a previously exported fit JSON.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// Runs the same pipeline as `fredfit fit`, then renders the result with Ratatui.
    Tui(FitArgs),
}

/// Options for fitting.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Predictor series id (x).
    #[arg(long, default_value = "CPIAUCSL")]
    pub predictor: String,

    /// Units transformation for the predictor.
    #[arg(long, value_enum, default_value_t = Units::Pc1)]
    pub predictor_units: Units,

    /// Response series id (y).
    #[arg(long, default_value = "UNRATE")]
    pub response: String,

    /// Units transformation for the response.
    #[arg(long, value_enum, default_value_t = Units::Lin)]
    pub response_units: Units,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Rows to show from each table.
    #[arg(long, default_value_t = 5)]
    pub head: usize,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export merged rows with fitted values to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the fit (config + coefficients + points) to JSON.
    #[arg(long = "export-fit")]
    pub export_fit: Option<PathBuf>,

    /// Write a scatter + fit chart as SVG.
    #[arg(long)]
    pub svg: Option<PathBuf>,
}

/// Observation window and sampling frequency.
#[derive(Debug, Args, Clone)]
pub struct WindowArgs {
    /// First observation date (YYYY-MM-DD).
    #[arg(long, default_value = "2000-01-01")]
    pub start: NaiveDate,

    /// Last observation date (YYYY-MM-DD).
    #[arg(long, default_value = "2025-08-31")]
    pub end: NaiveDate,

    /// Aggregation frequency.
    #[arg(long, value_enum, default_value_t = Frequency::M)]
    pub frequency: Frequency,
}

/// Options for fetching a single series.
#[derive(Debug, Args, Clone)]
pub struct SeriesArgs {
    /// Series id.
    #[arg(long, default_value = "UNRATE")]
    pub id: String,

    /// Units transformation.
    #[arg(long, value_enum, default_value_t = Units::Lin)]
    pub units: Units,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Rows to show.
    #[arg(long, default_value_t = 10)]
    pub head: usize,
}

/// Options for plotting a saved fit.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Fit JSON file produced by `fredfit fit --export-fit`.
    #[arg(long, value_name = "JSON")]
    pub fit: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Also write the chart as SVG.
    #[arg(long)]
    pub svg: Option<PathBuf>,
}
