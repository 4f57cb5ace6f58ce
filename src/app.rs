//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the FRED API key
//! - fetches, merges and fits
//! - prints reports/plots
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use crate::cli::{Command, CredentialKind, FitArgs, GlobalArgs, PlotArgs, SeriesArgs};
use crate::data::{CredentialSource, EnvCredentials, FredClient, ReqwestTransport, SqliteCredentials};
use crate::domain::{FitConfig, SeriesRequest};
use crate::error::AppError;

pub mod pipeline;

const SVG_SIZE: (u32, u32) = (1024, 768);

/// Parsed fit options, independent of clap.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub fit: FitConfig,
    pub head: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_csv: Option<PathBuf>,
    pub export_fit: Option<PathBuf>,
    pub svg: Option<PathBuf>,
}

/// Entry point for the `fredfit` binary.
pub fn run() -> Result<(), AppError> {
    // `fredfit` and `fredfit --start 2010-01-01` behave like `fredfit fit ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    crate::logging::init(cli.global.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(&cli.global, &args),
        Command::Series(args) => handle_series(&cli.global, &args),
        Command::Releases => handle_releases(&cli.global),
        Command::ReleaseSeries { id } => handle_release_series(&cli.global, id),
        Command::Plot(args) => handle_plot(&args),
        Command::Tui(args) => handle_tui(&cli.global, &args),
    }
}

fn handle_fit(global: &GlobalArgs, args: &FitArgs) -> Result<(), AppError> {
    let config = app_config_from_args(args);
    let client = build_client(global)?;
    let run = pipeline::run_fit(&client, &config.fit)?;

    println!("{}", crate::report::format_run_summary(&run, config.head));

    let rows = crate::report::compute_residuals(&run.merged, &run.fit);
    if config.plot {
        let plot = crate::plot::render_ascii_plot(&rows, &run.fit, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    if let Some(path) = &config.export_csv {
        crate::io::write_merged_csv(path, &rows, &run.fit)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &config.export_fit {
        crate::io::write_fit_json(path, &run)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &config.svg {
        crate::plot::write_svg_chart(path, &rows, &run.fit, SVG_SIZE)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn handle_series(global: &GlobalArgs, args: &SeriesArgs) -> Result<(), AppError> {
    let client = build_client(global)?;
    let request = SeriesRequest {
        series_id: args.id.clone(),
        start: args.window.start,
        end: args.window.end,
        frequency: args.window.frequency,
        units: args.units,
    };
    let table = client.load_series(&request)?;
    println!("{}", crate::report::format_series_head(&table, args.head));
    Ok(())
}

fn handle_releases(global: &GlobalArgs) -> Result<(), AppError> {
    let client = build_client(global)?;
    let releases = client.releases()?;
    println!("{}", crate::report::format_releases(&releases));
    Ok(())
}

fn handle_release_series(global: &GlobalArgs, release_id: u32) -> Result<(), AppError> {
    let client = build_client(global)?;
    let series = client.release_series(release_id)?;
    println!("{}", crate::report::format_release_series(&series));
    Ok(())
}

fn handle_tui(global: &GlobalArgs, args: &FitArgs) -> Result<(), AppError> {
    let config = app_config_from_args(args);
    let client = build_client(global)?;
    let run = pipeline::run_fit(&client, &config.fit)?;
    crate::tui::run(run)
}

fn handle_plot(args: &PlotArgs) -> Result<(), AppError> {
    let file = crate::io::read_fit_json(&args.fit)?;
    let rows = file.fitted_rows();

    println!("{}", crate::report::format_equation(&file.fit));
    println!("{}", crate::plot::render_ascii_plot(&rows, &file.fit, args.width, args.height));

    if let Some(path) = &args.svg {
        crate::plot::write_svg_chart(path, &rows, &file.fit, SVG_SIZE)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Resolve the key before any network call, then build the HTTP client.
fn build_client(global: &GlobalArgs) -> Result<FredClient, AppError> {
    let source = credential_source(global)?;
    let api_key = source.api_key()?;
    debug!(base_url = %global.base_url, "FRED client ready");
    Ok(FredClient::with_transport(ReqwestTransport::new(), global.base_url.clone(), api_key))
}

fn credential_source(global: &GlobalArgs) -> Result<Box<dyn CredentialSource>, AppError> {
    match global.credentials {
        CredentialKind::Env => Ok(Box::new(EnvCredentials::new())),
        CredentialKind::Sqlite => {
            let url = global.db_url.clone().ok_or_else(|| {
                AppError::InvalidRequest("--credentials sqlite requires --db-url".to_string())
            })?;
            Ok(Box::new(SqliteCredentials::new(url).with_query(global.db_query.clone())))
        }
    }
}

pub fn app_config_from_args(args: &FitArgs) -> AppConfig {
    let request = |series_id: &str, units| SeriesRequest {
        series_id: series_id.to_string(),
        start: args.window.start,
        end: args.window.end,
        frequency: args.window.frequency,
        units,
    };
    AppConfig {
        fit: FitConfig {
            predictor: request(&args.predictor, args.predictor_units),
            response: request(&args.response, args.response_units),
        },
        head: args.head,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: args.export.clone(),
        export_fit: args.export_fit.clone(),
        svg: args.svg.clone(),
    }
}

/// Global options that consume the following token as their value.
const GLOBAL_VALUE_FLAGS: &[&str] = &["--base-url", "--credentials", "--db-url", "--db-query"];

/// Rewrite argv so `fredfit` defaults to `fredfit fit`.
///
/// Rules:
/// - `fredfit`                         -> `fredfit fit`
/// - `fredfit --start 2010-01-01 ...`  -> `fredfit fit --start 2010-01-01 ...`
/// - `fredfit --help/--version/-h`     -> unchanged (show top-level help/version)
/// - `fredfit -v releases ...`         -> unchanged (global flags may precede the subcommand)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let keep = command_token(&argv).is_some_and(|token| {
        matches!(
            token,
            "-h" | "--help"
                | "-V"
                | "--version"
                | "help"
                | "fit"
                | "series"
                | "releases"
                | "release-series"
                | "plot"
                | "tui"
        )
    });
    if !keep {
        argv.insert(1.min(argv.len()), "fit".to_string());
    }
    argv
}

/// First token after any leading global options: the subcommand slot.
fn command_token(argv: &[String]) -> Option<&str> {
    let mut i = 1;
    while let Some(arg) = argv.get(i) {
        let arg = arg.as_str();
        if GLOBAL_VALUE_FLAGS.contains(&arg) {
            i += 2;
        } else if is_inline_global(arg) || is_verbose_flag(arg) {
            i += 1;
        } else {
            return Some(arg);
        }
    }
    None
}

fn is_inline_global(arg: &str) -> bool {
    arg.split_once('=')
        .is_some_and(|(name, _)| GLOBAL_VALUE_FLAGS.contains(&name))
}

fn is_verbose_flag(arg: &str) -> bool {
    arg == "--verbose" || (arg.len() > 1 && arg.starts_with('-') && arg[1..].chars().all(|c| c == 'v'))
}
