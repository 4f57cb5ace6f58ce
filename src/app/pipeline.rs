//! Shared "fit pipeline" logic used by both CLI and TUI front-ends.
//!
//! FRED fetch (predictor) -> FRED fetch (response) -> merge -> regression
//!
//! The front-ends only decide how to present the `RunOutput`.

use tracing::info;

use crate::data::{FredClient, HttpTransport, merge_labeled};
use crate::domain::{FitConfig, FitResult, MergedTable, SeriesRequest, SeriesTable};
use crate::error::AppError;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub config: FitConfig,
    pub predictor: SeriesTable,
    pub response: SeriesTable,
    pub merged: MergedTable,
    pub fit: FitResult,
}

/// Fetch both series sequentially, then merge and fit.
pub fn run_fit<T: HttpTransport>(client: &FredClient<T>, config: &FitConfig) -> Result<RunOutput, AppError> {
    let predictor = client.load_series(&config.predictor)?;
    let response = client.load_series(&config.response)?;
    run_fit_with_tables(config, predictor, response)
}

/// Merge and fit already-loaded tables.
pub fn run_fit_with_tables(
    config: &FitConfig,
    predictor: SeriesTable,
    response: SeriesTable,
) -> Result<RunOutput, AppError> {
    let (predictor_label, response_label) = column_labels(&config.predictor, &config.response);
    let merged = merge_labeled(&predictor, &response, &predictor_label, &response_label);
    info!(
        predictor_rows = predictor.len(),
        response_rows = response.len(),
        merged_rows = merged.len(),
        "merged series on date"
    );

    let fit = crate::fit::fit(&merged, &predictor_label, &response_label)?;

    Ok(RunOutput {
        config: config.clone(),
        predictor,
        response,
        merged,
        fit,
    })
}

/// Column labels for the merged table; see [`crate::data::merge::column_labels`].
pub fn column_labels(predictor: &SeriesRequest, response: &SeriesRequest) -> (String, String) {
    crate::data::merge::column_labels(
        &predictor.series_id,
        predictor.units,
        &response.series_id,
        response.units,
    )
}
