//! Regression over a merged table, addressed by column label.

use tracing::info;

use crate::domain::{FitResult, MergedTable};
use crate::error::AppError;
use crate::math::fit_line;

/// Fit `response_column ≈ intercept + slope · predictor_column`.
pub fn fit(merged: &MergedTable, predictor_column: &str, response_column: &str) -> Result<FitResult, AppError> {
    let x = column(merged, predictor_column)?;
    let y = column(merged, response_column)?;

    let line = fit_line(&x, &y)?;
    info!(
        predictor = predictor_column,
        response = response_column,
        n = x.len(),
        intercept = line.intercept,
        slope = line.slope,
        "fitted regression line"
    );

    Ok(FitResult {
        predictor: predictor_column.to_string(),
        response: response_column.to_string(),
        intercept: line.intercept,
        slope: line.slope,
        n: x.len(),
        r_squared: line.r_squared,
    })
}

fn column(merged: &MergedTable, label: &str) -> Result<Vec<f64>, AppError> {
    merged.column(label).ok_or_else(|| {
        AppError::InvalidRequest(format!(
            "unknown column '{label}' (available: '{}', '{}')",
            merged.left_label, merged.right_label
        ))
    })
}
