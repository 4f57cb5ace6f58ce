//! Closed-form ordinary least squares for one predictor plus intercept.
//!
//! ```text
//! slope     = Σ (x_i - x̄)(y_i - ȳ) / Σ (x_i - x̄)^2
//! intercept = ȳ - slope · x̄
//! ```
//!
//! Sums are taken over centered values (two passes) so that large, nearly
//! constant predictors such as index levels do not lose precision.

use crate::error::AppError;

/// Coefficients and goodness of fit of a simple linear regression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub intercept: f64,
    pub slope: f64,
    pub r_squared: f64,
}

/// Fit `y ≈ intercept + slope · x`.
///
/// Fails with [`AppError::InsufficientData`] when the inputs differ in length
/// or carry fewer than two distinct `x` values.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LineFit, AppError> {
    if x.len() != y.len() {
        return Err(AppError::InsufficientData(format!(
            "predictor has {} values but response has {}",
            x.len(),
            y.len()
        )));
    }

    let distinct = x.first().is_some_and(|&x0| x.iter().any(|&v| v != x0));
    if !distinct {
        return Err(AppError::InsufficientData(format!(
            "need at least 2 distinct predictor values, got {} point(s)",
            x.len()
        )));
    }

    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    // Distinct values can still underflow to a zero spread.
    if !(sxx.is_finite() && sxx > 0.0) {
        return Err(AppError::InsufficientData("predictor variance is zero".to_string()));
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let sse: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| {
            let r = yi - (intercept + slope * xi);
            r * r
        })
        .sum();
    let r_squared = if syy > 0.0 { 1.0 - sse / syy } else { 1.0 };

    Ok(LineFit {
        intercept,
        slope,
        r_squared,
    })
}
