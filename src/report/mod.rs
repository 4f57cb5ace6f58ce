//! Reporting utilities: residuals and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{FitResult, MergedTable};

/// Per-date fitted value and residual for the predictor/response pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedRow {
    pub date: chrono::NaiveDate,
    pub x: f64,
    pub y: f64,
    pub y_fit: f64,
    pub residual: f64,
}

/// Compute fitted values and residuals for each merged row.
///
/// `fit.predictor` names the x column; the other column is the response.
pub fn compute_residuals(merged: &MergedTable, fit: &FitResult) -> Vec<FittedRow> {
    let predictor_is_left = fit.predictor == merged.left_label;
    merged
        .rows()
        .map(|(date, l, r)| {
            let (x, y) = if predictor_is_left { (l, r) } else { (r, l) };
            let y_fit = fit.predict(x);
            FittedRow {
                date,
                x,
                y,
                y_fit,
                residual: y - y_fit,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn residuals_follow_predictor_column() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut rows = BTreeMap::new();
        rows.insert(date, (2.0, 9.0));
        let merged = MergedTable::new("X", "Y", rows);

        let fit = FitResult {
            predictor: "X".into(),
            response: "Y".into(),
            intercept: 1.0,
            slope: 3.0,
            n: 1,
            r_squared: 1.0,
        };
        let out = compute_residuals(&merged, &fit);
        assert_eq!(out[0].y_fit, 7.0);
        assert_eq!(out[0].residual, 2.0);

        let flipped = FitResult {
            predictor: "Y".into(),
            response: "X".into(),
            ..fit
        };
        let out = compute_residuals(&merged, &flipped);
        assert_eq!(out[0].x, 9.0);
        assert_eq!(out[0].y, 2.0);
    }
}
