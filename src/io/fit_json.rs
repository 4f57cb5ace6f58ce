//! Read/write fit JSON files.
//!
//! A fit file is the portable record of one run: both series requests, the
//! fitted coefficients, and the aligned points, so `fredfit plot` can redraw
//! the chart without network access.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::app::pipeline::RunOutput;
use crate::domain::{FitConfig, FitResult};
use crate::error::AppError;
use crate::report::{FittedRow, compute_residuals};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub config: FitConfig,
    pub fit: FitResult,
    pub points: Vec<FitPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitPoint {
    pub date: NaiveDate,
    pub x: f64,
    pub y: f64,
}

impl FitFile {
    pub fn from_run(run: &RunOutput) -> Self {
        let points = compute_residuals(&run.merged, &run.fit)
            .into_iter()
            .map(|r| FitPoint {
                date: r.date,
                x: r.x,
                y: r.y,
            })
            .collect();
        Self {
            tool: "fredfit".to_string(),
            config: run.config.clone(),
            fit: run.fit.clone(),
            points,
        }
    }

    /// Points with fitted values recomputed from the stored coefficients.
    pub fn fitted_rows(&self) -> Vec<FittedRow> {
        self.points
            .iter()
            .map(|p| {
                let y_fit = self.fit.predict(p.x);
                FittedRow {
                    date: p.date,
                    x: p.x,
                    y: p.y,
                    y_fit,
                    residual: p.y - y_fit,
                }
            })
            .collect()
    }
}

pub fn write_fit_json(path: &Path, run: &RunOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create fit JSON '{}'", path.display()), e))?;
    serde_json::to_writer_pretty(file, &FitFile::from_run(run))
        .map_err(|e| AppError::io("Failed to write fit JSON", e.into()))?;
    Ok(())
}

pub fn read_fit_json(path: &Path) -> Result<FitFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open fit JSON '{}'", path.display()), e))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::io(format!("Invalid fit JSON '{}'", path.display()), e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_fit_with_tables;
    use crate::domain::{Frequency, SeriesRequest, SeriesTable, Units};

    fn d(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, 1).unwrap()
    }

    #[test]
    fn fit_file_preserves_run() {
        let request = |id: &str, units| SeriesRequest {
            series_id: id.to_string(),
            start: d(1),
            end: d(12),
            frequency: Frequency::M,
            units,
        };
        let config = FitConfig {
            predictor: request("CPIAUCSL", Units::Pc1),
            response: request("UNRATE", Units::Lin),
        };
        let predictor =
            SeriesTable::from_points("CPIAUCSL", Units::Pc1, [(d(1), 1.0), (d(2), 2.0), (d(3), 4.0)]).unwrap();
        let response =
            SeriesTable::from_points("UNRATE", Units::Lin, [(d(1), 5.0), (d(2), 4.0), (d(3), 2.5)]).unwrap();
        let run = run_fit_with_tables(&config, predictor, response).unwrap();

        let path = std::env::temp_dir().join(format!("fred_phillips_fit_{}.json", std::process::id()));
        write_fit_json(&path, &run).unwrap();
        let file = read_fit_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(file.tool, "fredfit");
        assert_eq!(file.config, config);
        assert_eq!(file.fit, run.fit);
        assert_eq!(file.points.len(), 3);
        assert_eq!(file.points[2], FitPoint { date: d(3), x: 4.0, y: 2.5 });
        assert_eq!(file.fitted_rows(), compute_residuals(&run.merged, &run.fit));
    }

    #[test]
    fn coefficients_survive_json_exactly() {
        let fit = FitResult {
            predictor: "CPIAUCSL".into(),
            response: "UNRATE".into(),
            intercept: 5.831_018_790_257_146,
            slope: -0.123_456_789_012_345_68,
            n: 296,
            r_squared: 0.994_360_902_255_639_2,
        };
        let text = serde_json::to_string(&fit).unwrap();
        let back: FitResult = serde_json::from_str(&text).unwrap();
        assert_eq!(back.intercept.to_bits(), fit.intercept.to_bits());
        assert_eq!(back.slope.to_bits(), fit.slope.to_bits());
        assert_eq!(back.r_squared.to_bits(), fit.r_squared.to_bits());
    }

    #[test]
    fn invalid_fit_json_is_io_error() {
        let path = std::env::temp_dir().join(format!("fred_phillips_bad_{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_fit_json(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(matches!(err, AppError::Io { .. }));
    }
}
