//! Export merged rows with fitted values to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::Path;

use crate::domain::FitResult;
use crate::error::AppError;
use crate::report::FittedRow;

/// Write `date,<predictor>,<response>,fitted,residual` rows.
pub fn write_merged_csv(path: &Path, rows: &[FittedRow], fit: &FitResult) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| csv_error(format!("Failed to create export CSV '{}'", path.display()), e))?;

    writer
        .write_record(["date", fit.predictor.as_str(), fit.response.as_str(), "fitted", "residual"])
        .map_err(|e| csv_error("Failed to write export CSV header", e))?;

    for r in rows {
        writer
            .write_record([
                r.date.to_string(),
                format!("{:.6}", r.x),
                format!("{:.6}", r.y),
                format!("{:.6}", r.y_fit),
                format!("{:.6}", r.residual),
            ])
            .map_err(|e| csv_error("Failed to write export CSV row", e))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io("Failed to flush export CSV", e))?;
    Ok(())
}

fn csv_error(context: impl Into<String>, err: csv::Error) -> AppError {
    let source = match err.into_kind() {
        csv::ErrorKind::Io(io) => io,
        other => std::io::Error::other(format!("{other:?}")),
    };
    AppError::io(context, source)
}
