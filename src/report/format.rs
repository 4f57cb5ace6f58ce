//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the data and math code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::RunOutput;
use crate::domain::{FitResult, MergedTable, Release, ReleaseSeries, SeriesTable};

/// First `n` rows of a series.
pub fn format_series_head(table: &SeriesTable, n: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} ({}) | rows={} | {}..{}\n",
        table.series_id,
        table.units.label(),
        table.len(),
        table.first_date().map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
        table.last_date().map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
    ));
    out.push_str(&format!("{:<10} {:>12}\n", "date", "value"));
    out.push_str(&format!("{:-<10} {:-<12}\n", "", ""));
    for (date, value) in table.iter().take(n) {
        out.push_str(&format!("{date} {value:>12.4}\n"));
    }
    out
}

/// First `n` rows of the merged table.
pub fn format_merged_head(merged: &MergedTable, n: usize) -> String {
    let left = truncate(&merged.left_label, 14);
    let right = truncate(&merged.right_label, 14);

    let mut out = String::new();
    out.push_str(&format!("merged | rows={}\n", merged.len()));
    out.push_str(&format!("{:<10} {left:>14} {right:>14}\n", "date"));
    out.push_str(&format!("{:-<10} {:-<14} {:-<14}\n", "", "", ""));
    for (date, l, r) in merged.rows().take(n) {
        out.push_str(&format!("{date} {l:>14.4} {r:>14.4}\n"));
    }
    out
}

/// `response = a + b * predictor`.
pub fn format_equation(fit: &FitResult) -> String {
    let sign = if fit.slope < 0.0 { '-' } else { '+' };
    format!(
        "{} = {:.3} {sign} {:.3} * {}",
        fit.response,
        fit.intercept,
        fit.slope.abs(),
        fit.predictor
    )
}

/// Full run summary: both inputs, the merged table, and the fitted line.
pub fn format_run_summary(run: &RunOutput, head: usize) -> String {
    let mut out = String::new();

    out.push_str("=== fredfit - linear regression over FRED series ===\n");
    out.push_str(&format!(
        "Window: {}..{} | frequency={}\n\n",
        run.config.predictor.start,
        run.config.predictor.end,
        run.config.predictor.frequency.as_param(),
    ));

    out.push_str("Predictor:\n");
    out.push_str(&format_series_head(&run.predictor, head));
    out.push('\n');

    out.push_str("Response:\n");
    out.push_str(&format_series_head(&run.response, head));
    out.push('\n');

    out.push_str(&format_merged_head(&run.merged, head));
    out.push('\n');

    out.push_str("Linear regression:\n");
    out.push_str(&format!("- {}\n", format_equation(&run.fit)));
    out.push_str(&format!("- n={} | R^2={:.4}\n", run.fit.n, run.fit.r_squared));

    out
}

pub fn format_releases(releases: &[Release]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>6} {}\n", "id", "name"));
    out.push_str(&format!("{:->6} {:-<40}\n", "", ""));
    for r in releases {
        out.push_str(&format!("{:>6} {}\n", r.id, r.name));
    }
    out
}

pub fn format_release_series(series: &[ReleaseSeries]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<24} {}\n", "id", "title"));
    out.push_str(&format!("{:-<24} {:-<40}\n", "", ""));
    for s in series {
        out.push_str(&format!("{:<24} {}\n", truncate(&s.id, 24), s.title));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::domain::Units;

    fn d(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, 1).unwrap()
    }

    #[test]
    fn equation_shows_sign_of_slope() {
        let mut fit = FitResult {
            predictor: "CPIAUCSL".into(),
            response: "UNRATE".into(),
            intercept: 5.5,
            slope: -0.25,
            n: 10,
            r_squared: 0.1,
        };
        assert_eq!(format_equation(&fit), "UNRATE = 5.500 - 0.250 * CPIAUCSL");
        fit.slope = 0.25;
        assert_eq!(format_equation(&fit), "UNRATE = 5.500 + 0.250 * CPIAUCSL");
    }

    #[test]
    fn series_head_limits_rows() {
        let table =
            SeriesTable::from_points("UNRATE", Units::Lin, [(d(1), 3.7), (d(2), 3.9), (d(3), 3.8)]).unwrap();
        let txt = format_series_head(&table, 2);
        assert!(txt.starts_with("UNRATE (level) | rows=3 | 2024-01-01..2024-03-01\n"));
        assert!(txt.contains("2024-02-01"));
        assert!(!txt.lines().any(|l| l.starts_with("2024-03-01")));
        assert_eq!(txt.lines().count(), 5);
    }

    #[test]
    fn merged_head_snapshot() {
        let mut rows = BTreeMap::new();
        rows.insert(d(1), (3.1, 3.7));
        let merged = MergedTable::new("CPIAUCSL", "UNRATE", rows);
        let expected = concat!(
            "merged | rows=1\n",
            "date             CPIAUCSL         UNRATE\n",
            "---------- -------------- --------------\n",
            "2024-01-01         3.1000         3.7000\n",
        );
        assert_eq!(format_merged_head(&merged, 5), expected);
    }

    #[test]
    fn truncate_marks_cut_labels() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 5), "abcd.");
    }
}
