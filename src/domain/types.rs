//! Shared domain types.
//!
//! Tables are plain ordered maps keyed by calendar date so that joins and
//! iteration are deterministic without any explicit sorting.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// FRED `frequency` aggregation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Daily.
    D,
    /// Weekly.
    W,
    /// Biweekly.
    Bw,
    /// Monthly.
    M,
    /// Quarterly.
    Q,
    /// Semiannual.
    Sa,
    /// Annual.
    A,
}

impl Frequency {
    pub fn as_param(self) -> &'static str {
        match self {
            Frequency::D => "d",
            Frequency::W => "w",
            Frequency::Bw => "bw",
            Frequency::M => "m",
            Frequency::Q => "q",
            Frequency::Sa => "sa",
            Frequency::A => "a",
        }
    }
}

/// FRED `units` transform applied server-side to each observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Levels (no transform).
    Lin,
    /// Change.
    Chg,
    /// Change from one year ago.
    Ch1,
    /// Percent change.
    Pch,
    /// Percent change from one year ago (YoY %).
    #[value(name = "pc1")]
    Pc1,
    /// Compounded annual rate of change.
    Pca,
    /// Continuously compounded rate of change.
    Cch,
    /// Continuously compounded annual rate of change.
    Cca,
    /// Natural log.
    Log,
}

impl Units {
    pub fn as_param(self) -> &'static str {
        match self {
            Units::Lin => "lin",
            Units::Chg => "chg",
            Units::Ch1 => "ch1",
            Units::Pch => "pch",
            Units::Pc1 => "pc1",
            Units::Pca => "pca",
            Units::Cch => "cch",
            Units::Cca => "cca",
            Units::Log => "log",
        }
    }

    /// Short human label used in report headers and axis titles.
    pub fn label(self) -> &'static str {
        match self {
            Units::Lin => "level",
            Units::Chg => "change",
            Units::Ch1 => "YoY change",
            Units::Pch => "% change",
            Units::Pc1 => "YoY %",
            Units::Pca => "annualized %",
            Units::Cch => "cont. change",
            Units::Cca => "cont. annualized",
            Units::Log => "log",
        }
    }
}

/// Parameters for one `series/observations` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRequest {
    pub series_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub frequency: Frequency,
    pub units: Units,
}

/// The two series a run regresses: `response ≈ intercept + slope · predictor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    pub predictor: SeriesRequest,
    pub response: SeriesRequest,
}

/// A single parsed record. `value` is `None` for the API's missing-value marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Date-indexed values for one series; only present values are stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    pub series_id: String,
    pub units: Units,
    values: BTreeMap<NaiveDate, f64>,
}

impl SeriesTable {
    /// Build a table from present values.
    ///
    /// Returns the first repeated date on failure, leaving the caller to decide
    /// how to classify it.
    pub fn from_points(
        series_id: impl Into<String>,
        units: Units,
        points: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Result<Self, NaiveDate> {
        let mut values = BTreeMap::new();
        for (date, value) in points {
            if values.insert(date, value).is_some() {
                return Err(date);
            }
        }
        Ok(Self {
            series_id: series_id.into(),
            units,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, date: &NaiveDate) -> Option<f64> {
        self.values.get(date).copied()
    }

    /// Iterate in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.values.iter().map(|(d, v)| (*d, *v))
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.values.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.values.keys().next_back().copied()
    }
}

/// Inner join of two series: each row carries `(left, right)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTable {
    pub left_label: String,
    pub right_label: String,
    rows: BTreeMap<NaiveDate, (f64, f64)>,
}

impl MergedTable {
    pub fn new(
        left_label: impl Into<String>,
        right_label: impl Into<String>,
        rows: BTreeMap<NaiveDate, (f64, f64)>,
    ) -> Self {
        Self {
            left_label: left_label.into(),
            right_label: right_label.into(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, f64, f64)> + '_ {
        self.rows.iter().map(|(d, (l, r))| (*d, *l, *r))
    }

    /// Values of the column named `label`, in date order.
    pub fn column(&self, label: &str) -> Option<Vec<f64>> {
        if label == self.left_label {
            Some(self.rows.values().map(|(l, _)| *l).collect())
        } else if label == self.right_label {
            Some(self.rows.values().map(|(_, r)| *r).collect())
        } else {
            None
        }
    }
}

/// Fitted line `response = intercept + slope * predictor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub predictor: String,
    pub response: String,
    pub intercept: f64,
    pub slope: f64,
    /// Number of points the fit used.
    pub n: usize,
    pub r_squared: f64,
}

impl FitResult {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Entry of the `releases` catalog endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Release {
    pub id: u32,
    pub name: String,
}

/// Entry of the `release/series` catalog endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReleaseSeries {
    pub id: String,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, 1).unwrap()
    }

    #[test]
    fn series_table_orders_unsorted_input() {
        let table = SeriesTable::from_points("X", Units::Lin, [(d(3), 3.0), (d(1), 1.0), (d(2), 2.0)]).unwrap();
        let dates: Vec<_> = table.iter().map(|(d, _)| d).collect();
        assert_eq!(dates, vec![d(1), d(2), d(3)]);
        assert_eq!(table.first_date(), Some(d(1)));
        assert_eq!(table.last_date(), Some(d(3)));
    }

    #[test]
    fn series_table_rejects_duplicate_dates() {
        let err = SeriesTable::from_points("X", Units::Lin, [(d(1), 1.0), (d(1), 2.0)]).unwrap_err();
        assert_eq!(err, d(1));
    }

    #[test]
    fn merged_column_lookup_by_label() {
        let mut rows = BTreeMap::new();
        rows.insert(d(1), (1.0, 10.0));
        rows.insert(d(2), (2.0, 20.0));
        let merged = MergedTable::new("CPI", "UNRATE", rows);
        assert_eq!(merged.column("CPI"), Some(vec![1.0, 2.0]));
        assert_eq!(merged.column("UNRATE"), Some(vec![10.0, 20.0]));
        assert_eq!(merged.column("GDP"), None);
    }

    #[test]
    fn param_spellings_match_api() {
        assert_eq!(Units::Pc1.as_param(), "pc1");
        assert_eq!(Units::Lin.as_param(), "lin");
        assert_eq!(Frequency::M.as_param(), "m");
        assert_eq!(Frequency::Sa.as_param(), "sa");
    }
}
