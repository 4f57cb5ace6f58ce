//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - request parameters (`SeriesRequest`, `Frequency`, `Units`)
//! - date-indexed tables (`SeriesTable`, `MergedTable`)
//! - fit outputs (`FitResult`)
//! - catalog records (`Release`, `ReleaseSeries`)

pub mod types;

pub use types::*;
