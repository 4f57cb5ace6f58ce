//! Input/output helpers.
//!
//! - merged rows + fitted values to CSV (`export`)
//! - fit JSON read/write (`fit_json`)

pub mod export;
pub mod fit_json;

pub use export::*;
pub use fit_json::*;
