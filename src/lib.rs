//! `fred-phillips` library crate.
//!
//! The binary (`fredfit`) is a thin wrapper around this library so that:
//!
//! - the fetch/merge/fit pipeline is testable without spawning processes
//! - HTTP and credential lookup sit behind traits that tests can replace

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
