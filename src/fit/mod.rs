//! Regression of one merged column on the other.

pub mod regress;

pub use regress::*;
