//! Terminal output
//!
//! Styled text reports for the CLI commands and, behind the `tui` feature,
//! a live monitoring dashboard.

mod report;

#[cfg(feature = "tui")]
pub mod tui;

pub use report::*;
