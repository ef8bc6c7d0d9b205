//! Utility functions and helpers.
//!
//! This module contains utility functions used throughout the application,
//! currently the significant-digit float formatting used for report output.

pub mod format;

pub use format::format_sig;
