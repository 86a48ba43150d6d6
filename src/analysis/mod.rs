//! Analysis module for window statistics
//!
//! This module provides the summary statistics written alongside exported
//! samples and the value extent used for axis fitting.

pub mod stats;

pub use stats::{value_extent, SummaryStats};
