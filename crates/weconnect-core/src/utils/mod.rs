//! Utility functions for string and time formatting.

pub mod format;

pub use format::{age_display, format_date, single_line, truncate_string};
