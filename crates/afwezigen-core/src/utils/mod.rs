//! Utility functions for string formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{escape_html, format_date_dutch, team_anchor};
