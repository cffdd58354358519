//! Markdown reports of AI authorship notes for pull-request comments.

mod format;
mod render;
mod stats;

pub use format::{format_duration, format_timestamp, pie_glyph, progress_bar, round_half_up};
pub use render::{format_commit, format_range, COMMENT_FOOTER};
pub use stats::{aggregate_stats, AggregateStats};
