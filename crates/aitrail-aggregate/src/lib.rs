mod engine;
mod filter;
mod model;

pub use engine::{aggregate, Aggregator, RECENT_COMMITS_LIMIT};
pub use filter::{DashboardFilter, FilteredView};
pub use model::{
    AcceptanceRate, AuthorStats, CommitDetail, CommitStats, DashboardData, FileStats, ModelStats,
    ToolStats,
};
