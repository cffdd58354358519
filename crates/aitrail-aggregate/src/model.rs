use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-day rollup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitStats {
    pub date: String,
    pub count: u64,
    pub ai_lines: u64,
    pub total_lines: u64,
    pub ai_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStats {
    pub model: String,
    pub commits: u64,
    pub lines: u64,
    pub accepted_lines: u64,
    pub acceptance_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolStats {
    pub tool: String,
    pub commits: u64,
    pub lines: u64,
}

/// Rollup keyed by the note-embedded human author.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorStats {
    pub author: String,
    pub commits: u64,
    pub total_lines: u64,
    pub ai_assisted_lines: u64,
    pub ai_usage_percent: f64,
}

/// Per-file rollup. Line counts are fractional: a commit's totals are split
/// evenly across the files it touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStats {
    pub filepath: String,
    pub modifications: u64,
    pub ai_lines: f64,
    pub total_lines: f64,
    pub last_modified: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceRate {
    pub date: String,
    pub rate: f64,
}

/// One commit as shown in the recent activity table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitDetail {
    pub sha: String,
    pub short_sha: String,
    pub date: String,
    pub author: String,
    pub message: String,
    pub ai_percent: f64,
    pub total_lines: u64,
    pub ai_lines: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
}

impl CommitDetail {
    pub fn day(&self) -> &str {
        aitrail_core::day_of(&self.date)
    }
}

/// Aggregate root produced by one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub total_commits: u64,
    pub total_files: u64,
    pub total_lines: u64,
    pub ai_lines: u64,
    /// `total_lines - ai_lines`; negative when notes over-report accepted lines.
    pub human_lines: i64,
    pub ai_percentage: f64,
    pub commits_by_date: BTreeMap<String, CommitStats>,
    pub model_usage: BTreeMap<String, ModelStats>,
    pub tool_usage: BTreeMap<String, ToolStats>,
    pub author_stats: BTreeMap<String, AuthorStats>,
    pub file_stats: BTreeMap<String, FileStats>,
    pub acceptance_rates: Vec<AcceptanceRate>,
    pub recent_commits: Vec<CommitDetail>,
}

impl DashboardData {
    pub fn dates_ascending(&self) -> Vec<CommitStats> {
        // BTreeMap keys are already in ascending string order.
        self.commits_by_date.values().cloned().collect()
    }

    pub fn models_by_commits(&self) -> Vec<ModelStats> {
        let mut v: Vec<ModelStats> = self.model_usage.values().cloned().collect();
        v.sort_by(|a, b| b.commits.cmp(&a.commits));
        v
    }

    pub fn tools_by_commits(&self) -> Vec<ToolStats> {
        let mut v: Vec<ToolStats> = self.tool_usage.values().cloned().collect();
        v.sort_by(|a, b| b.commits.cmp(&a.commits));
        v
    }

    pub fn authors_by_commits(&self) -> Vec<AuthorStats> {
        let mut v: Vec<AuthorStats> = self.author_stats.values().cloned().collect();
        v.sort_by(|a, b| b.commits.cmp(&a.commits));
        v
    }

    pub fn files_by_modifications(&self) -> Vec<FileStats> {
        let mut v: Vec<FileStats> = self.file_stats.values().cloned().collect();
        v.sort_by(|a, b| b.modifications.cmp(&a.modifications));
        v
    }

    /// Distinct git-level authors of the recent commits, sorted.
    pub fn recent_authors(&self) -> Vec<String> {
        let set: std::collections::BTreeSet<&str> =
            self.recent_commits.iter().map(|c| c.author.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }
}
