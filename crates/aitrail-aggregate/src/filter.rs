//! Re-aggregation of a [`DashboardData`] snapshot under user filters.
//!
//! Mirrors the dashboard's in-browser filter: the recent commits are
//! filtered and every total, the per-date rollup and the author rollup are
//! rebuilt from the surviving commits, so they stay consistent with each
//! other rather than with the unfiltered server totals.

use std::collections::BTreeMap;

use serde::Serialize;
use time::OffsetDateTime;

use aitrail_core::percent;

use crate::model::{AuthorStats, CommitDetail, CommitStats, DashboardData, ModelStats, ToolStats};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardFilter {
    /// Keep commits dated within the last N days, counted back from now.
    pub days: Option<i64>,
    pub tool: Option<String>,
    pub model: Option<String>,
    /// Git-level author name of the commit.
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredView {
    pub commits: Vec<CommitDetail>,
    pub commits_by_date: Vec<CommitStats>,
    pub models: Vec<ModelStats>,
    pub tools: Vec<ToolStats>,
    pub authors: Vec<AuthorStats>,
    pub total_commits: u64,
    pub total_files: u64,
    pub total_lines: u64,
    pub ai_lines: u64,
    pub human_lines: i64,
    pub ai_percentage: f64,
}

impl DashboardFilter {
    pub fn is_empty(&self) -> bool {
        self.days.is_none() && self.tool.is_none() && self.model.is_none() && self.author.is_none()
    }

    /// Human-readable tags for the active filters.
    pub fn tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        if let Some(days) = self.days {
            tags.push(format!("Time: Last {days} days"));
        }
        if let Some(tool) = &self.tool {
            tags.push(format!("Tool: {tool}"));
        }
        if let Some(model) = &self.model {
            tags.push(format!("Model: {model}"));
        }
        if let Some(author) = &self.author {
            tags.push(format!("Author: {author}"));
        }
        tags
    }

    /// Apply the filter with the time window anchored at `now`.
    pub fn apply(&self, data: &DashboardData, now: OffsetDateTime) -> FilteredView {
        let all_authors = data.authors_by_commits();
        let mut models = data.models_by_commits();
        let mut tools = data.tools_by_commits();
        let mut commits = data.recent_commits.clone();

        // A window reaching past the earliest representable date keeps everything.
        if let Some(cutoff) = self.days.and_then(|days| cutoff_day(now, days)) {
            commits.retain(|c| c.day() >= cutoff.as_str());
        }
        if let Some(tool) = &self.tool {
            commits.retain(|c| c.tool.as_deref() == Some(tool.as_str()));
            tools.retain(|t| &t.tool == tool);
        }
        if let Some(model) = &self.model {
            commits.retain(|c| c.model.as_deref() == Some(model.as_str()));
            models.retain(|m| &m.model == model);
        }
        if let Some(author) = &self.author {
            commits.retain(|c| &c.author == author);
        }

        let mut by_date: BTreeMap<String, CommitStats> = BTreeMap::new();
        for c in &commits {
            let day = c.day().to_string();
            let entry = by_date.entry(day.clone()).or_insert_with(|| CommitStats {
                date: day,
                ..CommitStats::default()
            });
            entry.count += 1;
            entry.total_lines += c.total_lines;
            entry.ai_lines += c.ai_lines;
        }
        for d in by_date.values_mut() {
            d.ai_percent = percent(d.ai_lines as f64, d.total_lines as f64);
        }

        // The git author is a short name; match it to the first note author
        // that starts with it, falling back to the short name itself.
        let mut authors: Vec<AuthorStats> = Vec::new();
        for c in &commits {
            let key = all_authors
                .iter()
                .find(|a| a.author.starts_with(&c.author))
                .map(|a| a.author.clone())
                .unwrap_or_else(|| c.author.clone());
            let idx = match authors.iter().position(|a| a.author == key) {
                Some(i) => i,
                None => {
                    authors.push(AuthorStats {
                        author: key,
                        ..AuthorStats::default()
                    });
                    authors.len() - 1
                }
            };
            let a = &mut authors[idx];
            a.commits += 1;
            a.total_lines += c.total_lines;
            a.ai_assisted_lines += c.ai_lines;
        }
        for a in &mut authors {
            a.ai_usage_percent = percent(a.ai_assisted_lines as f64, a.total_lines as f64);
        }
        authors.sort_by(|a, b| b.commits.cmp(&a.commits));

        let total_lines: u64 = commits.iter().map(|c| c.total_lines).sum();
        let ai_lines: u64 = commits.iter().map(|c| c.ai_lines).sum();

        FilteredView {
            total_commits: commits.len() as u64,
            // File stats are not tracked per commit, so the file count stays global.
            total_files: data.file_stats.len() as u64,
            total_lines,
            ai_lines,
            human_lines: total_lines as i64 - ai_lines as i64,
            ai_percentage: percent(ai_lines as f64, total_lines as f64),
            commits,
            commits_by_date: by_date.into_values().collect(),
            models,
            tools,
            authors,
        }
    }
}

impl From<&DashboardData> for FilteredView {
    /// The unfiltered view: server-side totals and sorted rollups.
    fn from(data: &DashboardData) -> Self {
        Self {
            commits: data.recent_commits.clone(),
            commits_by_date: data.dates_ascending(),
            models: data.models_by_commits(),
            tools: data.tools_by_commits(),
            authors: data.authors_by_commits(),
            total_commits: data.total_commits,
            total_files: data.total_files,
            total_lines: data.total_lines,
            ai_lines: data.ai_lines,
            human_lines: data.human_lines,
            ai_percentage: data.ai_percentage,
        }
    }
}

/// `YYYY-MM-DD` of `now - days` in UTC, or `None` when that lies outside
/// the representable range.
fn cutoff_day(now: OffsetDateTime, days: i64) -> Option<String> {
    let span = time::Duration::seconds(days.checked_mul(86_400)?);
    let date = now.to_offset(time::UtcOffset::UTC).checked_sub(span)?.date();
    Some(format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    ))
}
