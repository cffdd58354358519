use std::collections::BTreeSet;

use aitrail_core::{parse_note, percent, resolve_metrics, DiffStatSource, ParsedNote, RawCommit};

use crate::model::{
    AcceptanceRate, AuthorStats, CommitDetail, CommitStats, DashboardData, FileStats, ModelStats,
    ToolStats,
};

/// Number of commits kept for the recent activity table.
pub const RECENT_COMMITS_LIMIT: usize = 20;

/// Fold commits into dashboard rollups.
///
/// Commits without a note or with a note that is not an AI authorship note
/// contribute nothing. `total_commits` counts every commit that carries a
/// note, parsed or not.
pub fn aggregate<S>(commits: &[RawCommit], diff_stats: &S) -> DashboardData
where
    S: DiffStatSource + ?Sized,
{
    let mut agg = Aggregator::new(diff_stats);
    for commit in commits {
        agg.push(commit);
    }
    agg.finish()
}

/// Incremental form of [`aggregate`].
pub struct Aggregator<'a, S: ?Sized> {
    diff_stats: &'a S,
    data: DashboardData,
    files: BTreeSet<String>,
}

impl<'a, S> Aggregator<'a, S>
where
    S: DiffStatSource + ?Sized,
{
    pub fn new(diff_stats: &'a S) -> Self {
        Self {
            diff_stats,
            data: DashboardData::default(),
            files: BTreeSet::new(),
        }
    }

    /// Fold one commit. Returns `true` if it contributed to the rollups.
    pub fn push(&mut self, commit: &RawCommit) -> bool {
        let Some(note) = commit.note.as_deref() else {
            return false;
        };
        self.data.total_commits += 1;

        let Some(parsed) = parse_note(note) else {
            tracing::debug!(sha = commit.short_sha(), "note is not an authorship note");
            return false;
        };
        self.fold(commit, &parsed);
        true
    }

    fn fold(&mut self, commit: &RawCommit, parsed: &ParsedNote) {
        let metrics = resolve_metrics(parsed, &commit.sha, self.diff_stats);
        let total_lines = metrics.total_lines;
        let ai_lines = parsed.accepted_lines;
        let ai_percent = percent(ai_lines as f64, total_lines as f64);
        let data = &mut self.data;

        // Per-file numbers are an even split of the commit totals.
        let file_count = parsed.files.len().max(1) as f64;
        let lines_per_file = total_lines as f64 / file_count;
        let ai_per_file = ai_lines as f64 / file_count;
        for file in &parsed.files {
            self.files.insert(file.clone());
            let entry = data
                .file_stats
                .entry(file.clone())
                .or_insert_with(|| FileStats {
                    filepath: file.clone(),
                    ..FileStats::default()
                });
            entry.modifications += 1;
            entry.ai_lines += ai_per_file;
            entry.total_lines += lines_per_file;
            entry.last_modified = commit.date.clone();
        }

        data.total_lines += total_lines;
        data.ai_lines += ai_lines;

        let day = commit.day().to_string();
        let by_date = data
            .commits_by_date
            .entry(day.clone())
            .or_insert_with(|| CommitStats {
                date: day,
                ..CommitStats::default()
            });
        by_date.count += 1;
        by_date.ai_lines += ai_lines;
        by_date.total_lines += total_lines;
        by_date.ai_percent = percent(by_date.ai_lines as f64, by_date.total_lines as f64);

        if let Some(model) = &parsed.model {
            let m = data
                .model_usage
                .entry(model.clone())
                .or_insert_with(|| ModelStats {
                    model: model.clone(),
                    ..ModelStats::default()
                });
            m.commits += 1;
            m.lines += total_lines;
            m.accepted_lines += ai_lines;
            m.acceptance_rate = percent(m.accepted_lines as f64, m.lines as f64);
        }

        if let Some(tool) = &parsed.tool {
            let t = data
                .tool_usage
                .entry(tool.clone())
                .or_insert_with(|| ToolStats {
                    tool: tool.clone(),
                    ..ToolStats::default()
                });
            t.commits += 1;
            t.lines += total_lines;
        }

        if let Some(author) = &parsed.author {
            let a = data
                .author_stats
                .entry(author.clone())
                .or_insert_with(|| AuthorStats {
                    author: author.clone(),
                    ..AuthorStats::default()
                });
            a.commits += 1;
            a.total_lines += total_lines;
            a.ai_assisted_lines += ai_lines;
            a.ai_usage_percent = percent(a.ai_assisted_lines as f64, a.total_lines as f64);
        }

        if data.recent_commits.len() < RECENT_COMMITS_LIMIT {
            data.recent_commits.push(CommitDetail {
                sha: commit.sha.clone(),
                short_sha: commit.short_sha().to_string(),
                date: commit.date.clone(),
                author: commit.author.clone(),
                message: commit.message.clone(),
                ai_percent,
                total_lines,
                ai_lines,
                model: parsed.model.clone(),
                tool: parsed.tool.clone(),
            });
        }
    }

    /// Derive the global totals and the acceptance-rate series.
    pub fn finish(self) -> DashboardData {
        let mut data = self.data;
        data.total_files = self.files.len() as u64;
        data.human_lines = data.total_lines as i64 - data.ai_lines as i64;
        data.ai_percentage = percent(data.ai_lines as f64, data.total_lines as f64);
        data.acceptance_rates = data
            .commits_by_date
            .values()
            .map(|d| AcceptanceRate {
                date: d.date.clone(),
                rate: d.ai_percent,
            })
            .collect();
        data
    }
}
