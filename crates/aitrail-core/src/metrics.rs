use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::ParsedNote;

static SHORTSTAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+) insertions?\(\+\),?\s*(?:(\d+) deletions?\(-\))?").unwrap()
});

/// Insertions and deletions of one commit as reported by the diff summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStat {
    pub insertions: u64,
    pub deletions: u64,
}

impl DiffStat {
    /// Parse a summary line such as ` 2 files changed, 67 insertions(+), 3 deletions(-)`.
    ///
    /// A summary without insertions, or any unrecognised output, reads as zero.
    pub fn parse_shortstat(output: &str) -> DiffStat {
        let Some(caps) = SHORTSTAT.captures(output) else {
            return DiffStat::default();
        };
        let count = |i: usize| {
            caps.get(i)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0)
        };
        DiffStat {
            insertions: count(1),
            deletions: count(2),
        }
    }
}

/// Source of real per-commit diff stats.
///
/// Implementations swallow their own failures and report `DiffStat::default()`.
pub trait DiffStatSource {
    fn diff_stat(&self, sha: &str) -> DiffStat;
}

/// Where the authoritative line counts of a commit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSource {
    Note,
    DiffStat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMetrics {
    pub total_lines: u64,
    pub total_deletions: u64,
    pub source: MetricSource,
}

/// Decide the authoritative added/deleted counts for a commit.
///
/// A note with no additions and no model looks like a manual commit whose
/// note was never filled in; its real diff stats are used instead.
pub fn resolve_metrics<S>(parsed: &ParsedNote, sha: &str, diff_stats: &S) -> ResolvedMetrics
where
    S: DiffStatSource + ?Sized,
{
    if parsed.total_additions == 0 && parsed.model.is_none() {
        let stat = diff_stats.diff_stat(sha);
        return ResolvedMetrics {
            total_lines: stat.insertions,
            total_deletions: stat.deletions,
            source: MetricSource::DiffStat,
        };
    }
    ResolvedMetrics {
        total_lines: parsed.total_additions,
        total_deletions: parsed.total_deletions,
        source: MetricSource::Note,
    }
}

/// A diff-stat source that always reports zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiffStats;

impl DiffStatSource for NoDiffStats {
    fn diff_stat(&self, _sha: &str) -> DiffStat {
        DiffStat::default()
    }
}

impl<F> DiffStatSource for F
where
    F: Fn(&str) -> DiffStat,
{
    fn diff_stat(&self, sha: &str) -> DiffStat {
        self(sha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn parse_insertions_and_deletions() {
        let s = DiffStat::parse_shortstat(" 2 files changed, 3 insertions(+), 1 deletion(-)\n");
        assert_eq!(s, DiffStat { insertions: 3, deletions: 1 });
    }

    #[test]
    fn parse_insertions_only() {
        let s = DiffStat::parse_shortstat(" 1 file changed, 67 insertions(+)");
        assert_eq!(s, DiffStat { insertions: 67, deletions: 0 });
    }

    #[test]
    fn parse_singular_insertion() {
        let s = DiffStat::parse_shortstat(" 1 file changed, 1 insertion(+), 9 deletions(-)");
        assert_eq!(s, DiffStat { insertions: 1, deletions: 9 });
    }

    #[test]
    fn deletions_without_insertions_read_as_zero() {
        let s = DiffStat::parse_shortstat(" 1 file changed, 4 deletions(-)");
        assert_eq!(s, DiffStat::default());
        assert_eq!(DiffStat::parse_shortstat("fatal: bad object"), DiffStat::default());
    }

    #[test]
    fn manual_commit_falls_back_to_diff_stats() {
        let parsed = ParsedNote::default();
        let calls = Cell::new(0);
        let source = |sha: &str| {
            calls.set(calls.get() + 1);
            assert_eq!(sha, "abc");
            DiffStat::parse_shortstat("3 insertions(+), 1 deletion(-)")
        };
        let m = resolve_metrics(&parsed, "abc", &source);
        assert_eq!(m.total_lines, 3);
        assert_eq!(m.total_deletions, 1);
        assert_eq!(m.source, MetricSource::DiffStat);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn ai_commit_uses_note_counts() {
        let parsed = ParsedNote {
            total_additions: 0,
            total_deletions: 4,
            model: Some("m1".into()),
            ..ParsedNote::default()
        };
        let source = |_: &str| -> DiffStat { panic!("diff stats must not be consulted") };
        let m = resolve_metrics(&parsed, "abc", &source);
        assert_eq!(m.total_lines, 0);
        assert_eq!(m.total_deletions, 4);
        assert_eq!(m.source, MetricSource::Note);
    }

    #[test]
    fn nonzero_additions_skip_fallback() {
        let parsed = ParsedNote {
            total_additions: 12,
            ..ParsedNote::default()
        };
        let m = resolve_metrics(&parsed, "abc", &NoDiffStats);
        assert_eq!(m.total_lines, 12);
        assert_eq!(m.source, MetricSource::Note);
    }
}
