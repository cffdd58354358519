use std::collections::BTreeSet;

use aitrail_core::{parse_payload, percent, scan_file_paths, CommitNote};

/// Totals across every note of a pull request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateStats {
    pub total_additions: u64,
    pub total_deletions: u64,
    pub total_accepted: u64,
    pub total_overridden: u64,
    /// Mean of the per-prompt acceptance rates over prompts with additions.
    /// Unweighted: a 2-line prompt counts as much as a 200-line one.
    pub avg_ai_percent: f64,
    pub files: BTreeSet<String>,
    pub commit_count: usize,
}

pub fn aggregate_stats(notes: &[CommitNote]) -> AggregateStats {
    let mut stats = AggregateStats {
        commit_count: notes.len(),
        ..AggregateStats::default()
    };
    let mut rate_sum = 0.0;
    let mut rated_prompts = 0usize;

    for CommitNote { note, .. } in notes {
        stats.files.extend(scan_file_paths(note));
        let Some(payload) = parse_payload(note) else {
            continue;
        };
        for (_, prompt) in &payload.prompts {
            stats.total_additions += prompt.total_additions;
            stats.total_deletions += prompt.total_deletions;
            stats.total_accepted += prompt.accepted_lines;
            stats.total_overridden += prompt.overridden_lines;
            if prompt.total_additions > 0 {
                rate_sum += percent(prompt.accepted_lines as f64, prompt.total_additions as f64);
                rated_prompts += 1;
            }
        }
    }

    stats.avg_ai_percent = if rated_prompts > 0 {
        rate_sum / rated_prompts as f64
    } else {
        0.0
    };
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cn(sha: &str, note: &str) -> CommitNote {
        CommitNote {
            sha: sha.into(),
            note: note.into(),
        }
    }

    #[test]
    fn mean_of_prompt_rates_is_unweighted() {
        let notes = vec![cn(
            "a",
            r#"{"prompts":{
                "p1":{"total_additions":2,"accepted_lines":2},
                "p2":{"total_additions":200,"accepted_lines":0},
                "p3":{"total_additions":0,"accepted_lines":5}
            }}"#,
        )];
        let s = aggregate_stats(&notes);
        assert_eq!(s.avg_ai_percent, 50.0);
        assert_eq!(s.total_additions, 202);
        assert_eq!(s.total_accepted, 7);
        // Lines-weighted rate would be 7/202; the two statistics differ.
        assert!((percent(7.0, 202.0) - s.avg_ai_percent).abs() > 1.0);
    }

    #[test]
    fn files_are_collected_even_without_json() {
        let notes = vec![
            cn("a", "src/a.rs\nsrc/b.rs\nplain text"),
            cn("b", "src/a.rs\n---\n{\"prompts\":{}}"),
        ];
        let s = aggregate_stats(&notes);
        assert_eq!(s.commit_count, 2);
        assert_eq!(s.files.len(), 3);
        assert!(s.files.contains("plain"));
        assert_eq!(s.avg_ai_percent, 0.0);
    }

    #[test]
    fn empty_input() {
        let s = aggregate_stats(&[]);
        assert_eq!(s, AggregateStats::default());
    }
}
