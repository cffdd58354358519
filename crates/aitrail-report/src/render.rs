//! Markdown rendering of AI authorship notes for a pull-request comment.

use std::fmt::Write;

use aitrail_core::{parse_payload, short_sha, CommitNote, MessageKind, PromptRecord};

use crate::format::{format_duration, format_timestamp, pie_glyph, progress_bar, round_half_up};
use crate::stats::aggregate_stats;

/// Width of the you/ai authorship bar.
const BAR_WIDTH: usize = 40;

pub const COMMENT_FOOTER: &str = "---\n*Posted by aitrail*";

/// Full report for the notes of a commit range. Empty when there are none.
pub fn format_range(notes: &[CommitNote], notes_ref: &str) -> String {
    if notes.is_empty() {
        return String::new();
    }
    let stats = aggregate_stats(notes);
    let avg = round_half_up(stats.avg_ai_percent);
    let mut out = String::from("## 🤖 AI Authorship Report\n\n");

    out.push_str("<div align=\"center\">\n\n### 📊 Summary Dashboard\n\n```\n");
    out.push_str("╔═══════════════════════════════════════════════════════════╗\n");
    out.push_str("║                    PR STATISTICS                          ║\n");
    out.push_str("╠═══════════════════════════════════════════════════════════╣\n");
    let _ = writeln!(
        out,
        "║  📝 Commits: {:<10} 📁 Files: {:<16} ║",
        stats.commit_count,
        stats.files.len()
    );
    let _ = writeln!(
        out,
        "║  ➕ Added: {:<12} ➖ Removed: {:<13} ║",
        stats.total_additions, stats.total_deletions
    );
    let _ = writeln!(
        out,
        "║  ✅ Accepted: {:<9} 🔄 Modified: {:<11} ║",
        stats.total_accepted, stats.total_overridden
    );
    out.push_str("╠═══════════════════════════════════════════════════════════╣\n");
    let avg_str = avg.to_string();
    let _ = writeln!(
        out,
        "║            🤖 AI Contribution: {avg_str}%{}║",
        " ".repeat(19usize.saturating_sub(avg_str.len()))
    );
    let _ = writeln!(
        out,
        "║            {:<39}║",
        progress_bar(stats.total_accepted, stats.total_additions, 30)
    );
    out.push_str("╚═══════════════════════════════════════════════════════════╝\n");
    out.push_str("```\n\n</div>\n\n");
    let _ = write!(out, "*Details from `{notes_ref}`*\n\n");

    if notes.len() > 1 {
        out.push_str("### 📅 Commit Timeline\n\n```\n");
        for (i, n) in notes.iter().enumerate() {
            let last = i == notes.len() - 1;
            let _ = writeln!(out, "{} 📝 {}", if last { "└─" } else { "├─" }, short_sha(&n.sha));
            if !last {
                out.push_str("│\n");
            }
        }
        out.push_str("```\n\n");
    }

    out.push_str("## 📋 Detailed Breakdown\n\n");
    for n in notes {
        let _ = write!(out, "### 📝 Commit `{}`\n\n", short_sha(&n.sha));
        out.push_str(&format_commit(&n.note));
    }
    out.push_str(COMMENT_FOOTER);
    out
}

/// Breakdown of one note. Notes that are not authorship notes are shown raw.
pub fn format_commit(note: &str) -> String {
    let Some(payload) = parse_payload(note) else {
        return raw_block(note);
    };

    let mut out = String::new();
    if !payload.files.is_empty() {
        out.push_str("#### 📁 Files Modified\n\n");
        for path in &payload.files {
            let _ = writeln!(out, "- `{path}`");
        }
        out.push('\n');
    }
    for (_, prompt) in &payload.prompts {
        format_prompt(&mut out, prompt);
    }
    out
}

fn raw_block(note: &str) -> String {
    format!("```\n{note}\n```\n\n")
}

fn format_prompt(out: &mut String, prompt: &PromptRecord) {
    let timestamps: Vec<&str> = prompt
        .messages()
        .iter()
        .filter_map(|m| m.timestamp.as_deref())
        .collect();
    if let [first, .., last] = timestamps.as_slice() {
        let _ = write!(
            out,
            "#### ⏱️ Commit Duration\n\n**{}** (from first change to commit)\n\n",
            format_duration(first, last)
        );
    }

    out.push_str("#### 🤖 AI Assistant\n\n");
    if prompt.agent_id.is_some() {
        let _ = writeln!(out, "- **Tool:** {}", prompt.tool().unwrap_or("Unknown"));
        let _ = writeln!(out, "- **Model:** {}", prompt.model().unwrap_or("Unknown"));
    }
    let _ = write!(
        out,
        "- **Human Author:** {}\n\n",
        prompt.human_author().unwrap_or("Unknown")
    );

    format_authorship(out, prompt);
    format_changes(out, prompt);
    format_conversation(out, prompt);
    out.push_str("---\n\n");
}

/// Widths of the human and AI parts of the authorship bar. The AI part takes
/// the remainder so the two always fill the bar.
fn split_bar(total: u64, ai: u64) -> (usize, usize) {
    if total == 0 {
        return (0, BAR_WIDTH);
    }
    let human_ratio = (total as f64 - ai as f64) / total as f64;
    let human = round_half_up(human_ratio * BAR_WIDTH as f64).clamp(0, BAR_WIDTH as i64) as usize;
    (human, BAR_WIDTH - human)
}

fn format_authorship(out: &mut String, prompt: &PromptRecord) {
    let total = prompt.total_additions;
    let ai = prompt.accepted_lines;
    let (human_pct, ai_pct) = if total > 0 {
        let t = total as f64;
        (
            round_half_up((t - ai as f64) / t * 100.0),
            round_half_up(ai as f64 / t * 100.0),
        )
    } else {
        (0, 0)
    };
    let (human_width, ai_width) = split_bar(total, ai);
    let (hp, ap) = (human_pct.to_string(), ai_pct.to_string());
    let gap = BAR_WIDTH.saturating_sub(hp.len() + ap.len() + 1);

    out.push_str("#### 👥 Authorship\n\n<table><tr><td>\n\n```\n");
    out.push_str("┌────────────────────────────────────────┐\n");
    let _ = writeln!(
        out,
        "│  you  {}{} ai  │",
        "█".repeat(human_width),
        "░".repeat(ai_width)
    );
    let _ = writeln!(out, "│       {hp}%{}{ap}%       │", " ".repeat(gap));
    out.push_str("├────────────────────────────────────────┤\n");
    let _ = writeln!(
        out,
        "│   {} {ai_pct}% AI code accepted        │",
        pie_glyph(ai_pct as f64)
    );
    out.push_str("└────────────────────────────────────────┘\n```\n\n</td><td>\n\n");

    let cells = |pct: i64| round_half_up(pct as f64 / 10.0).clamp(0, 10) as usize;
    let (ai_cells, human_cells) = (cells(ai_pct), cells(human_pct));
    out.push_str("**Visual Breakdown**\n\n");
    let _ = write!(
        out,
        "🤖 AI: {}{}\n\n",
        "▓".repeat(ai_cells),
        "░".repeat(10 - ai_cells)
    );
    let _ = write!(
        out,
        "👤 You: {}{}\n\n",
        "▓".repeat(human_cells),
        "░".repeat(10 - human_cells)
    );
    out.push_str("</td></tr></table>\n\n");
}

fn format_changes(out: &mut String, prompt: &PromptRecord) {
    let adds = prompt.total_additions;
    let dels = prompt.total_deletions;
    let acc = prompt.accepted_lines;
    let ov = prompt.overridden_lines;
    let changes = adds + dels;
    let share = |part: u64, whole: u64| {
        if whole > 0 {
            round_half_up(part as f64 / whole as f64 * 100.0)
        } else {
            0
        }
    };

    out.push_str("#### 📊 Code Changes\n\n<table>\n");
    out.push_str("<tr><th>Metric</th><th>Count</th><th>Visualization</th><th>Impact</th></tr>\n");
    let rows = [
        ("➕ Additions", adds, changes, "🟢", share(adds, changes)),
        ("➖ Deletions", dels, changes, "🔴", share(dels, changes)),
        ("✅ Accepted", acc, adds.max(1), "💚", share(acc, adds)),
        ("🔄 Overridden", ov, adds.max(1), "🟡", share(ov, adds)),
    ];
    for (label, count, base, glyph, pct) in rows {
        let _ = writeln!(
            out,
            "<tr><td>{label}</td><td><b>{count}</b></td><td>{}</td><td>{glyph} {pct}%</td></tr>",
            progress_bar(count, base, 20)
        );
    }
    out.push_str("</table>\n\n");

    let pattern = if changes > 0 {
        let ticks = |part: u64| {
            round_half_up(part as f64 / changes as f64 * 10.0).clamp(0, 3) as usize
        };
        format!(
            "{}{}{}",
            "▁".repeat(ticks(dels)),
            "▃".repeat(ticks(acc)),
            "▅".repeat(ticks(ov))
        )
    } else {
        "▁".to_string()
    };
    let _ = write!(
        out,
        "**Change Pattern:** `{pattern}` (deletions → accepted → modified)\n\n"
    );
}

fn format_conversation(out: &mut String, prompt: &PromptRecord) {
    let messages = prompt.messages();
    if messages.is_empty() {
        return;
    }
    let count = |kind: MessageKind| messages.iter().filter(|m| m.kind == kind).count();

    out.push_str("#### 💬 Conversation\n\n");
    let _ = writeln!(out, "- 👤 User messages: {}", count(MessageKind::User));
    let _ = writeln!(out, "- 🤖 Assistant messages: {}", count(MessageKind::Assistant));
    let _ = write!(out, "- 🔧 Tool uses: {}\n\n", count(MessageKind::ToolUse));
    out.push_str("<details>\n<summary>View full conversation</summary>\n\n");

    for msg in messages {
        let ts = msg
            .timestamp
            .as_deref()
            .map(|t| format!(" *({})*", format_timestamp(t)))
            .unwrap_or_default();
        let text = msg.text.as_deref().filter(|t| !t.is_empty());
        match msg.kind {
            MessageKind::User => {
                let _ = write!(out, "**👤 User:**{ts} {}\n\n", text.unwrap_or_default());
            }
            MessageKind::Assistant => {
                if let Some(text) = text {
                    let _ = write!(out, "**🤖 Assistant:**{ts} {text}\n\n");
                }
            }
            MessageKind::ToolUse => {
                if let Some(name) = msg.name.as_deref().filter(|n| !n.is_empty()) {
                    let _ = write!(out, "*🔧 Used tool: {name}*{ts}\n\n");
                }
            }
            MessageKind::Other => {}
        }
    }
    out.push_str("</details>\n\n");
}
