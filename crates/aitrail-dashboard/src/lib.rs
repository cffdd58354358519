//! Self-contained HTML dashboard for aggregated AI authorship data.
//!
//! The page carries the aggregated data as inline JSON and a small client
//! script that re-aggregates it under the time, tool, model and author
//! filters. Charts come from Chart.js over a CDN; everything else is inline.

mod html;

use std::fmt::Write;

use serde::Serialize;
use time::macros::format_description;
use time::OffsetDateTime;

use aitrail_aggregate::{
    AuthorStats, CommitDetail, CommitStats, DashboardData, FileStats, ModelStats, ToolStats,
};

pub use html::escape_html;
use html::{badge_class, escape_script_json, file_name, fill_width, group_thousands, truncate_chars};

const CHART_JS: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.0/dist/chart.umd.min.js";
const STYLE: &str = include_str!("../assets/dashboard.css");
const SCRIPT: &str = include_str!("../assets/dashboard.js");

const TOP_MODELS: usize = 5;
const TOP_FILES: usize = 10;
const MESSAGE_PREVIEW: usize = 50;

/// Time-range choices offered by the filter panel, in days.
const TIME_RANGES: &[(u32, &str)] = &[
    (7, "Last 7 Days"),
    (30, "Last 30 Days"),
    (90, "Last 90 Days"),
    (180, "Last 6 Months"),
    (365, "Last Year"),
];

/// Data embedded in the page for the client-side filter.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddedData<'a> {
    commits: &'a [CommitDetail],
    commits_by_date: Vec<CommitStats>,
    models: Vec<ModelStats>,
    tools: Vec<ToolStats>,
    authors: Vec<AuthorStats>,
    files: Vec<FileStats>,
    total_commits: u64,
    total_files: u64,
    total_lines: u64,
    ai_lines: u64,
    human_lines: i64,
    ai_percentage: f64,
}

impl<'a> EmbeddedData<'a> {
    fn new(data: &'a DashboardData) -> Self {
        Self {
            commits: &data.recent_commits,
            commits_by_date: data.dates_ascending(),
            models: data.models_by_commits(),
            tools: data.tools_by_commits(),
            authors: data.authors_by_commits(),
            files: data.files_by_modifications(),
            total_commits: data.total_commits,
            total_files: data.total_files,
            total_lines: data.total_lines,
            ai_lines: data.ai_lines,
            human_lines: data.human_lines,
            ai_percentage: data.ai_percentage,
        }
    }
}

/// Render the dashboard stamped with the current time.
pub fn render(data: &DashboardData, repo_name: Option<&str>) -> serde_json::Result<String> {
    render_at(data, repo_name, OffsetDateTime::now_utc())
}

/// Render the dashboard with an explicit "last updated" stamp.
pub fn render_at(
    data: &DashboardData,
    repo_name: Option<&str>,
    generated_at: OffsetDateTime,
) -> serde_json::Result<String> {
    let embedded = EmbeddedData::new(data);
    let json = escape_script_json(&serde_json::to_string(&embedded)?);

    let title = match repo_name {
        Some(name) => format!("AI Authorship Dashboard - {}", escape_html(name)),
        None => "AI Authorship Dashboard".to_string(),
    };
    let subtitle = escape_html(repo_name.unwrap_or("Repository"));

    let mut page = String::with_capacity(STYLE.len() + SCRIPT.len() + json.len() + 16 * 1024);
    let _ = write!(
        page,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <script src="{CHART_JS}"></script>
  <style>
{STYLE}  </style>
</head>
<body>
  <div class="container">
    <header>
      <h1>🤖 AI Authorship Dashboard</h1>
      <p class="subtitle">{subtitle} - AI Code Contribution Analytics</p>
    </header>
"#
    );

    filters(&mut page, data, &embedded);
    summary_cards(&mut page, data);
    charts(&mut page, data);
    top_models(&mut page, &embedded.models);
    top_files(&mut page, &embedded.files);
    if !embedded.authors.is_empty() {
        author_table(&mut page, &embedded.authors);
    }
    recent_commits(&mut page, &data.recent_commits);

    let stamp = generated_at
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second] UTC"
        ))
        .unwrap_or_default();
    let _ = write!(
        page,
        r#"    <footer>
      <p>Generated by <strong>aitrail</strong> 🤖</p>
      <p><small>Last updated: {stamp}</small></p>
    </footer>
  </div>
  <script id="dashboard-data" type="application/json">{json}</script>
  <script>
{SCRIPT}  </script>
</body>
</html>
"#
    );
    Ok(page)
}

// ── Sections ──

fn tooltip(text: &str) -> String {
    format!(
        r#"<span class="tooltip-icon">ℹ️<span class="tooltip-text">{text}</span></span>"#
    )
}

fn options<'s>(out: &mut String, values: impl IntoIterator<Item = &'s str>) {
    for v in values {
        let v = escape_html(v);
        let _ = writeln!(out, r#"            <option value="{v}">{v}</option>"#);
    }
}

fn filters(out: &mut String, data: &DashboardData, embedded: &EmbeddedData<'_>) {
    out.push_str(
        r#"    <div class="filters-container">
      <h2 class="filters-title">🔍 Filters</h2>
      <div class="filters-grid">
        <div class="filter-group">
          <label class="filter-label" for="timeFilter">Time Range</label>
          <select id="timeFilter" class="filter-select">
            <option value="all">All Time</option>
"#,
    );
    for (days, label) in TIME_RANGES {
        let _ = writeln!(out, r#"            <option value="{days}">{label}</option>"#);
    }
    out.push_str(
        r#"          </select>
        </div>
        <div class="filter-group">
          <label class="filter-label" for="toolFilter">Tool</label>
          <select id="toolFilter" class="filter-select">
            <option value="all">All Tools</option>
"#,
    );
    options(out, embedded.tools.iter().map(|t| t.tool.as_str()));
    out.push_str(
        r#"          </select>
        </div>
        <div class="filter-group">
          <label class="filter-label" for="modelFilter">AI Model</label>
          <select id="modelFilter" class="filter-select">
            <option value="all">All Models</option>
"#,
    );
    options(
        out,
        embedded.models.iter().take(TOP_MODELS).map(|m| m.model.as_str()),
    );
    out.push_str(
        r#"          </select>
        </div>
        <div class="filter-group">
          <label class="filter-label" for="authorFilter">Author</label>
          <select id="authorFilter" class="filter-select">
            <option value="all">All Authors</option>
"#,
    );
    let authors = data.recent_authors();
    options(out, authors.iter().map(String::as_str));
    out.push_str(
        r#"          </select>
        </div>
        <div class="filter-group">
          <button id="applyFilters" class="filter-button">Apply Filters</button>
        </div>
      </div>
      <div id="activeFilters" class="active-filters" style="display: none;">
        <strong>Active Filters:</strong>
        <div id="filterTags"></div>
      </div>
    </div>
"#,
    );
}

fn stat_card(out: &mut String, icon: &str, label: &str, help: &str, id: &str, value: &str) {
    let _ = write!(
        out,
        r#"      <div class="stat-card">
        <div class="stat-icon">{icon}</div>
        <div class="stat-label">{label} {}</div>
        <div class="stat-value" id="{id}">{value}</div>
      </div>
"#,
        tooltip(help)
    );
}

fn summary_cards(out: &mut String, data: &DashboardData) {
    out.push_str("    <div class=\"stats-grid\">\n");
    stat_card(
        out,
        "📝",
        "Total Commits",
        "Commits that carry an authorship note",
        "statTotalCommits",
        &data.total_commits.to_string(),
    );
    stat_card(
        out,
        "📁",
        "Files Modified",
        "Distinct files named in the notes",
        "statTotalFiles",
        &data.total_files.to_string(),
    );
    stat_card(
        out,
        "➕",
        "Total Lines",
        "Lines added across all noted commits",
        "statTotalLines",
        &group_thousands(data.total_lines as i64),
    );
    stat_card(
        out,
        "🤖",
        "AI Contribution",
        "AI lines / Total lines × 100",
        "statAIPercentage",
        &format!("{:.1}%", data.ai_percentage),
    );
    out.push_str("    </div>\n");
}

fn chart_block(out: &mut String, title: &str, help: &str, canvas: &str, small: bool) {
    let class = if small { "chart-wrapper small" } else { "chart-wrapper" };
    let _ = write!(
        out,
        r#"      <div class="chart-container">
        <h2 class="chart-title">{title} {}</h2>
        <div class="{class}"><canvas id="{canvas}"></canvas></div>
      </div>
"#,
        tooltip(help)
    );
}

fn charts(out: &mut String, data: &DashboardData) {
    chart_block(
        out,
        "📈 Commit Activity Over Time",
        "Number of noted commits per day",
        "timelineChart",
        false,
    );
    chart_block(
        out,
        "🎯 AI Acceptance Rate Timeline",
        "AI lines / Total lines × 100, per day",
        "acceptanceChart",
        false,
    );

    out.push_str("    <div class=\"grid-2\">\n");
    chart_block(
        out,
        "🧠 Model Usage",
        "Commits per AI model, top five",
        "modelChart",
        true,
    );
    chart_block(out, "🔧 Tool Distribution", "Commits per tool", "toolChart", true);
    out.push_str("    </div>\n    <div class=\"grid-2\">\n");
    chart_block(
        out,
        "🤖 AI vs Human Contribution",
        "Lines contributed by AI versus humans",
        "aiHumanPieChart",
        true,
    );

    let human_percent = 100.0 - data.ai_percentage;
    let _ = write!(
        out,
        r#"      <div class="chart-container">
        <h2 class="chart-title">📊 Contribution Summary {}</h2>
        <div class="summary">
          <div>
            <div class="label ai">AI Contribution</div>
            <div class="value ai" id="summaryAILines">{}</div>
            <div class="note" id="summaryAIPercent">lines ({:.1}%)</div>
          </div>
          <div>
            <div class="label human">Human Contribution</div>
            <div class="value human" id="summaryHumanLines">{}</div>
            <div class="note" id="summaryHumanPercent">lines ({human_percent:.1}%)</div>
          </div>
        </div>
      </div>
    </div>
"#,
        tooltip("Overall AI and human line counts"),
        group_thousands(data.ai_lines as i64),
        data.ai_percentage,
        group_thousands(data.human_lines),
    );

    chart_block(
        out,
        "👥 AI vs Human Contribution Over Time",
        "AI and human lines per day",
        "contributionChart",
        true,
    );
}

fn top_models(out: &mut String, models: &[ModelStats]) {
    out.push_str("    <div class=\"grid-2\">\n");
    let _ = write!(
        out,
        r#"      <div class="chart-container">
        <h2 class="chart-title">🏆 Top AI Models {}</h2>
        <table>
          <thead><tr><th>Model</th><th>Commits</th><th>Acceptance Rate</th></tr></thead>
          <tbody>
"#,
        tooltip("Top five models by commits; accepted lines / lines for each model")
    );
    for m in models.iter().take(TOP_MODELS) {
        let _ = write!(
            out,
            r#"            <tr>
              <td><strong>{}</strong></td>
              <td>{}</td>
              <td><span class="badge {}">{:.1}%</span><div class="progress-bar"><div class="progress-fill" style="width: {}%"></div></div></td>
            </tr>
"#,
            escape_html(&m.model),
            m.commits,
            badge_class(m.acceptance_rate, 80.0, 60.0),
            m.acceptance_rate,
            fill_width(m.acceptance_rate),
        );
    }
    out.push_str("          </tbody>\n        </table>\n      </div>\n");
}

fn top_files(out: &mut String, files: &[FileStats]) {
    let _ = write!(
        out,
        r#"      <div class="chart-container">
        <h2 class="chart-title">📂 Most Modified Files {}</h2>
        <table>
          <thead><tr><th>File</th><th>Changes</th><th>AI %</th></tr></thead>
          <tbody>
"#,
        tooltip("Top ten files by modifications; AI lines / Total lines for each file")
    );
    for f in files.iter().take(TOP_FILES) {
        let ai_percent = if f.total_lines > 0.0 {
            f.ai_lines / f.total_lines * 100.0
        } else {
            0.0
        };
        let _ = write!(
            out,
            r#"            <tr>
              <td title="{}"><code>{}</code></td>
              <td>{}</td>
              <td><span class="badge badge-info">{ai_percent:.0}%</span></td>
            </tr>
"#,
            escape_html(&f.filepath),
            escape_html(file_name(&f.filepath)),
            f.modifications,
        );
    }
    out.push_str("          </tbody>\n        </table>\n      </div>\n    </div>\n");
}

fn author_table(out: &mut String, authors: &[AuthorStats]) {
    let _ = write!(
        out,
        r#"    <div class="chart-container">
      <h2 class="chart-title">👤 Author Statistics {}</h2>
      <table>
        <thead><tr><th>Author</th><th>Commits</th><th>Total Lines</th><th>AI Usage</th></tr></thead>
        <tbody id="authorStatsTable">
"#,
        tooltip("Authors by commits; AI lines / Total lines across each author's commits")
    );
    for a in authors {
        let _ = write!(
            out,
            r#"          <tr>
            <td><strong>{}</strong></td>
            <td>{}</td>
            <td>{}</td>
            <td><span class="badge {}">{:.1}%</span><div class="progress-bar"><div class="progress-fill" style="width: {}%"></div></div></td>
          </tr>
"#,
            escape_html(&a.author),
            a.commits,
            group_thousands(a.total_lines as i64),
            badge_class(a.ai_usage_percent, 70.0, 40.0),
            a.ai_usage_percent,
            fill_width(a.ai_usage_percent),
        );
    }
    out.push_str("        </tbody>\n      </table>\n    </div>\n");
}

fn recent_commits(out: &mut String, commits: &[CommitDetail]) {
    let _ = write!(
        out,
        r#"    <div class="chart-container">
      <h2 class="chart-title">⏱️ Recent AI-Assisted Commits {}</h2>
      <table>
        <thead><tr><th>SHA</th><th>Author</th><th>Message</th><th>AI %</th><th>Model</th></tr></thead>
        <tbody id="recentCommitsTable">
"#,
        tooltip("Most recent noted commits; AI lines / Total lines for each commit")
    );
    for c in commits {
        let _ = write!(
            out,
            r#"          <tr>
            <td><code>{}</code></td>
            <td>{}</td>
            <td title="{}">{}</td>
            <td><span class="badge {}">{:.0}%</span><div class="progress-bar"><div class="progress-fill" style="width: {}%"></div></div></td>
            <td><small>{}</small></td>
          </tr>
"#,
            escape_html(&c.short_sha),
            escape_html(&c.author),
            escape_html(&c.message),
            escape_html(&truncate_chars(&c.message, MESSAGE_PREVIEW)),
            badge_class(c.ai_percent, 80.0, 50.0),
            c.ai_percent,
            fill_width(c.ai_percent),
            escape_html(c.model.as_deref().unwrap_or("N/A")),
        );
    }
    out.push_str("        </tbody>\n      </table>\n    </div>\n");
}
