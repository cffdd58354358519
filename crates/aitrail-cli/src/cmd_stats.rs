use std::path::Path;

use aitrail_aggregate::{aggregate, DashboardFilter, FilteredView};
use aitrail_git::GitRepo;
use anyhow::bail;
use time::OffsetDateTime;

const TOP: usize = 5;

pub struct StatsParams<'a> {
    pub repo_root: &'a Path,
    pub notes_ref: &'a str,
    pub since: Option<&'a str>,
    pub filter: DashboardFilter,
    pub json: bool,
}

pub fn execute(p: &StatsParams<'_>) -> anyhow::Result<()> {
    let repo = GitRepo::open(p.repo_root)?;
    let commits = repo.commits_with_notes(p.notes_ref, p.since);
    let data = aggregate(&commits, &repo);
    if data.total_commits == 0 {
        bail!("no commits with AI authorship notes under {}", p.notes_ref);
    }

    if p.filter.is_empty() {
        if p.json {
            println!("{}", serde_json::to_string_pretty(&data)?);
            return Ok(());
        }
        print_view(&FilteredView::from(&data), &[]);
        return Ok(());
    }

    let view = p.filter.apply(&data, OffsetDateTime::now_utc());
    if p.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view, &p.filter.tags());
    }
    Ok(())
}

fn print_view(view: &FilteredView, tags: &[String]) {
    if !tags.is_empty() {
        println!("Filters: {}", tags.join(", "));
    }
    println!("Commits:        {}", view.total_commits);
    println!("Files:          {}", view.total_files);
    println!("Total lines:    {}", view.total_lines);
    println!("AI lines:       {}", view.ai_lines);
    println!("Human lines:    {}", view.human_lines);
    println!("AI share:       {:.1}%", view.ai_percentage);

    if !view.models.is_empty() {
        println!("\nModels:");
        for m in view.models.iter().take(TOP) {
            println!(
                "  {:<24} {:>4} commits  {:>5.1}% accepted",
                m.model, m.commits, m.acceptance_rate
            );
        }
    }
    if !view.tools.is_empty() {
        println!("\nTools:");
        for t in view.tools.iter().take(TOP) {
            println!("  {:<24} {:>4} commits  {:>6} lines", t.tool, t.commits, t.lines);
        }
    }
    if !view.authors.is_empty() {
        println!("\nAuthors:");
        for a in view.authors.iter().take(TOP) {
            println!(
                "  {:<32} {:>4} commits  {:>5.1}% AI",
                a.author, a.commits, a.ai_usage_percent
            );
        }
    }
}
