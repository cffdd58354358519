use std::path::Path;

use aitrail_aggregate::aggregate;
use aitrail_git::GitRepo;
use anyhow::{bail, Context};

pub struct DashboardParams<'a> {
    pub repo_root: &'a Path,
    pub output: &'a Path,
    pub notes_ref: &'a str,
    pub since: Option<&'a str>,
    pub repo_name: Option<&'a str>,
    pub fetch: bool,
}

pub fn execute(p: &DashboardParams<'_>) -> anyhow::Result<()> {
    let repo = GitRepo::open(p.repo_root)
        .context("run this command from inside a git working tree")?;

    println!("Notes ref: {}", p.notes_ref);
    if let Some(since) = p.since {
        println!("Since: {since}");
    }
    if p.fetch {
        repo.fetch_notes(p.notes_ref);
    }

    let commits = repo.commits_with_notes(p.notes_ref, p.since);
    let data = aggregate(&commits, &repo);
    if data.total_commits == 0 {
        bail!(
            "no commits with AI authorship notes under {} (check with `git log --show-notes={}`)",
            p.notes_ref,
            p.notes_ref
        );
    }
    println!("Found {} commits with AI authorship data", data.total_commits);
    println!("  {} files modified", data.total_files);
    println!("  {} total lines", data.total_lines);
    println!("  {:.1}% AI contribution", data.ai_percentage);

    let html = aitrail_dashboard::render(&data, p.repo_name)?;
    let output = p.repo_root.join(p.output);
    std::fs::write(&output, &html)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("Dashboard written to {}", output.display());
    println!("  Size: {:.2} KB", html.len() as f64 / 1024.0);
    Ok(())
}
