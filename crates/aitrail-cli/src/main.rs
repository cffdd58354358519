mod cmd_comment;
mod cmd_dashboard;
mod cmd_refs;
mod cmd_stats;

use std::path::PathBuf;

use aitrail_core::DEFAULT_NOTES_REF;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "aitrail",
    version,
    about = "AI authorship reports from git notes"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a self-contained HTML dashboard
    Dashboard {
        /// Output file
        #[arg(short, long, default_value = "ai-dashboard.html")]
        output: PathBuf,
        /// Notes ref to read
        #[arg(short, long, default_value = DEFAULT_NOTES_REF)]
        notes_ref: String,
        /// Only commits newer than this date (anything `git log --since` accepts)
        #[arg(short, long)]
        since: Option<String>,
        /// Repository name shown in the dashboard header
        #[arg(short, long)]
        repo_name: Option<String>,
        /// Fetch the notes ref from origin first
        #[arg(long)]
        fetch: bool,
    },
    /// Post the AI authorship report on the current pull request (GitHub Actions)
    Comment,
    /// Print aggregated statistics to the console
    Stats {
        /// Notes ref to read
        #[arg(short, long, default_value = DEFAULT_NOTES_REF)]
        notes_ref: String,
        /// Only commits newer than this date (anything `git log --since` accepts)
        #[arg(short, long)]
        since: Option<String>,
        /// Keep commits from the last N days
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..))]
        days: Option<i64>,
        /// Keep commits made with this tool
        #[arg(long)]
        tool: Option<String>,
        /// Keep commits made with this model
        #[arg(long)]
        model: Option<String>,
        /// Keep commits by this git author
        #[arg(long)]
        author: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List notes refs in the repository
    Refs,
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(match cli.cmd {
        Command::Comment => "info",
        _ => "warn",
    });
    let repo_root = std::env::current_dir()?;

    match cli.cmd {
        Command::Dashboard {
            output,
            notes_ref,
            since,
            repo_name,
            fetch,
        } => cmd_dashboard::execute(&cmd_dashboard::DashboardParams {
            repo_root: &repo_root,
            output: &output,
            notes_ref: &notes_ref,
            since: since.as_deref(),
            repo_name: repo_name.as_deref(),
            fetch,
        }),
        Command::Comment => cmd_comment::execute(&repo_root),
        Command::Stats {
            notes_ref,
            since,
            days,
            tool,
            model,
            author,
            json,
        } => cmd_stats::execute(&cmd_stats::StatsParams {
            repo_root: &repo_root,
            notes_ref: &notes_ref,
            since: since.as_deref(),
            filter: aitrail_aggregate::DashboardFilter {
                days,
                tool,
                model,
                author,
            },
            json,
        }),
        Command::Refs => cmd_refs::execute(&repo_root),
    }
}
