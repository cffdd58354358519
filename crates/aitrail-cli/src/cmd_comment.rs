use std::path::Path;

use aitrail_git::GitRepo;
use aitrail_github::{
    post_inline_review, set_output, upsert_comment, ActionInputs, CommentAction, GithubClient,
    PullRequestContext, COMMENT_MARKER,
};
use aitrail_report::format_range;
use anyhow::Context;
use tracing::info;

pub fn execute(repo_root: &Path) -> anyhow::Result<()> {
    let inputs = ActionInputs::from_env()?;
    let ctx = PullRequestContext::load()?;
    info!(
        pr = ctx.number,
        base = %ctx.base_sha,
        head = %ctx.head_sha,
        notes_ref = %inputs.notes_ref,
        "processing pull request"
    );

    let repo = GitRepo::open(repo_root)?;
    repo.fetch_notes(&inputs.notes_ref);
    let notes = repo
        .notes_for_range(&ctx.base_sha, &ctx.head_sha, &inputs.notes_ref)
        .context("failed to list pull request commits")?;

    if notes.is_empty() {
        info!("no notes found for commits in this pull request");
        set_output("notes-found", "false")?;
        set_output("notes-count", "0")?;
        return Ok(());
    }
    info!(count = notes.len(), "found commits with notes");
    set_output("notes-found", "true")?;
    set_output("notes-count", &notes.len().to_string())?;

    let client = GithubClient::new(&ctx, &inputs.token);
    let body = format_range(&notes, &inputs.notes_ref);
    match upsert_comment(&client, COMMENT_MARKER, &body, inputs.update_existing)
        .context("failed to post pull request comment")?
    {
        CommentAction::Updated(id) => println!("Updated comment {id} on #{}", ctx.number),
        CommentAction::Created => println!("Posted comment on #{}", ctx.number),
    }

    if inputs.add_inline_comments {
        let posted = post_inline_review(&client, &ctx.head_sha, &notes);
        info!(posted, "inline comments done");
    }
    Ok(())
}
