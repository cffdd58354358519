//! Pull-request comment upsert keyed by a hidden marker.

use tracing::info;

use crate::client::IssueComment;
use crate::error::GithubError;

/// Identifier embedded in the report comment.
pub const COMMENT_MARKER: &str = "aitrail-report";

pub trait CommentApi {
    fn list_comments(&self) -> Result<Vec<IssueComment>, GithubError>;
    fn create_comment(&self, body: &str) -> Result<(), GithubError>;
    fn update_comment(&self, id: u64, body: &str) -> Result<(), GithubError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    Created,
    Updated(u64),
}

/// Prefix `body` with the marker as an HTML comment.
pub fn marked_body(marker: &str, body: &str) -> String {
    format!("<!-- {marker} -->\n{body}")
}

/// First comment whose body contains `marker`.
pub fn find_marked(comments: &[IssueComment], marker: &str) -> Option<u64> {
    comments
        .iter()
        .find(|c| c.body.as_deref().is_some_and(|b| b.contains(marker)))
        .map(|c| c.id)
}

/// Post the report. With `update_existing` the first marked comment is
/// rewritten in place; otherwise, or when none exists, a new one is created.
pub fn upsert_comment(
    api: &impl CommentApi,
    marker: &str,
    body: &str,
    update_existing: bool,
) -> Result<CommentAction, GithubError> {
    let body = marked_body(marker, body);
    if update_existing {
        if let Some(id) = find_marked(&api.list_comments()?, marker) {
            api.update_comment(id, &body)?;
            info!(id, "updated existing comment");
            return Ok(CommentAction::Updated(id));
        }
    }
    api.create_comment(&body)?;
    info!("created new comment");
    Ok(CommentAction::Created)
}
