//! GitHub side of the pull-request report: action inputs and outputs, the
//! pull request event context, and the comment and review endpoints.

mod client;
mod comment;
mod context;
mod error;
mod review;

pub use client::{GithubClient, IssueComment, Review, ReviewComment};
pub use comment::{find_marked, marked_body, upsert_comment, CommentAction, CommentApi, COMMENT_MARKER};
pub use context::{append_output, set_output, ActionInputs, PullRequestContext, DEFAULT_API_URL};
pub use error::GithubError;
pub use review::{plan_inline_comments, post_inline_review, ReviewApi, REVIEW_MARKER};
