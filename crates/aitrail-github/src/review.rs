//! Inline review comments pointing at AI-written lines.

use std::collections::BTreeSet;

use tracing::{info, warn};

use aitrail_core::{parse_attestations, parse_payload, CommitNote, LineRange};

use crate::client::{Review, ReviewComment};
use crate::comment::marked_body;
use crate::error::GithubError;

/// Identifier embedded in the review body; one review per pull request.
pub const REVIEW_MARKER: &str = "aitrail-inline";

pub trait ReviewApi {
    fn list_reviews(&self) -> Result<Vec<Review>, GithubError>;
    fn create_review(
        &self,
        commit_id: &str,
        body: &str,
        comments: &[ReviewComment],
    ) -> Result<(), GithubError>;
}

/// One comment per attested file, on the first line of its first range.
/// A file attested in several commits is commented once, by the first note.
pub fn plan_inline_comments(notes: &[CommitNote]) -> Vec<ReviewComment> {
    let mut seen: BTreeSet<(String, u32)> = BTreeSet::new();
    let mut planned = Vec::new();

    for n in notes {
        let payload = parse_payload(&n.note);
        for file in parse_attestations(&n.note) {
            let Some(entry) = file.entries.iter().find(|e| !e.ranges.is_empty()) else {
                continue;
            };
            let line = entry.ranges[0].start();
            if line == 0 || !seen.insert((file.path.clone(), line)) {
                continue;
            }
            let prompt = payload.as_ref().and_then(|p| p.prompt(&entry.prompt_id));
            let tool = prompt.and_then(|p| p.tool()).unwrap_or("AI");
            let model = prompt.and_then(|p| p.model());
            planned.push(ReviewComment {
                body: comment_text(tool, model, &entry.ranges),
                path: file.path,
                line,
            });
        }
    }
    planned
}

fn comment_text(tool: &str, model: Option<&str>, ranges: &[LineRange]) -> String {
    let lines = ranges
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    match model {
        Some(model) => format!("🤖 Written with **{tool}** (`{model}`), lines {lines}"),
        None => format!("🤖 Written with **{tool}**, lines {lines}"),
    }
}

/// Post one review carrying the planned comments. Best-effort: failures are
/// logged and swallowed. Returns the number of comments posted.
pub fn post_inline_review(api: &impl ReviewApi, head_sha: &str, notes: &[CommitNote]) -> usize {
    let comments = plan_inline_comments(notes);
    if comments.is_empty() {
        return 0;
    }

    let reviews = match api.list_reviews() {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "could not list reviews, skipping inline comments");
            return 0;
        }
    };
    let already = reviews
        .iter()
        .any(|r| r.body.as_deref().is_some_and(|b| b.contains(REVIEW_MARKER)));
    if already {
        info!("inline review already posted, skipping");
        return 0;
    }

    let body = marked_body(
        REVIEW_MARKER,
        &format!("AI authorship for {} file(s) in this pull request.", comments.len()),
    );
    match api.create_review(head_sha, &body, &comments) {
        Ok(()) => {
            info!(count = comments.len(), "posted inline review");
            comments.len()
        }
        Err(e) => {
            warn!(error = %e, "failed to post inline review");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const NOTE: &str = r#"src/parse.rs
  a1b2c3 4-9,20
  d4e5f6 30
"docs/My File.md"
  d4e5f6 1
---
{"prompts":{
  "a1b2c3":{"agent_id":{"tool":"cursor","model":"gpt-4o"}},
  "d4e5f6":{"agent_id":{"tool":"claude"}}
}}"#;

    fn cn(sha: &str, note: &str) -> CommitNote {
        CommitNote {
            sha: sha.into(),
            note: note.into(),
        }
    }

    struct FakeApi {
        reviews: Result<Vec<Review>, ()>,
        fail_create: bool,
        posted: RefCell<Vec<(String, String, Vec<ReviewComment>)>>,
    }

    impl FakeApi {
        fn new(reviews: Vec<Review>) -> Self {
            Self {
                reviews: Ok(reviews),
                fail_create: false,
                posted: RefCell::new(Vec::new()),
            }
        }
    }

    impl ReviewApi for FakeApi {
        fn list_reviews(&self) -> Result<Vec<Review>, GithubError> {
            self.reviews
                .clone()
                .map_err(|()| GithubError::Io(std::io::Error::other("list failed")))
        }
        fn create_review(
            &self,
            commit_id: &str,
            body: &str,
            comments: &[ReviewComment],
        ) -> Result<(), GithubError> {
            if self.fail_create {
                return Err(GithubError::Io(std::io::Error::other("422")));
            }
            self.posted
                .borrow_mut()
                .push((commit_id.into(), body.into(), comments.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn plans_first_line_of_first_range() {
        let planned = plan_inline_comments(&[cn("a", NOTE)]);
        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].path, "src/parse.rs");
        assert_eq!(planned[0].line, 4);
        assert_eq!(
            planned[0].body,
            "🤖 Written with **cursor** (`gpt-4o`), lines 4-9, 20"
        );
        assert_eq!(planned[1].path, "docs/My File.md");
        assert_eq!(planned[1].line, 1);
        assert_eq!(planned[1].body, "🤖 Written with **claude**, lines 1");
    }

    #[test]
    fn repeated_file_line_is_planned_once() {
        let planned = plan_inline_comments(&[cn("a", NOTE), cn("b", NOTE)]);
        assert_eq!(planned.len(), 2);
    }

    #[test]
    fn unknown_prompt_falls_back_to_generic_tool() {
        let planned = plan_inline_comments(&[cn("a", "x.rs\n  ffff 7\n")]);
        assert_eq!(planned[0].body, "🤖 Written with **AI**, lines 7");
    }

    #[test]
    fn posts_review_against_head() {
        let api = FakeApi::new(vec![Review {
            id: 1,
            body: Some("looks fine".into()),
        }]);
        assert_eq!(post_inline_review(&api, "head123", &[cn("a", NOTE)]), 2);
        let posted = api.posted.borrow();
        assert_eq!(posted[0].0, "head123");
        assert!(posted[0].1.starts_with("<!-- aitrail-inline -->\n"));
        assert_eq!(posted[0].2.len(), 2);
    }

    #[test]
    fn existing_marked_review_skips() {
        let api = FakeApi::new(vec![Review {
            id: 1,
            body: Some("<!-- aitrail-inline -->\nold".into()),
        }]);
        assert_eq!(post_inline_review(&api, "h", &[cn("a", NOTE)]), 0);
        assert!(api.posted.borrow().is_empty());
    }

    #[test]
    fn failures_are_swallowed() {
        let mut api = FakeApi::new(Vec::new());
        api.fail_create = true;
        assert_eq!(post_inline_review(&api, "h", &[cn("a", NOTE)]), 0);

        let api = FakeApi {
            reviews: Err(()),
            fail_create: false,
            posted: RefCell::new(Vec::new()),
        };
        assert_eq!(post_inline_review(&api, "h", &[cn("a", NOTE)]), 0);
    }

    #[test]
    fn nothing_to_post_without_attestations() {
        let api = FakeApi::new(Vec::new());
        assert_eq!(post_inline_review(&api, "h", &[cn("a", "{\"prompts\":{}}")]), 0);
    }
}
