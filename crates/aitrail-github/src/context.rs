use std::io::Write;
use std::path::Path;

use serde::Deserialize;

use aitrail_core::DEFAULT_NOTES_REF;

use crate::error::GithubError;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

// ── Inputs ──

/// Action inputs, read from `INPUT_<NAME>` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInputs {
    pub token: String,
    pub notes_ref: String,
    pub update_existing: bool,
    pub add_inline_comments: bool,
}

impl ActionInputs {
    pub fn from_env() -> Result<Self, GithubError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    /// Boolean inputs are true only for the literal `true`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, GithubError> {
        let input = |name: &str| {
            lookup(&format!("INPUT_{}", name.to_uppercase()))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let token = input("github-token").ok_or(GithubError::MissingInput("github-token"))?;
        Ok(Self {
            token,
            notes_ref: input("notes-ref").unwrap_or_else(|| DEFAULT_NOTES_REF.to_string()),
            update_existing: input("update-existing").as_deref() == Some("true"),
            add_inline_comments: input("add-inline-comments").as_deref() == Some("true"),
        })
    }
}

// ── Pull request context ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestContext {
    pub number: u64,
    pub base_sha: String,
    pub head_sha: String,
    pub owner: String,
    pub repo: String,
    pub api_url: String,
}

#[derive(Deserialize)]
struct EventPayload {
    pull_request: Option<PullRequestPayload>,
}

#[derive(Deserialize)]
struct PullRequestPayload {
    number: u64,
    base: GitRef,
    head: GitRef,
}

#[derive(Deserialize)]
struct GitRef {
    sha: String,
}

impl PullRequestContext {
    /// Load from `GITHUB_EVENT_PATH`, `GITHUB_REPOSITORY` and `GITHUB_API_URL`.
    /// Runs outside a pull request event yield [`GithubError::NotPullRequest`].
    pub fn load() -> Result<Self, GithubError> {
        let Some(event_path) = std::env::var_os("GITHUB_EVENT_PATH") else {
            return Err(GithubError::NotPullRequest);
        };
        let event = std::fs::read_to_string(&event_path).map_err(|source| GithubError::Event {
            path: event_path.into(),
            source,
        })?;
        let repository = std::env::var("GITHUB_REPOSITORY").unwrap_or_default();
        let api_url = std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::from_event(&event, &repository, &api_url)
    }

    pub fn from_event(event: &str, repository: &str, api_url: &str) -> Result<Self, GithubError> {
        let payload: EventPayload = serde_json::from_str(event)?;
        let pr = payload.pull_request.ok_or(GithubError::NotPullRequest)?;
        let (owner, repo) = repository
            .split_once('/')
            .filter(|(o, r)| !o.is_empty() && !r.is_empty())
            .ok_or_else(|| GithubError::BadRepository(repository.to_string()))?;
        Ok(Self {
            number: pr.number,
            base_sha: pr.base.sha,
            head_sha: pr.head.sha,
            owner: owner.to_string(),
            repo: repo.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

// ── Outputs ──

/// Set an action output: appended to the `GITHUB_OUTPUT` file when set,
/// printed to stdout otherwise.
pub fn set_output(name: &str, value: &str) -> Result<(), GithubError> {
    match std::env::var_os("GITHUB_OUTPUT") {
        Some(path) => append_output(Path::new(&path), name, value),
        None => {
            println!("{name}={value}");
            Ok(())
        }
    }
}

pub fn append_output(path: &Path, name: &str, value: &str) -> Result<(), GithubError> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{name}={value}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn inputs_with_defaults() {
        let inputs = ActionInputs::from_lookup(lookup(&[("INPUT_GITHUB-TOKEN", "tok")])).unwrap();
        assert_eq!(inputs.token, "tok");
        assert_eq!(inputs.notes_ref, "refs/notes/commits");
        assert!(!inputs.update_existing);
        assert!(!inputs.add_inline_comments);
    }

    #[test]
    fn booleans_need_literal_true() {
        let inputs = ActionInputs::from_lookup(lookup(&[
            ("INPUT_GITHUB-TOKEN", "tok"),
            ("INPUT_NOTES-REF", "refs/notes/ai"),
            ("INPUT_UPDATE-EXISTING", "true"),
            ("INPUT_ADD-INLINE-COMMENTS", "yes"),
        ]))
        .unwrap();
        assert_eq!(inputs.notes_ref, "refs/notes/ai");
        assert!(inputs.update_existing);
        assert!(!inputs.add_inline_comments);
    }

    #[test]
    fn missing_token_is_fatal() {
        let err = ActionInputs::from_lookup(lookup(&[("INPUT_GITHUB-TOKEN", "  ")])).unwrap_err();
        assert!(matches!(err, GithubError::MissingInput("github-token")));
    }

    #[test]
    fn pull_request_event() {
        let event = r#"{"action":"opened","pull_request":{"number":42,"base":{"sha":"b1"},"head":{"sha":"h1"}}}"#;
        let ctx = PullRequestContext::from_event(event, "acme/widgets", "https://ghe.example/api/v3/").unwrap();
        assert_eq!(ctx.number, 42);
        assert_eq!(ctx.base_sha, "b1");
        assert_eq!(ctx.head_sha, "h1");
        assert_eq!(ctx.owner, "acme");
        assert_eq!(ctx.repo, "widgets");
        assert_eq!(ctx.api_url, "https://ghe.example/api/v3");
    }

    #[test]
    fn push_event_is_not_a_pull_request() {
        let err = PullRequestContext::from_event(r#"{"ref":"refs/heads/main"}"#, "a/b", DEFAULT_API_URL)
            .unwrap_err();
        assert!(matches!(err, GithubError::NotPullRequest));
    }

    #[test]
    fn bad_repository() {
        let event = r#"{"pull_request":{"number":1,"base":{"sha":"b"},"head":{"sha":"h"}}}"#;
        let err = PullRequestContext::from_event(event, "nope", DEFAULT_API_URL).unwrap_err();
        assert!(matches!(err, GithubError::BadRepository(_)));
    }

    #[test]
    fn outputs_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");
        append_output(&path, "notes-found", "true").unwrap();
        append_output(&path, "notes-count", "3").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "notes-found=true\nnotes-count=3\n");
    }
}
