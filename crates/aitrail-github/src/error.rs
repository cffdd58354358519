use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    #[error("Input required and not supplied: {0}")]
    MissingInput(&'static str),

    #[error("This command only works on pull request events")]
    NotPullRequest,

    #[error("Invalid GITHUB_REPOSITORY {0:?}, expected owner/repo")]
    BadRepository(String),

    #[error("Failed to read event payload {path}: {source}")]
    Event {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("GitHub API request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
