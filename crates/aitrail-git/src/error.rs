use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("failed to run git {args}: {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {args} failed: {stderr}")]
    Failed { args: String, stderr: String },

    #[error("{} is not a git repository", .0.display())]
    NotARepository(PathBuf),
}
