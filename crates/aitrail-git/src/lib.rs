//! Thin wrapper over the `git` command line.
//!
//! Every lookup that feeds the aggregation degrades to an empty value on
//! failure (a missing notes ref, an unknown commit, git exiting non-zero).
//! Only repository detection and PR range listing report errors.

mod error;

use std::path::{Path, PathBuf};
use std::process::Command;

use aitrail_core::{CommitNote, DiffStat, DiffStatSource, RawCommit};

pub use error::GitError;

/// `git log` line format read by [`GitRepo::commits_with_notes`].
const LOG_FORMAT: &str = "--format=%H|%aI|%an|%s";

#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Open the working tree containing `path`.
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = Self {
            root: path.to_path_buf(),
        };
        match repo.run(&["rev-parse", "--is-inside-work-tree"]) {
            Ok(out) if out.trim() == "true" => Ok(repo),
            Ok(_) | Err(GitError::Failed { .. }) => {
                Err(GitError::NotARepository(path.to_path_buf()))
            }
            Err(e) => Err(e),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run git and return stdout; non-zero exit is an error.
    pub fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .output()
            .map_err(|source| GitError::Spawn {
                args: args.join(" "),
                source,
            })?;
        if !output.status.success() {
            return Err(GitError::Failed {
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Note text attached to `sha` under `notes_ref`, trimmed. `None` when
    /// absent or empty.
    pub fn note(&self, sha: &str, notes_ref: &str) -> Option<String> {
        let out = self.run(&["notes", "--ref", notes_ref, "show", sha]).ok()?;
        let note = out.trim();
        (!note.is_empty()).then(|| note.to_string())
    }

    /// Every commit reachable from HEAD (newest first) that carries a note
    /// under `notes_ref`. `since` is handed to `git log --since` verbatim.
    ///
    /// A missing ref or an empty repository yields an empty list.
    pub fn commits_with_notes(&self, notes_ref: &str, since: Option<&str>) -> Vec<RawCommit> {
        let since_arg = since.map(|s| format!("--since={s}"));
        let mut args = vec!["log", LOG_FORMAT];
        if let Some(arg) = &since_arg {
            args.push(arg.as_str());
        }
        let out = match self.run(&args) {
            Ok(out) => out,
            Err(e) => {
                tracing::debug!("git log failed, treating as no commits: {e}");
                return Vec::new();
            }
        };

        let mut commits = Vec::new();
        for line in out.lines().filter(|l| !l.trim().is_empty()) {
            let Some(mut commit) = parse_log_line(line) else {
                continue;
            };
            if let Some(note) = self.note(&commit.sha, notes_ref) {
                commit.note = Some(note);
                commits.push(commit);
            }
        }
        tracing::debug!(count = commits.len(), notes_ref, "collected commits with notes");
        commits
    }

    /// Notes of the commits in `base..head`, in `git rev-list` order.
    pub fn notes_for_range(
        &self,
        base: &str,
        head: &str,
        notes_ref: &str,
    ) -> Result<Vec<CommitNote>, GitError> {
        let range = format!("{base}..{head}");
        let out = self.run(&["rev-list", &range])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|sha| !sha.is_empty())
            .filter_map(|sha| {
                self.note(sha, notes_ref).map(|note| CommitNote {
                    sha: sha.to_string(),
                    note,
                })
            })
            .collect())
    }

    /// `git fetch origin <ref>:<ref>`. The ref may not exist upstream yet.
    pub fn fetch_notes(&self, notes_ref: &str) -> bool {
        let refspec = format!("{notes_ref}:{notes_ref}");
        match self.run(&["fetch", "origin", &refspec]) {
            Ok(_) => true,
            Err(e) => {
                tracing::info!("could not fetch {notes_ref}, it may not exist yet: {e}");
                false
            }
        }
    }

    /// All refs under `refs/notes/`.
    pub fn list_notes_refs(&self) -> Vec<String> {
        self.run(&["for-each-ref", "--format=%(refname)", "refs/notes/"])
            .map(|out| {
                out.lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl DiffStatSource for GitRepo {
    fn diff_stat(&self, sha: &str) -> DiffStat {
        match self.run(&["show", "--shortstat", "--format=", sha]) {
            Ok(out) => DiffStat::parse_shortstat(&out),
            Err(e) => {
                tracing::debug!("diff stat for {sha} unavailable: {e}");
                DiffStat::default()
            }
        }
    }
}

/// Split a `%H|%aI|%an|%s` line; the subject may itself contain `|`.
fn parse_log_line(line: &str) -> Option<RawCommit> {
    let mut parts = line.splitn(4, '|');
    let sha = parts.next()?.trim();
    let date = parts.next()?;
    let author = parts.next()?;
    let message = parts.next().unwrap_or("");
    if sha.is_empty() {
        return None;
    }
    Some(RawCommit {
        sha: sha.to_string(),
        date: date.to_string(),
        author: author.to_string(),
        message: message.to_string(),
        note: None,
    })
}
