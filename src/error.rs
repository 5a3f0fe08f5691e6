//! Typed error kinds, raised through `anyhow::Error` so commands keep the
//! plain `Result` plumbing but callers (and tests) can still match on a
//! concrete representation by downcasting.

use thiserror::Error;

#[derive(Debug, Error)]
#[cfg_attr(test, derive(PartialEq))]
pub enum Error {
    #[error("fatal: not a gitlet repository (or any of the parent directories)")]
    NotInRepo,

    #[error("fatal: this operation must be run in a work tree")]
    BareRepo,

    #[error("fatal: pathspec '{0}' did not match any files")]
    PathspecMismatch(String),

    #[error("error: your local changes would be overwritten by {action}:\n{}", paths_block(.paths))]
    UncommittedChanges { action: &'static str, paths: Vec<String> },

    #[error("fatal: ref '{0}' not found")]
    RefNotFound(String),

    #[error("fatal: '{0}' is not a commit")]
    NotACommit(String),

    #[error("fatal: a branch named '{0}' already exists")]
    BranchExists(String),

    #[error("error: cannot commit because you have unmerged files:\n{}", paths_block(.0))]
    UnmergedFiles(Vec<String>),

    #[error("nothing to commit, working directory clean")]
    NothingToCommit,

    #[error("fatal: remote {0} already exists")]
    RemoteExists(String),

    #[error("fatal: {0} is not supported")]
    Unsupported(&'static str),
}

fn paths_block(paths: &[String]) -> String {
    paths.iter().map(|p| format!("  {p}")).collect::<Vec<_>>().join("\n")
}

pub trait ErrorExt {
    /// Recover the typed error, or hand the original back on failure.
    fn try_into_gitlet_error(self) -> anyhow::Result<Error>;
}

impl ErrorExt for anyhow::Error {
    fn try_into_gitlet_error(self) -> anyhow::Result<Error> {
        self.downcast::<Error>()
    }
}
