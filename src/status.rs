use crate::diff::{self, FileStatus};
use crate::index::Index;
use crate::merge::{self, MergeState};
use crate::refs;
use crate::repository::Repository;
use crate::workdir;

use anyhow::Result;

/// Buckets collected by `status`; the binary decides how to print them.
#[derive(Debug, Default)]
pub struct StatusBuckets {
    pub branch: Option<String>,
    pub merge_state: Option<MergeState>,
    pub untracked: Vec<String>,
    pub conflicted: Vec<String>,
    /// HEAD vs index, with the name-status code.
    pub staged: Vec<(String, char)>,
    /// Index vs working copy, with the name-status code.
    pub not_staged: Vec<(String, char)>,
}

pub fn collect_status(repo: &Repository) -> Result<StatusBuckets> {
    repo.require_worktree()?;

    let index = Index::load(repo)?;
    let index_toc = index.read_toc();
    let head_toc = repo.head_toc()?;

    let tracked = index.tracked_paths();
    let untracked = workdir::ls_files(repo)?
        .into_iter()
        .filter(|path| !tracked.contains(path))
        .collect();

    // A conflicted path has no stage-0 entry and a marker file on disk, so
    // the stage-0 diffs would misreport it; it belongs only in `conflicted`.
    let unconflicted: Vec<String> = tracked
        .iter()
        .filter(|path| !index.file_in_conflict(path.as_str()))
        .cloned()
        .collect();
    let working = workdir::working_toc(repo, &unconflicted)?;

    let changes = |a, b| -> Vec<(String, char)> {
        diff::name_status(a, b)
            .into_iter()
            .filter(|(_, status)| *status != FileStatus::Same)
            .map(|(path, status)| (path, status.code()))
            .collect()
    };

    let mut staged = changes(&head_toc, &index_toc);
    staged.retain(|(path, _)| !index.file_in_conflict(path));
    let mut not_staged = changes(&index_toc, &working);
    not_staged.retain(|(path, _)| !index.file_in_conflict(path));

    Ok(StatusBuckets {
        branch: refs::current_branch_name(repo)?,
        merge_state: merge::in_progress(repo).then(|| merge::state(repo, &index)),
        untracked,
        conflicted: index.conflicted_paths(),
        staged,
        not_staged,
    })
}

pub fn render(buckets: &StatusBuckets) -> String {
    let mut out = String::new();

    match &buckets.branch {
        Some(branch) => out.push_str(&format!("On branch {branch}\n")),
        None => out.push_str("HEAD detached\n"),
    }

    match buckets.merge_state {
        Some(MergeState::InProgressConflicted) => {
            out.push_str("You have unmerged paths.\n");
        }
        Some(_) => out.push_str("All conflicts fixed but you are still merging.\n"),
        None => {}
    }

    let section = |out: &mut String, title: &str, lines: &[String]| {
        if lines.is_empty() {
            return;
        }
        out.push_str(&format!("\n{title}:\n"));
        for line in lines {
            out.push_str(&format!("  {line}\n"));
        }
    };

    let coded = |entries: &[(String, char)]| -> Vec<String> {
        entries.iter().map(|(path, code)| format!("{code} {path}")).collect()
    };

    section(&mut out, "Unmerged paths", &buckets.conflicted);
    section(&mut out, "Changes to be committed", &coded(&buckets.staged));
    section(&mut out, "Changes not staged for commit", &coded(&buckets.not_staged));
    section(&mut out, "Untracked files", &buckets.untracked);

    out
}
