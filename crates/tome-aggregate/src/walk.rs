//! File materialization from worktrees and git trees.
//!
//! Both walks apply the same entry filter: anything whose basename starts
//! with `.` or carries no extension is ignored. Results use posix paths
//! relative to the walked root and are ordered by path for determinism.

use std::fs;
use std::path::Path;

use git2::{ObjectType, Repository, TreeWalkMode, TreeWalkResult};

use crate::error::AggregateError;

/// A materialized file: path relative to the walked root plus contents.
pub type WalkedFile = (String, Vec<u8>);

/// Whether a directory entry name passes the walk filter.
fn keep_entry(name: &str, is_dir: bool) -> bool {
    if name.starts_with('.') {
        return false;
    }
    is_dir || name.contains('.')
}

/// Walk a checked-out working tree rooted at `base`.
///
/// A missing root yields no files (the descriptor check downstream reports
/// the actual problem).
///
/// # Errors
///
/// Propagates filesystem errors as [`AggregateError::TransientIo`].
pub fn walk_worktree(base: &Path) -> Result<Vec<WalkedFile>, AggregateError> {
    let mut files = Vec::new();
    if base.is_dir() {
        walk_dir(base, String::new(), &mut files)?;
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn walk_dir(
    dir: &Path,
    prefix: String,
    files: &mut Vec<WalkedFile>,
) -> Result<(), AggregateError> {
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| {
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
            (entry, is_dir)
        })
        .collect();
    entries.sort_by_key(|(entry, _)| entry.file_name());

    for (entry, is_dir) in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !keep_entry(&name, is_dir) {
            continue;
        }
        let path = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        if is_dir {
            walk_dir(&entry.path(), path, files)?;
        } else {
            let contents = fs::read(entry.path())?;
            files.push((path, contents));
        }
    }
    Ok(())
}

/// Walk the git tree of a commit, rooted at `start_path`.
///
/// A start path that doesn't exist in the tree yields no files.
///
/// # Errors
///
/// Propagates git errors from tree and blob lookups.
pub fn walk_git_tree(
    repo: &Repository,
    commit_id: git2::Oid,
    start_path: &str,
) -> Result<Vec<WalkedFile>, git2::Error> {
    let commit = repo.find_commit(commit_id)?;
    let tree = commit.tree()?;

    let root = if start_path.is_empty() {
        tree
    } else {
        match tree.get_path(Path::new(start_path)) {
            Ok(entry) => match entry.to_object(repo)?.peel_to_tree() {
                Ok(tree) => tree,
                Err(_) => return Ok(Vec::new()),
            },
            Err(_) => return Ok(Vec::new()),
        }
    };

    let mut blobs: Vec<(String, git2::Oid)> = Vec::new();
    root.walk(TreeWalkMode::PreOrder, |dir, entry| {
        let Some(name) = entry.name() else {
            return TreeWalkResult::Ok;
        };
        match entry.kind() {
            Some(ObjectType::Tree) => {
                if name.starts_with('.') {
                    TreeWalkResult::Skip
                } else {
                    TreeWalkResult::Ok
                }
            }
            Some(ObjectType::Blob) => {
                if keep_entry(name, false) {
                    blobs.push((format!("{dir}{name}"), entry.id()));
                }
                TreeWalkResult::Ok
            }
            _ => TreeWalkResult::Ok,
        }
    })?;

    let mut files = Vec::with_capacity(blobs.len());
    for (path, oid) in blobs {
        let blob = repo.find_blob(oid)?;
        files.push((path, blob.content().to_vec()));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}
