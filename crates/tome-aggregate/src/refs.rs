//! Reference selection by glob pattern.
//!
//! Branch patterns match branch shorthands; the special values `HEAD` and
//! `.` resolve to the repository's current branch. Local and
//! remote-tracking branches for the same name collapse to one: a bare
//! (cache) repository trusts the remote-tracking ref, a worktree clone
//! trusts the local one.

use std::collections::BTreeMap;

use git2::{BranchType, Repository};
use glob::Pattern;

use tome_catalog::RefKind;

/// A git reference selected for materialization.
#[derive(Debug, Clone)]
pub struct SelectedRef {
    /// Short reference name (branch or tag name).
    pub shorthand: String,
    /// Branch or tag.
    pub kind: RefKind,
    /// Commit the reference points at.
    pub commit_id: git2::Oid,
    /// Whether this is the repository's current branch.
    pub is_current_branch: bool,
}

/// Select matching branch and tag refs.
///
/// # Errors
///
/// Propagates git errors from ref enumeration.
pub fn select_refs(
    repo: &Repository,
    is_bare: bool,
    branch_patterns: &[String],
    tag_patterns: &[String],
) -> Result<Vec<SelectedRef>, git2::Error> {
    let current_branch = repo
        .head()
        .ok()
        .filter(git2::Reference::is_branch)
        .and_then(|head| head.shorthand().map(str::to_owned));

    let branch_globs = compile_patterns(branch_patterns, current_branch.as_deref());
    let tag_globs = compile_patterns(tag_patterns, None);

    let mut selected = select_branches(repo, is_bare, &branch_globs, current_branch.as_deref())?;
    selected.extend(select_tags(repo, &tag_globs)?);
    Ok(selected)
}

/// Compile patterns, expanding `HEAD` / `.` to the current branch.
fn compile_patterns(patterns: &[String], current_branch: Option<&str>) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|pattern| {
            let pattern = if pattern == "HEAD" || pattern == "." {
                current_branch?
            } else {
                pattern.as_str()
            };
            Pattern::new(pattern).ok()
        })
        .collect()
}

#[derive(Default)]
struct BranchCandidates {
    local: Option<git2::Oid>,
    remote: Option<git2::Oid>,
}

fn select_branches(
    repo: &Repository,
    is_bare: bool,
    globs: &[Pattern],
    current_branch: Option<&str>,
) -> Result<Vec<SelectedRef>, git2::Error> {
    let mut candidates: BTreeMap<String, BranchCandidates> = BTreeMap::new();

    for entry in repo.branches(None)? {
        let (branch, branch_type) = entry?;
        let Some(shorthand) = branch.get().shorthand().map(str::to_owned) else {
            continue;
        };
        let name = match branch_type {
            BranchType::Local => shorthand,
            BranchType::Remote => {
                // Remote-tracking shorthand is "<remote>/<branch>".
                let Some((_, name)) = shorthand.split_once('/') else {
                    continue;
                };
                if name == "HEAD" {
                    continue;
                }
                name.to_owned()
            }
        };

        if !globs.iter().any(|glob| glob.matches(&name)) {
            continue;
        }

        let commit_id = branch.get().peel_to_commit()?.id();
        let entry = candidates.entry(name).or_default();
        match branch_type {
            BranchType::Local => entry.local = Some(commit_id),
            BranchType::Remote => entry.remote = Some(commit_id),
        }
    }

    Ok(candidates
        .into_iter()
        .filter_map(|(name, candidate)| {
            let commit_id = if is_bare {
                candidate.remote.or(candidate.local)
            } else {
                candidate.local.or(candidate.remote)
            }?;
            Some(SelectedRef {
                is_current_branch: current_branch == Some(name.as_str()),
                shorthand: name,
                kind: RefKind::Branch,
                commit_id,
            })
        })
        .collect())
}

fn select_tags(repo: &Repository, globs: &[Pattern]) -> Result<Vec<SelectedRef>, git2::Error> {
    let mut selected = Vec::new();
    if globs.is_empty() {
        return Ok(selected);
    }

    for name in repo.tag_names(None)?.iter().flatten() {
        if !globs.iter().any(|glob| glob.matches(name)) {
            continue;
        }
        let object = repo.revparse_single(&format!("refs/tags/{name}"))?;
        let commit_id = object.peel_to_commit()?.id();
        selected.push(SelectedRef {
            shorthand: name.to_owned(),
            kind: RefKind::Tag,
            commit_id,
            is_current_branch: false,
        });
    }

    selected.sort_by(|a, b| a.shorthand.cmp(&b.shorthand));
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;

    fn fixture_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        {
            let sig = Signature::now("test", "test@example.org").unwrap();
            let tree_id = {
                let mut index = repo.index().unwrap();
                std::fs::write(dir.path().join("file.txt"), "content").unwrap();
                index.add_path(std::path::Path::new("file.txt")).unwrap();
                index.write().unwrap();
                index.write_tree().unwrap()
            };
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
                .unwrap();
        }
        (dir, repo)
    }

    #[test]
    fn test_head_pattern_selects_current_branch() {
        let (_dir, repo) = fixture_repo();
        let refs = select_refs(&repo, false, &["HEAD".to_owned()], &[]).unwrap();
        assert_eq!(refs.len(), 1);
        assert!(refs[0].is_current_branch);
        assert_eq!(refs[0].kind, RefKind::Branch);
    }

    #[test]
    fn test_dot_pattern_is_head_synonym() {
        let (_dir, repo) = fixture_repo();
        let refs = select_refs(&repo, false, &[".".to_owned()], &[]).unwrap();
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn test_glob_selects_matching_branches() {
        let (_dir, repo) = fixture_repo();
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        repo.branch("v1.0", &head, false).unwrap();
        repo.branch("v2.0", &head, false).unwrap();
        repo.branch("feature", &head, false).unwrap();

        let refs = select_refs(&repo, false, &["v*".to_owned()], &[]).unwrap();
        let names: Vec<&str> = refs.iter().map(|r| r.shorthand.as_str()).collect();
        assert_eq!(names, vec!["v1.0", "v2.0"]);
    }

    #[test]
    fn test_tag_patterns_select_tags() {
        let (_dir, repo) = fixture_repo();
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        repo.tag_lightweight("v1.0.0", head.as_object(), false).unwrap();
        repo.tag_lightweight("beta", head.as_object(), false).unwrap();

        let refs = select_refs(&repo, false, &[], &["v*".to_owned()]).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].shorthand, "v1.0.0");
        assert_eq!(refs[0].kind, RefKind::Tag);
        assert!(!refs[0].is_current_branch);
    }

    #[test]
    fn test_no_patterns_select_nothing() {
        let (_dir, repo) = fixture_repo();
        let refs = select_refs(&repo, false, &[], &[]).unwrap();
        assert!(refs.is_empty());
    }
}
