//! Aggregation orchestration.
//!
//! One task per unique source URL runs in parallel; within a URL, matched
//! refs materialize in parallel. Repository handles are never shared across
//! threads; each ref task reopens the repository from its path. The final
//! aggregate is grouped by `{version}@{name}` and sorted by
//! `(name, version descending)`.
//!
//! Any failure aborts the whole aggregation; results are joined in source
//! declaration order so the surfaced error is deterministic.

use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;

use tome_catalog::{compare_versions, ComponentVersionBundle, Origin, RawFile, RefKind};
use tome_playbook::{Playbook, Source};

use crate::descriptor::{parse_descriptor, DESCRIPTOR_FILENAME};
use crate::error::AggregateError;
use crate::origin::edit_url_pattern;
use crate::progress::ProgressListener;
use crate::refs::{select_refs, SelectedRef};
use crate::repo::{classify_source, open_source, OpenRepo};
use crate::walk::{walk_git_tree, walk_worktree};

/// One (source, ref) materialization unit.
struct RefTask {
    source_index: usize,
    ref_position: usize,
    start_path: String,
    selected: SelectedRef,
}

/// Aggregate all playbook sources into component version bundles.
///
/// # Errors
///
/// Any source failure aborts the aggregation; no partial result is
/// returned. See [`AggregateError`] for the failure taxonomy.
pub fn aggregate(
    playbook: &Playbook,
    progress: &dyn ProgressListener,
) -> Result<Vec<ComponentVersionBundle>, AggregateError> {
    // Sources sharing a URL open the repository once.
    let mut groups: Vec<(&str, Vec<(usize, &Source)>)> = Vec::new();
    let mut group_of: HashMap<&str, usize> = HashMap::new();
    for (index, source) in playbook.content.sources.iter().enumerate() {
        match group_of.get(source.url.as_str()) {
            Some(&group) => groups[group].1.push((index, source)),
            None => {
                group_of.insert(&source.url, groups.len());
                groups.push((&source.url, vec![(index, source)]));
            }
        }
    }

    let results: Vec<Result<Vec<((usize, usize), ComponentVersionBundle)>, AggregateError>> =
        groups
            .par_iter()
            .map(|(url, members)| process_url_group(playbook, url, members, progress))
            .collect();

    let mut records = Vec::new();
    for result in results {
        records.extend(result?);
    }
    records.sort_by_key(|(order, _)| *order);

    Ok(group_bundles(records.into_iter().map(|(_, b)| b)))
}

/// Open one repository and materialize every matched ref of its sources.
fn process_url_group(
    playbook: &Playbook,
    url: &str,
    members: &[(usize, &Source)],
    progress: &dyn ProgressListener,
) -> Result<Vec<((usize, usize), ComponentVersionBundle)>, AggregateError> {
    let location = classify_source(&playbook.dir, &playbook.runtime.cache_dir, url)?;
    let remote_name = members[0].1.remote.as_deref();
    let open = open_source(&location, remote_name, playbook.runtime.pull, progress)?;

    // Ref selection is serial per repository; materialization fans out.
    let repo = open.reopen().map_err(|e| AggregateError::from_git(url, e))?;
    let mut tasks = Vec::new();
    for (source_index, source) in members {
        let branch_patterns = playbook.branch_patterns(source);
        let tag_patterns = playbook.tag_patterns(source);
        let refs = select_refs(&repo, open.is_bare, &branch_patterns, &tag_patterns)
            .map_err(|e| AggregateError::from_git(url, e))?;
        for (ref_position, selected) in refs.into_iter().enumerate() {
            tasks.push(RefTask {
                source_index: *source_index,
                ref_position,
                start_path: source.start_path().to_owned(),
                selected,
            });
        }
    }
    drop(repo);

    let results: Vec<Result<((usize, usize), ComponentVersionBundle), AggregateError>> = tasks
        .par_iter()
        .map(|task| {
            process_ref(&open, task)
                .map(|bundle| ((task.source_index, task.ref_position), bundle))
        })
        .collect();

    let mut bundles = Vec::with_capacity(results.len());
    for result in results {
        bundles.push(result?);
    }
    Ok(bundles)
}

/// Materialize one ref into a component version bundle.
fn process_ref(
    open: &OpenRepo,
    task: &RefTask,
) -> Result<ComponentVersionBundle, AggregateError> {
    let selected = &task.selected;
    let use_worktree = selected.is_current_branch
        && selected.kind == RefKind::Branch
        && !open.is_remote
        && !open.is_bare;

    let files = if use_worktree {
        let base = if task.start_path.is_empty() {
            open.path.clone()
        } else {
            open.path.join(&task.start_path)
        };
        walk_worktree(&base)?
    } else {
        let repo = open
            .reopen()
            .map_err(|e| AggregateError::from_git(&open.url, e))?;
        walk_git_tree(&repo, selected.commit_id, &task.start_path)
            .map_err(|e| AggregateError::from_git(&open.url, e))?
    };

    let descriptor_bytes = files
        .iter()
        .find(|(path, _)| path == DESCRIPTOR_FILENAME)
        .map(|(_, contents)| contents)
        .ok_or_else(|| AggregateError::BadDescriptor {
            origin: open.url.clone(),
            refname: selected.shorthand.clone(),
            reason: format!("no {DESCRIPTOR_FILENAME} found at content root"),
        })?;
    let descriptor =
        parse_descriptor(descriptor_bytes).map_err(|reason| AggregateError::BadDescriptor {
            origin: open.url.clone(),
            refname: selected.shorthand.clone(),
            reason,
        })?;

    tracing::debug!(
        url = %open.url,
        refname = %selected.shorthand,
        component = %descriptor.name,
        version = %descriptor.version,
        files = files.len(),
        "Materialized ref"
    );

    let origin = Arc::new(Origin {
        url: open.url.clone(),
        start_path: task.start_path.clone(),
        refname: selected.shorthand.clone(),
        ref_kind: selected.kind,
        worktree: use_worktree.then(|| open.path.clone()),
        edit_url_pattern: edit_url_pattern(
            &open.url,
            &selected.shorthand,
            selected.kind,
            &task.start_path,
        ),
    });

    let raw_files = files
        .into_iter()
        .filter(|(path, _)| path != DESCRIPTOR_FILENAME)
        .map(|(path, contents)| RawFile {
            path,
            contents,
            origin: Arc::clone(&origin),
        })
        .collect();

    Ok(ComponentVersionBundle {
        name: descriptor.name,
        version: descriptor.version,
        title: descriptor.title,
        start_page: descriptor.start_page,
        nav: descriptor.nav,
        files: raw_files,
    })
}

/// Group records by `{version}@{name}`, merging scalars last-write-wins and
/// concatenating file lists, then sort by `(name, version descending)`.
fn group_bundles(
    records: impl Iterator<Item = ComponentVersionBundle>,
) -> Vec<ComponentVersionBundle> {
    let mut order: Vec<String> = Vec::new();
    let mut merged: HashMap<String, ComponentVersionBundle> = HashMap::new();

    for bundle in records {
        let key = bundle.key();
        match merged.get_mut(&key) {
            Some(existing) => {
                if bundle.title.is_some() {
                    existing.title = bundle.title;
                }
                if bundle.start_page.is_some() {
                    existing.start_page = bundle.start_page;
                }
                if !bundle.nav.is_empty() {
                    existing.nav = bundle.nav;
                }
                existing.files.extend(bundle.files);
            }
            None => {
                order.push(key.clone());
                merged.insert(key, bundle);
            }
        }
    }

    let mut bundles: Vec<ComponentVersionBundle> = order
        .into_iter()
        .map(|key| merged.remove(&key).expect("key recorded on insert"))
        .collect();
    bundles.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| compare_versions(&a.version, &b.version))
    });
    bundles
}
