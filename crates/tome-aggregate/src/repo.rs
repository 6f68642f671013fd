//! Repository classification, opening, cloning, and fetching.

use std::fs;
use std::path::{Path, PathBuf};

use git2::build::RepoBuilder;
use git2::{Cred, CredentialType, FetchOptions, FetchPrune, RemoteCallbacks, Repository};

use crate::error::AggregateError;
use crate::progress::ProgressListener;
use crate::source_url::{cache_repo_dir, is_remote_url, resolve_local_path};

/// Classified location of a content source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// A remote repository cached as a bare clone.
    Remote {
        /// Remote URL.
        url: String,
        /// Bare clone location under the cache directory.
        cache_dir: PathBuf,
    },
    /// A local clone with a working tree.
    LocalWorktree(PathBuf),
    /// A local bare repository.
    LocalBare(PathBuf),
}

/// An opened repository, reduced to what per-ref tasks need to reopen it.
#[derive(Debug, Clone)]
pub struct OpenRepo {
    /// Filesystem path of the repository (bare dir or worktree root).
    pub path: PathBuf,
    /// Source URL as given in the playbook.
    pub url: String,
    /// Whether the source is remote.
    pub is_remote: bool,
    /// Whether the repository is bare.
    pub is_bare: bool,
}

impl OpenRepo {
    /// Reopen the repository. Handles are not shared across threads, so
    /// each per-ref task opens its own.
    ///
    /// # Errors
    ///
    /// Propagates the underlying git error.
    pub fn reopen(&self) -> Result<Repository, git2::Error> {
        if self.is_bare {
            Repository::open_bare(&self.path)
        } else {
            Repository::open(&self.path)
        }
    }
}

/// Classify a source URL into a location.
///
/// # Errors
///
/// Returns [`AggregateError::LocalSourceMissing`] when a local path does
/// not exist.
pub fn classify_source(
    playbook_dir: &Path,
    cache_dir: &Path,
    url: &str,
) -> Result<SourceLocation, AggregateError> {
    if is_remote_url(url) {
        return Ok(SourceLocation::Remote {
            url: url.to_owned(),
            cache_dir: cache_repo_dir(cache_dir, url),
        });
    }

    let path = resolve_local_path(playbook_dir, url);
    if !path.exists() {
        return Err(AggregateError::LocalSourceMissing(path));
    }
    if path.join(".git").exists() {
        Ok(SourceLocation::LocalWorktree(path))
    } else {
        Ok(SourceLocation::LocalBare(path))
    }
}

/// Open (and for remote sources, refresh) a classified source.
///
/// Remote sources open their bare cache clone, fetching with prune when
/// `pull` is set; an unopenable cache is discarded and re-cloned. Local
/// sources that fail to open surface as [`AggregateError::LocalSourceNotRepo`].
///
/// # Errors
///
/// Returns the failure taxonomy of §repo access: `LocalSourceNotRepo`,
/// `RepoNotFound`, `AuthRequired`, `SshAgentMissing`, or a wrapped git error.
pub fn open_source(
    location: &SourceLocation,
    remote_name: Option<&str>,
    pull: bool,
    progress: &dyn ProgressListener,
) -> Result<OpenRepo, AggregateError> {
    match location {
        SourceLocation::Remote { url, cache_dir } => {
            match Repository::open_bare(cache_dir) {
                Ok(repo) => {
                    if pull {
                        fetch(&repo, url, remote_name, progress)?;
                    }
                }
                Err(_) => {
                    if cache_dir.exists() {
                        fs::remove_dir_all(cache_dir)?;
                    }
                    if let Some(parent) = cache_dir.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    clone_bare(url, cache_dir, progress)?;
                }
            }
            Ok(OpenRepo {
                path: cache_dir.clone(),
                url: url.clone(),
                is_remote: true,
                is_bare: true,
            })
        }
        SourceLocation::LocalWorktree(path) => {
            Repository::open(path)
                .map_err(|_| AggregateError::LocalSourceNotRepo(path.clone()))?;
            Ok(OpenRepo {
                path: path.clone(),
                url: path.to_string_lossy().into_owned(),
                is_remote: false,
                is_bare: false,
            })
        }
        SourceLocation::LocalBare(path) => {
            Repository::open_bare(path)
                .map_err(|_| AggregateError::LocalSourceNotRepo(path.clone()))?;
            Ok(OpenRepo {
                path: path.clone(),
                url: path.to_string_lossy().into_owned(),
                is_remote: false,
                is_bare: true,
            })
        }
    }
}

/// Fetch from the configured remote with pruning.
fn fetch(
    repo: &Repository,
    url: &str,
    remote_name: Option<&str>,
    progress: &dyn ProgressListener,
) -> Result<(), AggregateError> {
    let name = remote_name.unwrap_or("origin");
    let mut remote = repo
        .find_remote(name)
        .or_else(|_| repo.remote_anonymous(url))
        .map_err(|e| AggregateError::from_git(url, e))?;

    progress.on_fetch_start(url);
    let mut options = fetch_options(url, progress);
    let result = remote.fetch(&[] as &[&str], Some(&mut options), None);
    progress.on_fetch_done(url);

    result.map_err(|e| AggregateError::from_git(url, e))
}

/// Clone a remote repository into a bare cache directory.
fn clone_bare(
    url: &str,
    into: &Path,
    progress: &dyn ProgressListener,
) -> Result<(), AggregateError> {
    progress.on_fetch_start(url);
    let result = RepoBuilder::new()
        .bare(true)
        .fetch_options(fetch_options(url, progress))
        .clone(url, into);
    progress.on_fetch_done(url);

    result.map(|_| ()).map_err(|e| {
        // Leave no partial clone behind.
        let _ = fs::remove_dir_all(into);
        AggregateError::from_git(url, e)
    })
}

/// Fetch options with transfer progress and agent-based SSH credentials.
fn fetch_options<'a>(
    url: &'a str,
    progress: &'a dyn ProgressListener,
) -> FetchOptions<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.transfer_progress(move |stats| {
        progress.on_fetch_progress(
            url,
            stats.received_objects(),
            stats.total_objects(),
            stats.received_bytes(),
        );
        true
    });
    callbacks.credentials(|_remote_url, username, allowed| {
        if allowed.contains(CredentialType::SSH_KEY) {
            Cred::ssh_key_from_agent(username.unwrap_or("git"))
        } else {
            Cred::default()
        }
    });

    let mut options = FetchOptions::new();
    options.prune(FetchPrune::On);
    options.remote_callbacks(callbacks);
    options
}
