//! Source URL classification and cache-path computation.

use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};

/// Whether a source URL addresses a remote repository.
///
/// A URL is remote when it contains a `:` followed by `//` (scheme form) or
/// by anything other than `/` (scp form, `git@host:path`). Everything else
/// is a filesystem path.
#[must_use]
pub fn is_remote_url(url: &str) -> bool {
    match url.find(':') {
        None => false,
        Some(i) => {
            let rest = &url[i + 1..];
            rest.starts_with("//") || !rest.starts_with('/')
        }
    }
}

/// Normalize a URL for cache-key purposes.
///
/// Lowercases, converts separators to posix form, and strips a trailing
/// `.git` or `/`.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    let lowered = url.to_ascii_lowercase().replace('\\', "/");
    let trimmed = lowered.trim_end_matches('/');
    trimmed.strip_suffix(".git").unwrap_or(trimmed).to_owned()
}

/// Cache directory for a remote URL: `<cache_dir>/<basename>-<sha1>.git`.
#[must_use]
pub fn cache_repo_dir(cache_dir: &Path, url: &str) -> PathBuf {
    let normalized = normalize_url(url);
    let basename = normalized
        .rsplit(['/', ':'])
        .find(|s| !s.is_empty())
        .unwrap_or("repo");

    let mut hasher = Sha1::new();
    hasher.update(normalized.as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();

    cache_dir.join(format!("{basename}-{hex}.git"))
}

/// Resolve a local source URL against the playbook directory.
#[must_use]
pub fn resolve_local_path(playbook_dir: &Path, url: &str) -> PathBuf {
    let path = Path::new(url);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        playbook_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_urls_are_remote() {
        assert!(is_remote_url("https://git.example.org/docs.git"));
        assert!(is_remote_url("http://git.example.org/docs"));
        assert!(is_remote_url("git://git.example.org/docs.git"));
    }

    #[test]
    fn test_scp_urls_are_remote() {
        assert!(is_remote_url("git@github.com:org/docs.git"));
    }

    #[test]
    fn test_paths_are_local() {
        assert!(!is_remote_url("/srv/git/docs"));
        assert!(!is_remote_url("./docs-repo"));
        assert!(!is_remote_url("../docs-repo"));
        assert!(!is_remote_url("docs-repo"));
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("HTTPS://Git.Example.Org/Docs.git"),
            "https://git.example.org/docs"
        );
        assert_eq!(
            normalize_url("https://git.example.org/docs/"),
            "https://git.example.org/docs"
        );
        assert_eq!(
            normalize_url("git@github.com:Org\\Docs.git"),
            "git@github.com:org/docs"
        );
    }

    #[test]
    fn test_cache_repo_dir_is_stable_per_normalized_url() {
        let cache = Path::new("/cache");
        let a = cache_repo_dir(cache, "https://git.example.org/docs.git");
        let b = cache_repo_dir(cache, "HTTPS://git.example.org/docs/");
        assert_eq!(a, b);

        let name = a.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("docs-"));
        assert!(name.ends_with(".git"));
        // basename + dash + 40 hex chars + .git
        assert_eq!(name.len(), "docs-".len() + 40 + ".git".len());
    }

    #[test]
    fn test_cache_repo_dir_differs_across_urls() {
        let cache = Path::new("/cache");
        assert_ne!(
            cache_repo_dir(cache, "https://git.example.org/docs.git"),
            cache_repo_dir(cache, "https://git.example.org/other.git")
        );
    }
}
