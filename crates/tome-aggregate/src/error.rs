//! Aggregation error types.

use std::path::PathBuf;

/// Error raised during content aggregation.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// A local source path does not exist.
    #[error("local content source does not exist: {}", .0.display())]
    LocalSourceMissing(PathBuf),

    /// A local source path exists but is not a git repository.
    #[error("local content source must be a git repository: {}", .0.display())]
    LocalSourceNotRepo(PathBuf),

    /// A remote repository could not be found.
    #[error("content repository not found: {url}")]
    RepoNotFound {
        /// Repository URL.
        url: String,
    },

    /// A remote repository requires credentials that were not accepted.
    #[error("content repository requires authentication: {url}")]
    AuthRequired {
        /// Repository URL.
        url: String,
    },

    /// SSH authentication was requested but no agent is reachable.
    #[error("SSH agent must be running to access content repository: {url}")]
    SshAgentMissing {
        /// Repository URL.
        url: String,
    },

    /// The component descriptor is missing or invalid.
    #[error("invalid component descriptor in {origin} [ref {refname}]: {reason}")]
    BadDescriptor {
        /// Repository URL or path the descriptor came from.
        origin: String,
        /// Git reference name.
        refname: String,
        /// What was wrong.
        reason: String,
    },

    /// I/O failure reading source content; the caller may retry the build.
    #[error("I/O error: {0}")]
    TransientIo(#[from] std::io::Error),

    /// Uncategorized git failure.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),
}

impl AggregateError {
    /// Map a git-layer error to the matching remote-access failure.
    ///
    /// Detection keys off the message the transport surfaces, since libgit2
    /// folds most network failures into generic error classes.
    #[must_use]
    pub fn from_git(url: &str, error: git2::Error) -> Self {
        let message = error.message().to_ascii_lowercase();
        if message.contains("agent") && (message.contains("ssh") || message.contains("sock")) {
            return Self::SshAgentMissing {
                url: url.to_owned(),
            };
        }
        if message.contains("auth")
            || message.contains("credential")
            || message.contains("401")
            || message.contains("403")
        {
            return Self::AuthRequired {
                url: url.to_owned(),
            };
        }
        if message.contains("not found") || message.contains("404") {
            return Self::RepoNotFound {
                url: url.to_owned(),
            };
        }
        Self::Git(error)
    }
}
