//! Git-backed content aggregation for the tome site generator.
//!
//! Turns the playbook's content sources into a list of
//! [`ComponentVersionBundle`](tome_catalog::ComponentVersionBundle)s:
//!
//! 1. Classify each source URL (remote vs local, bare vs worktree)
//! 2. Open or clone the repository (remote sources cache as bare clones)
//! 3. Select refs by glob pattern (`HEAD` / `.` meaning the current branch)
//! 4. Walk each matched ref's tree — or the working tree for the current
//!    branch of a local clone — and read the component descriptor
//! 5. Group records by `{version}@{name}` and sort the aggregate
//!
//! Repositories with distinct URLs process in parallel, as do refs within
//! one repository. Any failure aborts the aggregation.

mod aggregate;
mod descriptor;
mod error;
mod origin;
mod progress;
mod refs;
mod repo;
mod source_url;
mod walk;

pub use aggregate::aggregate;
pub use descriptor::{parse_descriptor, ComponentDescriptor, DESCRIPTOR_FILENAME};
pub use error::AggregateError;
pub use origin::edit_url_pattern;
pub use progress::{NullProgress, ProgressListener, TermProgress};
pub use source_url::{cache_repo_dir, is_remote_url, normalize_url};
