//! CLI error types.

use tome_aggregate::AggregateError;
use tome_catalog::CatalogError;
use tome_composer::ComposeError;
use tome_playbook::PlaybookError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Playbook(#[from] PlaybookError),

    #[error("{0}")]
    Aggregate(#[from] AggregateError),

    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Compose(#[from] ComposeError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}
