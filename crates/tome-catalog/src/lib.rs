//! Content model and catalog for the tome site generator.
//!
//! This crate is the semantic backbone of the pipeline:
//!
//! - [`File`] / [`FileSrc`] / [`FileOut`] / [`FilePub`]: the virtual file
//!   model with its identity tuple and derived publish metadata
//! - [`compare_versions`]: deterministic newest-first version ordering
//! - [`PageId`]: the contextual `version@component:module:topic/page` spec
//! - [`compute_out`] / [`compute_pub`]: pure URL and output path computation
//! - [`classify_into`]: path-convention classification of aggregated bundles
//! - [`ContentCatalog`]: the identity-keyed file index with ordered
//!   component versions
//! - [`resolve_page`] / [`resolve_include`] / [`resolve_page_ref`]: lookup
//!   entry points used by the markup adapter's hooks
//!
//! The catalog is built serially from aggregation output and is read-only
//! for every later stage.

mod bundle;
mod catalog;
mod classify;
mod error;
mod file;
mod page_id;
mod resolve;
mod url;
mod version;

pub use bundle::{ComponentVersionBundle, RawFile};
pub use catalog::{Component, ComponentVersion, ContentCatalog, FileFilter, SITE_COMPONENT};
pub use classify::classify_into;
pub use error::CatalogError;
pub use file::{
    media_type_for, module_root_hops, Family, File, FileId, FileOut, FilePub, FileSrc,
    NavContext, Origin, RefKind, MASTER_VERSION, SOURCE_MARKUP_EXT, SOURCE_MARKUP_MEDIA_TYPE,
};
pub use page_id::{PageId, PageIdContext, ROOT_MODULE};
pub use resolve::{
    resolve_include, resolve_page, resolve_page_ref, IncludeResolution, PageRefTarget,
    EXAMPLES_PROXY, PARTIALS_PROXY,
};
pub use url::{compute_out, compute_pub, relativize_url};
pub use version::compare_versions;
