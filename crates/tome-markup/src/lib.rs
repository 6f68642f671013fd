//! Markup parser adapter for the tome pipeline.
//!
//! The real markup engine is an external collaborator; the pipeline only
//! consumes a narrow slice of its document tree. This crate provides that
//! slice (document title, `:page-*:` attributes, and top-level unordered
//! lists) plus the capability hooks the engine calls back into for
//! cross-reference and include resolution:
//!
//! - [`ResolvePageRef`] / [`ResolveInclude`]: the hook interfaces
//! - [`CatalogHooks`]: the catalog-backed implementation
//! - [`parse_document`]: the line-oriented extractor
//! - [`convert_inline`]: inline-content conversion (xrefs, links) to HTML
//!
//! Resolved page references carry the `page` role on their anchor so later
//! stages can tell internal links from free-form ones.

mod hooks;
mod inline;
mod parser;

pub use hooks::{CatalogHooks, ResolveInclude, ResolvePageRef};
pub use inline::{convert_inline, escape_html, PAGE_REF_ROLE};
pub use parser::{parse_document, ListBlock, ListItem, ParsedDocument};
