//! Capability hooks the markup engine resolves references through.
//!
//! The engine never sees the catalog directly; it is handed these two
//! interfaces. The pipeline installs [`CatalogHooks`], which answers from
//! the content catalog, but tests (and alternative engines) can substitute
//! their own implementations.

use tome_catalog::{
    resolve_include, resolve_page_ref, ContentCatalog, File, IncludeResolution, PageRefTarget,
};

/// Resolve an inline cross-reference spec for an originating file.
pub trait ResolvePageRef: Sync {
    /// Resolve `refspec` as seen from `from`.
    fn resolve_page_ref(&self, refspec: &str, from: &File) -> PageRefTarget;
}

/// Resolve an include directive target for an originating file.
pub trait ResolveInclude: Sync {
    /// Resolve `target` as seen from `from`, with `cursor` naming the path
    /// of the file the directive physically appears in.
    fn resolve_include(&self, target: &str, from: &File, cursor: &str) -> IncludeResolution;
}

/// Catalog-backed hook implementation.
pub struct CatalogHooks<'a> {
    catalog: &'a ContentCatalog,
    relativize: bool,
}

impl<'a> CatalogHooks<'a> {
    /// Create hooks over a catalog.
    ///
    /// With `relativize`, resolved page references are computed relative to
    /// the originating page's output directory instead of site-absolute.
    #[must_use]
    pub fn new(catalog: &'a ContentCatalog, relativize: bool) -> Self {
        Self {
            catalog,
            relativize,
        }
    }
}

impl ResolvePageRef for CatalogHooks<'_> {
    fn resolve_page_ref(&self, refspec: &str, from: &File) -> PageRefTarget {
        resolve_page_ref(refspec, from, self.catalog, self.relativize)
    }
}

impl ResolveInclude for CatalogHooks<'_> {
    fn resolve_include(&self, target: &str, from: &File, cursor: &str) -> IncludeResolution {
        resolve_include(target, from, cursor, self.catalog)
    }
}
