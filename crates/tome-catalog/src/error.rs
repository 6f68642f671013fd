//! Catalog error types.

/// Error raised by catalog construction and reference resolution.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A contextual page spec did not match the page ID grammar.
    #[error("invalid page ID spec: {spec}")]
    InvalidPageId {
        /// The offending spec string.
        spec: String,
    },

    /// Two files hashed to the same identity key.
    #[error("duplicate file in content catalog: {id}")]
    DuplicateFile {
        /// Identity key of the colliding file.
        id: String,
    },

    /// Two sources contributed the same component version.
    #[error("duplicate version {version} for component {component}")]
    DuplicateVersion {
        /// Component name.
        component: String,
        /// Version string.
        version: String,
    },

    /// An explicit start page spec did not resolve to a page.
    #[error("start page {spec} for {version}@{component} does not exist")]
    StartPageMissing {
        /// Component name.
        component: String,
        /// Version string.
        version: String,
        /// The unresolvable spec.
        spec: String,
    },

    /// A page alias resolved to its own target.
    #[error("page alias cannot reference itself: {id}")]
    SelfReferencingAlias {
        /// Identity key of the alias.
        id: String,
    },

    /// A page alias ID collides with an existing file.
    #[error("page alias conflicts with existing file: {id}")]
    AliasConflict {
        /// Identity key of the alias.
        id: String,
    },
}
