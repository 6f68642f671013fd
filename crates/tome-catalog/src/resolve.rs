//! Page, include, and cross-reference resolution against the catalog.
//!
//! Explicit page resolution surfaces malformed specs as errors. Include and
//! cross-reference resolution never fail: a miss produces an unresolved
//! marker the caller renders inline, so one bad reference doesn't abort a
//! whole site build.

use std::sync::Arc;

use crate::catalog::ContentCatalog;
use crate::error::CatalogError;
use crate::file::{Family, File, FileId};
use crate::page_id::{PageId, PageIdContext};
use crate::url::relativize_url;

/// Include-target prefix proxying the partial family.
pub const PARTIALS_PROXY: &str = "partial$";

/// Include-target prefix proxying the example family.
pub const EXAMPLES_PROXY: &str = "example$";

/// Resolve a contextual page spec to a file.
///
/// The returned file may be a page or an alias; the caller decides whether
/// to dereference. `Ok(None)` means the spec was well-formed but nothing in
/// the catalog matches it.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidPageId`] for a malformed spec.
pub fn resolve_page(
    spec: &str,
    catalog: &ContentCatalog,
    ctx: PageIdContext<'_>,
) -> Result<Option<Arc<File>>, CatalogError> {
    let id = PageId::parse(spec, ctx)?;
    Ok(catalog.get_by_page_id(&id))
}

/// Outcome of include resolution.
#[derive(Debug, Clone)]
pub enum IncludeResolution {
    /// The target names a file in the catalog.
    Resolved {
        /// The resolved file.
        file: Arc<File>,
        /// Physical path of the resolved file.
        path: String,
        /// Contents to splice in (the original source for republished pages).
        contents: Vec<u8>,
    },
    /// Nothing matched; the caller renders the raw target inline.
    Unresolved {
        /// The original include target.
        target: String,
    },
}

/// Resolve an include directive target.
///
/// Targets starting with a family proxy (`partial$`, `example$`) resolve
/// within the originating file's component, version, and module. Any other
/// target resolves relative to the including file's directory by physical
/// path.
#[must_use]
pub fn resolve_include(
    target: &str,
    from: &File,
    cursor: &str,
    catalog: &ContentCatalog,
) -> IncludeResolution {
    let found = if let Some(relative) = target.strip_prefix(PARTIALS_PROXY) {
        catalog.get_by_id(&family_id(from, Family::Partial, relative))
    } else if let Some(relative) = target.strip_prefix(EXAMPLES_PROXY) {
        catalog.get_by_id(&family_id(from, Family::Example, relative))
    } else {
        let dir = cursor.rsplit_once('/').map_or("", |(dir, _)| dir);
        let path = normalize_path(dir, target);
        catalog.get_by_path(&from.src.component, &from.src.version, &path)
    };

    match found {
        Some(file) => {
            let contents = file
                .src_contents
                .clone()
                .unwrap_or_else(|| file.contents.clone());
            IncludeResolution::Resolved {
                path: file.path.clone(),
                contents,
                file,
            }
        }
        None => IncludeResolution::Unresolved {
            target: target.to_owned(),
        },
    }
}

fn family_id<'a>(from: &'a File, family: Family, relative: &'a str) -> FileId<'a> {
    FileId {
        component: &from.src.component,
        version: &from.src.version,
        module: &from.src.module,
        family,
        relative,
    }
}

/// Outcome of cross-reference resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRefTarget {
    /// The spec resolved to a published page.
    Internal {
        /// Link target, relativized when requested, fragment preserved.
        url: String,
    },
    /// The spec was malformed or matched nothing.
    Unresolved {
        /// The raw spec, preserved for inline rendering.
        original: String,
    },
}

/// Resolve an inline cross-reference spec from an originating page.
///
/// Aliases are dereferenced exactly once. With `relativize`, the link is
/// computed from the originating page's output directory; otherwise the
/// site-absolute publish URL is used. A `#fragment` suffix on the spec is
/// preserved on the resulting link.
#[must_use]
pub fn resolve_page_ref(
    refspec: &str,
    from: &File,
    catalog: &ContentCatalog,
    relativize: bool,
) -> PageRefTarget {
    let (spec, fragment) = match refspec.split_once('#') {
        Some((spec, fragment)) => (spec, Some(fragment)),
        None => (refspec, None),
    };

    let ctx = PageIdContext {
        component: Some(&from.src.component),
        version: Some(&from.src.version),
        module: Some(&from.src.module),
    };

    let found = PageId::parse(spec, ctx)
        .ok()
        .and_then(|id| catalog.get_by_page_id(&id));
    let Some(file) = found else {
        return PageRefTarget::Unresolved {
            original: refspec.to_owned(),
        };
    };

    let file = match (file.src.family, &file.rel) {
        (Family::Alias, Some(target)) => Arc::clone(target),
        _ => file,
    };
    let Some(publish) = &file.publish else {
        return PageRefTarget::Unresolved {
            original: refspec.to_owned(),
        };
    };

    let mut url = match (&from.out, relativize) {
        (Some(out), true) => relativize_url(&out.dirname, &publish.url),
        _ => publish.url.clone(),
    };
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }

    PageRefTarget::Internal { url }
}

/// Join a target onto a directory and collapse `.` / `..` segments.
fn normalize_path(dir: &str, target: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in dir.split('/').chain(target.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use tome_playbook::HtmlExtensionStyle;

    use super::*;
    use crate::file::FileSrc;

    fn build_catalog() -> (ContentCatalog, Arc<File>) {
        let mut catalog = ContentCatalog::new(HtmlExtensionStyle::Default);
        let page = catalog
            .add_file(File::new(
                "modules/ROOT/pages/topic/guide.adoc",
                b"= Guide\n".to_vec(),
                FileSrc::new("docs", "1.0", "ROOT", Family::Page, "topic/guide.adoc"),
            ))
            .unwrap();
        catalog
            .add_file(File::new(
                "modules/ROOT/pages/_partials/note.adoc",
                b"NOTE: hi\n".to_vec(),
                FileSrc::new("docs", "1.0", "ROOT", Family::Partial, "note.adoc"),
            ))
            .unwrap();
        catalog
            .add_file(File::new(
                "modules/ROOT/examples/hello.rs",
                b"fn main() {}\n".to_vec(),
                FileSrc::new("docs", "1.0", "ROOT", Family::Example, "hello.rs"),
            ))
            .unwrap();
        catalog.add_component_version("docs", "1.0", None, None).unwrap();
        (catalog, page)
    }

    // ── resolve_page ─────────────────────────────────────────────────

    #[test]
    fn test_resolve_page_fully_qualified() {
        let (catalog, page) = build_catalog();
        let found = resolve_page(
            "1.0@docs::topic/guide.adoc",
            &catalog,
            PageIdContext::default(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(found.id(), page.id());
    }

    #[test]
    fn test_resolve_page_without_version_uses_latest() {
        let (catalog, page) = build_catalog();
        let found = resolve_page("docs::topic/guide.adoc", &catalog, PageIdContext::default())
            .unwrap()
            .unwrap();
        assert_eq!(found.id(), page.id());
    }

    #[test]
    fn test_resolve_page_unknown_component_is_not_found() {
        let (catalog, _) = build_catalog();
        let found =
            resolve_page("ghost::index.adoc", &catalog, PageIdContext::default()).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_resolve_page_malformed_spec_errors() {
        let (catalog, _) = build_catalog();
        let err =
            resolve_page("a:b:c:d.adoc", &catalog, PageIdContext::default()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPageId { .. }));
    }

    // ── resolve_include ──────────────────────────────────────────────

    #[test]
    fn test_include_partial_proxy() {
        let (catalog, page) = build_catalog();
        let resolution = resolve_include("partial$note.adoc", &page, &page.path, &catalog);
        match resolution {
            IncludeResolution::Resolved { file, contents, .. } => {
                assert_eq!(file.src.family, Family::Partial);
                assert_eq!(contents, b"NOTE: hi\n");
            }
            IncludeResolution::Unresolved { .. } => panic!("expected resolution"),
        }
    }

    #[test]
    fn test_include_example_proxy() {
        let (catalog, page) = build_catalog();
        let resolution = resolve_include("example$hello.rs", &page, &page.path, &catalog);
        assert!(matches!(resolution, IncludeResolution::Resolved { .. }));
    }

    #[test]
    fn test_include_relative_path() {
        let (catalog, page) = build_catalog();
        // From pages/topic/guide.adoc up into the partials directory.
        let resolution =
            resolve_include("../_partials/note.adoc", &page, &page.path, &catalog);
        match resolution {
            IncludeResolution::Resolved { file, .. } => {
                assert_eq!(file.path, "modules/ROOT/pages/_partials/note.adoc");
            }
            IncludeResolution::Unresolved { .. } => panic!("expected resolution"),
        }
    }

    #[test]
    fn test_include_miss_returns_marker_with_target() {
        let (catalog, page) = build_catalog();
        let resolution = resolve_include("partial$ghost.adoc", &page, &page.path, &catalog);
        match resolution {
            IncludeResolution::Unresolved { target } => {
                assert_eq!(target, "partial$ghost.adoc");
            }
            IncludeResolution::Resolved { .. } => panic!("expected unresolved marker"),
        }
    }

    // ── resolve_page_ref ─────────────────────────────────────────────

    #[test]
    fn test_page_ref_absolute() {
        let (mut catalog, page) = build_catalog();
        let other = catalog
            .add_file(File::new(
                "modules/ROOT/pages/other.adoc",
                Vec::new(),
                FileSrc::new("docs", "1.0", "ROOT", Family::Page, "other.adoc"),
            ))
            .unwrap();
        let _ = other;

        let target = resolve_page_ref("other.adoc", &page, &catalog, false);
        assert_eq!(
            target,
            PageRefTarget::Internal {
                url: "/docs/1.0/other.html".to_owned()
            }
        );
    }

    #[test]
    fn test_page_ref_relativized_with_fragment() {
        let (mut catalog, page) = build_catalog();
        catalog
            .add_file(File::new(
                "modules/ROOT/pages/other.adoc",
                Vec::new(),
                FileSrc::new("docs", "1.0", "ROOT", Family::Page, "other.adoc"),
            ))
            .unwrap();

        // Originating page lives in docs/1.0/topic.
        let target = resolve_page_ref("other.adoc#setup", &page, &catalog, true);
        assert_eq!(
            target,
            PageRefTarget::Internal {
                url: "../other.html#setup".to_owned()
            }
        );
    }

    #[test]
    fn test_page_ref_dereferences_alias_once() {
        let (mut catalog, page) = build_catalog();
        let guide = catalog
            .get_by_id(&FileId {
                component: "docs",
                version: "1.0",
                module: "ROOT",
                family: Family::Page,
                relative: "topic/guide.adoc",
            })
            .unwrap();
        catalog.register_page_alias("1.0@docs::legacy", &guide).unwrap();

        let target = resolve_page_ref("legacy.adoc", &page, &catalog, false);
        assert_eq!(
            target,
            PageRefTarget::Internal {
                url: "/docs/1.0/topic/guide.html".to_owned()
            }
        );
    }

    #[test]
    fn test_page_ref_miss_preserves_raw_target() {
        let (catalog, page) = build_catalog();
        let target = resolve_page_ref("ghost.adoc#top", &page, &catalog, false);
        assert_eq!(
            target,
            PageRefTarget::Unresolved {
                original: "ghost.adoc#top".to_owned()
            }
        );
    }

    #[test]
    fn test_page_ref_malformed_spec_is_unresolved() {
        let (catalog, page) = build_catalog();
        let target = resolve_page_ref("a:b:c:d", &page, &catalog, false);
        assert!(matches!(target, PageRefTarget::Unresolved { .. }));
    }
}
