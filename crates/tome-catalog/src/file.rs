//! Virtual file model for the content catalog.
//!
//! Every ingested file carries a `src` identity tuple assigned during
//! classification. Publishable files additionally carry `out` (where the
//! file lands on disk) and `pub` (the site-absolute URL it is served from).
//! Both are derived purely from `src` and the site's extension style, so the
//! identity tuple is the single source of truth.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

/// Extension of source markup documents, with leading dot.
pub const SOURCE_MARKUP_EXT: &str = ".adoc";

/// MIME type of source markup documents.
pub const SOURCE_MARKUP_MEDIA_TYPE: &str = "text/asciidoc";

/// Version literal omitted from output paths and publish URLs.
pub const MASTER_VERSION: &str = "master";

/// Classification tag of a virtual file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// A renderable document under `pages/`.
    Page,
    /// A reusable fragment under `pages/_partials/`.
    Partial,
    /// An image under `assets/images/`.
    Image,
    /// A downloadable file under `assets/attachments/`.
    Attachment,
    /// A source snippet under `examples/`.
    Example,
    /// A navigation source listed in the component descriptor.
    Navigation,
    /// A published redirect to another page.
    Alias,
}

impl Family {
    /// Lowercase name used in identity keys.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Partial => "partial",
            Self::Image => "image",
            Self::Attachment => "attachment",
            Self::Example => "example",
            Self::Navigation => "navigation",
            Self::Alias => "alias",
        }
    }

    /// Whether files of this family can appear in the published site.
    #[must_use]
    pub fn is_publishable(self) -> bool {
        matches!(self, Self::Page | Self::Image | Self::Attachment)
    }
}

/// Kind of git reference a file was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    /// A branch head.
    Branch,
    /// An annotated or lightweight tag.
    Tag,
}

/// Metadata describing where a file's content came from.
#[derive(Debug, Clone)]
pub struct Origin {
    /// Repository URL or local path.
    pub url: String,
    /// Path within the repository where the component root lives.
    pub start_path: String,
    /// Short name of the git reference.
    pub refname: String,
    /// Branch or tag.
    pub ref_kind: RefKind,
    /// Local worktree path when files were read from a checked-out tree.
    pub worktree: Option<std::path::PathBuf>,
    /// Edit URL template with a `%s` placeholder for the file path.
    pub edit_url_pattern: Option<String>,
}

impl Origin {
    /// Expand the edit URL pattern for a file path relative to `start_path`.
    #[must_use]
    pub fn edit_url_for(&self, path: &str) -> Option<String> {
        self.edit_url_pattern
            .as_ref()
            .map(|pattern| pattern.replace("%s", path))
    }
}

/// Identity tuple of a virtual file, set during classification.
#[derive(Debug, Clone)]
pub struct FileSrc {
    /// Component name.
    pub component: String,
    /// Version string.
    pub version: String,
    /// Module name (`ROOT` for the default module).
    pub module: String,
    /// Classification tag.
    pub family: Family,
    /// Path relative to the family root within the module.
    pub relative: String,
    /// File name with extension.
    pub basename: String,
    /// File name without extension.
    pub stem: String,
    /// Extension with leading dot ("" when absent).
    pub extname: String,
    /// MIME type derived from the extension.
    pub media_type: Option<&'static str>,
    /// Depth of the file's directory below the module root, as `..` hops.
    pub module_root_path: String,
    /// Source metadata shared by all files from one git ref.
    pub origin: Option<Arc<Origin>>,
    /// Expanded edit URL for this file.
    pub edit_url: Option<String>,
}

impl FileSrc {
    /// Build an identity tuple, deriving the name fields from `relative`.
    #[must_use]
    pub fn new(
        component: impl Into<String>,
        version: impl Into<String>,
        module: impl Into<String>,
        family: Family,
        relative: impl Into<String>,
    ) -> Self {
        let relative = relative.into();
        let basename = relative
            .rsplit('/')
            .next()
            .unwrap_or(relative.as_str())
            .to_owned();
        let (stem, extname) = match basename.rfind('.') {
            Some(dot) if dot > 0 => (basename[..dot].to_owned(), basename[dot..].to_owned()),
            _ => (basename.clone(), String::new()),
        };
        let media_type = media_type_for(&extname);

        Self {
            component: component.into(),
            version: version.into(),
            module: module.into(),
            family,
            relative,
            basename,
            stem,
            extname,
            media_type,
            module_root_path: ".".to_owned(),
            origin: None,
            edit_url: None,
        }
    }

    /// Attach origin metadata and the expanded edit URL.
    #[must_use]
    pub fn with_origin(mut self, origin: Arc<Origin>, repo_path: &str) -> Self {
        self.edit_url = origin.edit_url_for(repo_path);
        self.origin = Some(origin);
        self
    }

    /// Identity key: `$<family>/<version>@<component>:<module>:<relative>`.
    #[must_use]
    pub fn id(&self) -> String {
        format!(
            "${}/{}@{}:{}:{}",
            self.family.as_str(),
            self.version,
            self.component,
            self.module,
            self.relative
        )
    }

    /// Whether any path segment of `relative` is underscore-prefixed.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.relative.split('/').any(|seg| seg.starts_with('_'))
    }
}

/// Lookup key for [`ContentCatalog::get_by_id`](crate::ContentCatalog::get_by_id).
#[derive(Debug, Clone, Copy)]
pub struct FileId<'a> {
    /// Component name.
    pub component: &'a str,
    /// Version string.
    pub version: &'a str,
    /// Module name.
    pub module: &'a str,
    /// Family.
    pub family: Family,
    /// Relative path with extension.
    pub relative: &'a str,
}

impl FileId<'_> {
    /// Identity key string for this lookup.
    #[must_use]
    pub fn key(&self) -> String {
        format!(
            "${}/{}@{}:{}:{}",
            self.family.as_str(),
            self.version,
            self.component,
            self.module,
            self.relative
        )
    }
}

/// Output location of a publishable file, relative to the site root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOut {
    /// Directory part of the output path ("" for the site root).
    pub dirname: String,
    /// Output file name.
    pub basename: String,
    /// Full output path.
    pub path: String,
    /// Relative hops from `dirname` back to the module output root.
    pub module_root_path: String,
    /// Relative hops from `dirname` back to the site root.
    pub root_path: String,
}

/// Publish metadata of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePub {
    /// Site-absolute URL with leading `/`.
    pub url: String,
    /// Relative hops back to the module output root, when known.
    pub module_root_path: Option<String>,
    /// Relative hops back to the site root, when known.
    pub root_path: Option<String>,
    /// Absolute canonical URL, set at compose time when `site.url` is known.
    pub canonical_url: Option<String>,
}

/// Navigation context recorded on navigation-family files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavContext {
    /// Position of this file in the component descriptor's `nav` list.
    pub index: usize,
}

/// A virtual file owned by the content catalog.
#[derive(Debug, Clone)]
pub struct File {
    /// Physical in-repo path (below the source's start path).
    pub path: String,
    /// File contents.
    pub contents: Vec<u8>,
    /// Identity tuple.
    pub src: FileSrc,
    /// Output location, when publishable.
    pub out: Option<FileOut>,
    /// Publish metadata, when publishable or navigation.
    pub publish: Option<FilePub>,
    /// Original source of a page republished under another family.
    pub src_contents: Option<Vec<u8>>,
    /// Target of an alias.
    pub rel: Option<Arc<File>>,
    /// Navigation context, for navigation-family files.
    pub nav: Option<NavContext>,
}

impl File {
    /// Create a file from its identity tuple and contents.
    #[must_use]
    pub fn new(path: impl Into<String>, contents: Vec<u8>, src: FileSrc) -> Self {
        Self {
            path: path.into(),
            contents,
            src,
            out: None,
            publish: None,
            src_contents: None,
            rel: None,
            nav: None,
        }
    }

    /// Family used for URL computation: the target's family for aliases.
    #[must_use]
    pub fn acting_family(&self) -> Family {
        if self.src.family == Family::Alias {
            if let Some(target) = &self.rel {
                return target.src.family;
            }
        }
        self.src.family
    }

    /// Whether this file appears in the published site.
    #[must_use]
    pub fn is_publishable(&self) -> bool {
        self.acting_family().is_publishable() && !self.src.is_hidden()
    }

    /// Identity key of this file.
    #[must_use]
    pub fn id(&self) -> String {
        self.src.id()
    }

    /// Published URL, when the file carries publish metadata.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.publish.as_ref().map(|p| p.url.as_str())
    }
}

/// Map a file extension (with leading dot) to a MIME type.
#[must_use]
pub fn media_type_for(extname: &str) -> Option<&'static str> {
    match extname {
        ".adoc" => Some(SOURCE_MARKUP_MEDIA_TYPE),
        ".html" => Some("text/html"),
        ".css" => Some("text/css"),
        ".js" => Some("text/javascript"),
        ".png" => Some("image/png"),
        ".jpg" | ".jpeg" => Some("image/jpeg"),
        ".gif" => Some("image/gif"),
        ".svg" => Some("image/svg+xml"),
        ".webp" => Some("image/webp"),
        ".ico" => Some("image/x-icon"),
        ".pdf" => Some("application/pdf"),
        ".zip" => Some("application/zip"),
        ".json" => Some("application/json"),
        ".yml" | ".yaml" => Some("application/yaml"),
        ".txt" => Some("text/plain"),
        _ => None,
    }
}

/// Count the directories in a path and express them as `..` hops.
///
/// `"nav.adoc"` yields `"."`; `"a/b/file.adoc"` yields `"../.."`.
#[must_use]
pub fn module_root_hops(path: &str) -> String {
    let depth = Path::new(path)
        .parent()
        .map_or(0, |p| p.components().count());
    if depth == 0 {
        ".".to_owned()
    } else {
        vec![".."; depth].join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_src_derives_name_fields() {
        let src = FileSrc::new("docs", "1.0", "ROOT", Family::Page, "topic/page.adoc");
        assert_eq!(src.basename, "page.adoc");
        assert_eq!(src.stem, "page");
        assert_eq!(src.extname, ".adoc");
        assert_eq!(src.media_type, Some(SOURCE_MARKUP_MEDIA_TYPE));
    }

    #[test]
    fn test_src_without_extension() {
        let src = FileSrc::new("docs", "1.0", "ROOT", Family::Attachment, "LICENSE-copy");
        assert_eq!(src.stem, "LICENSE-copy");
        assert_eq!(src.extname, "");
        assert!(src.media_type.is_none());
    }

    #[test]
    fn test_identity_key_shape() {
        let src = FileSrc::new("docs", "2.0", "admin", Family::Partial, "note.adoc");
        assert_eq!(src.id(), "$partial/2.0@docs:admin:note.adoc");
    }

    #[test]
    fn test_hidden_when_any_segment_underscored() {
        assert!(FileSrc::new("d", "1", "ROOT", Family::Page, "_drafts/x.adoc").is_hidden());
        assert!(FileSrc::new("d", "1", "ROOT", Family::Page, "a/_b/x.adoc").is_hidden());
        assert!(!FileSrc::new("d", "1", "ROOT", Family::Page, "a/b/x.adoc").is_hidden());
    }

    #[test]
    fn test_acting_family_dereferences_alias() {
        let target = Arc::new(File::new(
            "modules/ROOT/pages/intro.adoc",
            Vec::new(),
            FileSrc::new("docs", "1.0", "ROOT", Family::Page, "intro.adoc"),
        ));
        let mut alias = File::new(
            "",
            Vec::new(),
            FileSrc::new("docs", "1.0", "ROOT", Family::Alias, "old.adoc"),
        );
        alias.rel = Some(target);
        assert_eq!(alias.acting_family(), Family::Page);
        assert!(alias.is_publishable());
    }

    #[test]
    fn test_edit_url_expansion() {
        let origin = Origin {
            url: "https://github.com/org/repo".to_owned(),
            start_path: "docs".to_owned(),
            refname: "main".to_owned(),
            ref_kind: RefKind::Branch,
            worktree: None,
            edit_url_pattern: Some("https://github.com/org/repo/edit/main/docs/%s".to_owned()),
        };
        assert_eq!(
            origin.edit_url_for("modules/ROOT/pages/index.adoc").as_deref(),
            Some("https://github.com/org/repo/edit/main/docs/modules/ROOT/pages/index.adoc")
        );
    }

    #[test]
    fn test_module_root_hops() {
        assert_eq!(module_root_hops("nav.adoc"), ".");
        assert_eq!(module_root_hops("pages/page.adoc"), "..");
        assert_eq!(module_root_hops("pages/topic/page.adoc"), "../..");
    }
}
