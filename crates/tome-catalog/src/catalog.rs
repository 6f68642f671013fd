//! The content catalog: identity-keyed files and ordered component versions.
//!
//! The catalog is built serially from the aggregator's output and treated as
//! read-only by every downstream stage. Files are stored behind `Arc` so
//! aliases can hold their target directly and lookups hand out cheap clones.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tome_playbook::HtmlExtensionStyle;

use crate::error::CatalogError;
use crate::file::{Family, File, FileId, FileSrc, MASTER_VERSION};
use crate::page_id::{PageId, PageIdContext, ROOT_MODULE};
use crate::resolve::resolve_page;
use crate::url::{compute_out, compute_pub};
use crate::version::compare_versions;

/// Synthetic component name owning site-level files (start page, 404).
pub const SITE_COMPONENT: &str = "";

/// One published version of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentVersion {
    /// Version string.
    pub version: String,
    /// Display title of this version.
    pub title: String,
    /// Publish URL of this version's start page.
    pub url: String,
}

/// A versioned documentation component.
#[derive(Debug, Clone)]
pub struct Component {
    /// Component name.
    pub name: String,
    /// Display title (tracks the latest version's title).
    pub title: String,
    /// Publish URL of the latest version's start page.
    pub url: String,
    /// Versions ordered newest first.
    pub versions: Vec<ComponentVersion>,
}

impl Component {
    /// The newest version — always `versions[0]`.
    #[must_use]
    pub fn latest_version(&self) -> &ComponentVersion {
        &self.versions[0]
    }
}

/// Filter for [`ContentCatalog::find_by`]. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFilter<'a> {
    /// Match `src.component`.
    pub component: Option<&'a str>,
    /// Match `src.version`.
    pub version: Option<&'a str>,
    /// Match `src.module`.
    pub module: Option<&'a str>,
    /// Match `src.family`.
    pub family: Option<Family>,
    /// Match `src.relative`.
    pub relative: Option<&'a str>,
    /// Match `src.basename`.
    pub basename: Option<&'a str>,
    /// Match `src.extname`.
    pub extname: Option<&'a str>,
}

impl FileFilter<'_> {
    fn matches(&self, src: &FileSrc) -> bool {
        self.component.is_none_or(|v| src.component == v)
            && self.version.is_none_or(|v| src.version == v)
            && self.module.is_none_or(|v| src.module == v)
            && self.family.is_none_or(|v| src.family == v)
            && self.relative.is_none_or(|v| src.relative == v)
            && self.basename.is_none_or(|v| src.basename == v)
            && self.extname.is_none_or(|v| src.extname == v)
    }
}

/// Indexed catalog of classified files and component versions.
pub struct ContentCatalog {
    components: BTreeMap<String, Component>,
    files: HashMap<String, Arc<File>>,
    style: HtmlExtensionStyle,
}

impl ContentCatalog {
    /// Create an empty catalog with the site's extension style.
    #[must_use]
    pub fn new(style: HtmlExtensionStyle) -> Self {
        Self {
            components: BTreeMap::new(),
            files: HashMap::new(),
            style,
        }
    }

    /// The extension style published URLs follow.
    #[must_use]
    pub fn html_url_extension_style(&self) -> HtmlExtensionStyle {
        self.style
    }

    /// Add a classified file, computing its output and publish metadata.
    ///
    /// Output locations are computed for publishable non-alias files;
    /// publish metadata for publishable and navigation files.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateFile`] when a file with the same
    /// identity key is already present.
    pub fn add_file(&mut self, mut file: File) -> Result<Arc<File>, CatalogError> {
        let acting = file.acting_family();
        let publishable = file.is_publishable();

        if publishable && file.src.family != Family::Alias {
            file.out = Some(compute_out(&file.src, acting, self.style));
        }
        if publishable || file.src.family == Family::Navigation {
            file.publish = Some(compute_pub(&file.src, file.out.as_ref(), acting, self.style));
        }

        let id = file.id();
        if self.files.contains_key(&id) {
            return Err(CatalogError::DuplicateFile { id });
        }

        let file = Arc::new(file);
        self.files.insert(id, Arc::clone(&file));
        Ok(file)
    }

    /// Register a component version, resolving its start page.
    ///
    /// The version entry is inserted in descending version order; when it
    /// becomes the newest, the component's title and URL follow it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateVersion`] for an already-present
    /// version and [`CatalogError::StartPageMissing`] when an explicit
    /// start page spec does not resolve.
    pub fn add_component_version(
        &mut self,
        name: &str,
        version: &str,
        title: Option<&str>,
        start_page: Option<&str>,
    ) -> Result<(), CatalogError> {
        if let Some(component) = self.components.get(name) {
            if component.versions.iter().any(|v| v.version == version) {
                return Err(CatalogError::DuplicateVersion {
                    component: name.to_owned(),
                    version: version.to_owned(),
                });
            }
        }

        let url = self.resolve_start_page_url(name, version, start_page)?;
        let title = title.unwrap_or(name).to_owned();
        let entry = ComponentVersion {
            version: version.to_owned(),
            title: title.clone(),
            url: url.clone(),
        };

        match self.components.get_mut(name) {
            Some(component) => {
                let position = component
                    .versions
                    .iter()
                    .position(|v| compare_versions(version, &v.version) == Ordering::Less)
                    .unwrap_or(component.versions.len());
                component.versions.insert(position, entry);
                if position == 0 {
                    component.title = title;
                    component.url = url;
                }
            }
            None => {
                self.components.insert(
                    name.to_owned(),
                    Component {
                        name: name.to_owned(),
                        title,
                        url,
                        versions: vec![entry],
                    },
                );
            }
        }

        Ok(())
    }

    /// Resolve a component version's start page to a publish URL.
    fn resolve_start_page_url(
        &self,
        name: &str,
        version: &str,
        start_page: Option<&str>,
    ) -> Result<String, CatalogError> {
        let spec = start_page.unwrap_or("index.adoc");
        let ctx = PageIdContext {
            component: Some(name),
            version: Some(version),
            module: Some(ROOT_MODULE),
        };
        let id = PageId::parse(spec, ctx)?;

        let found = self.get_by_page_id(&id).and_then(|file| {
            file.publish.as_ref().map(|p| p.url.clone())
        });

        match found {
            Some(url) => Ok(url),
            None if start_page.is_some() => Err(CatalogError::StartPageMissing {
                component: name.to_owned(),
                version: version.to_owned(),
                spec: spec.to_owned(),
            }),
            None => {
                // No explicit spec: the component entry still gets a URL so
                // version menus can link somewhere sensible.
                let placeholder =
                    FileSrc::new(name, version, ROOT_MODULE, Family::Page, "index.adoc");
                Ok(compute_pub(&placeholder, None, Family::Page, self.style).url)
            }
        }
    }

    /// Look up a file by its identity tuple.
    #[must_use]
    pub fn get_by_id(&self, id: &FileId<'_>) -> Option<Arc<File>> {
        self.files.get(&id.key()).cloned()
    }

    /// Look up a file within a component version by its physical path.
    #[must_use]
    pub fn get_by_path(&self, component: &str, version: &str, path: &str) -> Option<Arc<File>> {
        self.files
            .values()
            .find(|f| {
                f.src.component == component && f.src.version == version && f.path == path
            })
            .cloned()
    }

    /// Find all files whose `src` matches every set field of the filter.
    ///
    /// Results are ordered by identity key for determinism.
    #[must_use]
    pub fn find_by(&self, filter: &FileFilter<'_>) -> Vec<Arc<File>> {
        let mut found: Vec<Arc<File>> = self
            .files
            .values()
            .filter(|f| filter.matches(&f.src))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id().cmp(&b.id()));
        found
    }

    /// Look up a component by name.
    #[must_use]
    pub fn get_component(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }

    /// All components, in name order.
    #[must_use]
    pub fn components(&self) -> Vec<&Component> {
        self.components.values().collect()
    }

    /// All files, in identity-key order.
    #[must_use]
    pub fn files(&self) -> Vec<Arc<File>> {
        let mut files: Vec<Arc<File>> = self.files.values().cloned().collect();
        files.sort_by(|a, b| a.id().cmp(&b.id()));
        files
    }

    /// Register an alias for a target page.
    ///
    /// The alias spec is parsed in the target's context. A missing version
    /// defaults to the parsed component's latest version when that component
    /// exists, otherwise to the target's version.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::SelfReferencingAlias`] when the alias ID is
    /// the target's own ID, and [`CatalogError::AliasConflict`] when it
    /// collides with any other existing file.
    pub fn register_page_alias(
        &mut self,
        spec: &str,
        target: &Arc<File>,
    ) -> Result<Arc<File>, CatalogError> {
        let ctx = PageIdContext {
            component: Some(&target.src.component),
            version: None,
            module: Some(&target.src.module),
        };
        let id = PageId::parse(spec, ctx)?;

        let component = id.component.unwrap_or_else(|| target.src.component.clone());
        let version = match id.version {
            Some(version) => version,
            None => match self.components.get(&component) {
                Some(existing) => existing.latest_version().version.clone(),
                None => target.src.version.clone(),
            },
        };
        let module = id.module.unwrap_or_else(|| ROOT_MODULE.to_owned());

        let page_id = FileId {
            component: &component,
            version: &version,
            module: &module,
            family: Family::Page,
            relative: &id.relative,
        };
        if let Some(existing) = self.files.get(&page_id.key()) {
            return Err(if existing.id() == target.id() {
                CatalogError::SelfReferencingAlias { id: page_id.key() }
            } else {
                CatalogError::AliasConflict { id: page_id.key() }
            });
        }

        let alias_id = FileId {
            family: Family::Alias,
            ..page_id
        };
        if self.files.contains_key(&alias_id.key()) {
            return Err(CatalogError::AliasConflict { id: alias_id.key() });
        }

        let src = FileSrc::new(component, version, module, Family::Alias, id.relative);
        let mut alias = File::new(String::new(), Vec::new(), src);
        // Keep alias chains one level deep.
        alias.rel = Some(match (target.src.family, &target.rel) {
            (Family::Alias, Some(real)) => Arc::clone(real),
            _ => Arc::clone(target),
        });

        self.add_file(alias)
    }

    /// Register the site's start page as an alias at the site root.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::StartPageMissing`] when the spec does not
    /// resolve to a page.
    pub fn register_site_start_page(&mut self, spec: &str) -> Result<(), CatalogError> {
        let target = resolve_page(spec, self, PageIdContext::default())?.ok_or_else(|| {
            CatalogError::StartPageMissing {
                component: SITE_COMPONENT.to_owned(),
                version: String::new(),
                spec: spec.to_owned(),
            }
        })?;
        let target = match (target.src.family, &target.rel) {
            (Family::Alias, Some(real)) => Arc::clone(real),
            _ => target,
        };

        let src = FileSrc::new(
            SITE_COMPONENT,
            MASTER_VERSION,
            ROOT_MODULE,
            Family::Alias,
            "index.adoc",
        );
        let mut alias = File::new(String::new(), Vec::new(), src);
        alias.rel = Some(target);
        self.add_file(alias)?;
        Ok(())
    }

    /// The canonical site start page. Never an alias.
    #[must_use]
    pub fn get_site_start_page(&self) -> Option<Arc<File>> {
        let id = FileId {
            component: SITE_COMPONENT,
            version: MASTER_VERSION,
            module: ROOT_MODULE,
            family: Family::Alias,
            relative: "index.adoc",
        };
        self.files.get(&id.key()).and_then(|alias| alias.rel.clone())
    }

    /// Look up a file by a parsed page ID (missing fields resolve to the
    /// component's latest version and the default module).
    pub(crate) fn get_by_page_id(&self, id: &PageId) -> Option<Arc<File>> {
        let component = id.component.as_deref()?;
        let version = match &id.version {
            Some(version) => version.clone(),
            None => {
                self.components
                    .get(component)?
                    .latest_version()
                    .version
                    .clone()
            }
        };
        let module = id.module.as_deref().unwrap_or(ROOT_MODULE);

        let page = FileId {
            component,
            version: &version,
            module,
            family: Family::Page,
            relative: &id.relative,
        };
        self.files
            .get(&page.key())
            .or_else(|| {
                let alias = FileId {
                    family: Family::Alias,
                    ..page
                };
                self.files.get(&alias.key())
            })
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ContentCatalog {
        ContentCatalog::new(HtmlExtensionStyle::Default)
    }

    fn page(component: &str, version: &str, module: &str, relative: &str) -> File {
        File::new(
            format!("modules/{module}/pages/{relative}"),
            b"= Title\n".to_vec(),
            FileSrc::new(component, version, module, Family::Page, relative),
        )
    }

    fn add_page(
        catalog: &mut ContentCatalog,
        component: &str,
        version: &str,
        relative: &str,
    ) -> Arc<File> {
        catalog
            .add_file(page(component, version, "ROOT", relative))
            .unwrap()
    }

    // ── add_file ─────────────────────────────────────────────────────

    #[test]
    fn test_add_file_computes_out_and_pub() {
        let mut catalog = catalog();
        let file = add_page(&mut catalog, "docs", "1.0", "intro.adoc");
        assert_eq!(file.out.as_ref().unwrap().path, "docs/1.0/intro.html");
        assert_eq!(file.url(), Some("/docs/1.0/intro.html"));
    }

    #[test]
    fn test_add_file_rejects_duplicate_identity() {
        let mut catalog = catalog();
        add_page(&mut catalog, "docs", "1.0", "intro.adoc");
        let err = catalog
            .add_file(page("docs", "1.0", "ROOT", "intro.adoc"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateFile { .. }));
    }

    #[test]
    fn test_add_file_hidden_page_not_published() {
        let mut catalog = catalog();
        let file = catalog
            .add_file(page("docs", "1.0", "ROOT", "_drafts/wip.adoc"))
            .unwrap();
        assert!(file.out.is_none());
        assert!(file.publish.is_none());
    }

    #[test]
    fn test_add_file_partial_not_published() {
        let mut catalog = catalog();
        let file = catalog
            .add_file(File::new(
                "modules/ROOT/pages/_partials/note.adoc",
                Vec::new(),
                FileSrc::new("docs", "1.0", "ROOT", Family::Partial, "note.adoc"),
            ))
            .unwrap();
        assert!(file.out.is_none());
        assert!(file.publish.is_none());
    }

    #[test]
    fn test_add_file_navigation_gets_synthetic_pub() {
        let mut catalog = catalog();
        let file = catalog
            .add_file(File::new(
                "modules/ROOT/nav.adoc",
                Vec::new(),
                FileSrc::new("docs", "master", "ROOT", Family::Navigation, "nav.adoc"),
            ))
            .unwrap();
        assert!(file.out.is_none());
        assert_eq!(file.url(), Some("/docs/"));
    }

    // ── component versions ───────────────────────────────────────────

    #[test]
    fn test_versions_kept_in_descending_order() {
        let mut catalog = catalog();
        for version in ["1.0", "2.0", "1.5", "3.0"] {
            add_page(&mut catalog, "docs", version, "index.adoc");
            catalog
                .add_component_version("docs", version, None, None)
                .unwrap();
        }

        let component = catalog.get_component("docs").unwrap();
        let versions: Vec<&str> = component
            .versions
            .iter()
            .map(|v| v.version.as_str())
            .collect();
        assert_eq!(versions, vec!["3.0", "2.0", "1.5", "1.0"]);
        assert_eq!(component.latest_version().version, "3.0");
        assert_eq!(component.url, "/docs/3.0/index.html");
    }

    #[test]
    fn test_duplicate_version_fails() {
        let mut catalog = catalog();
        add_page(&mut catalog, "docs", "1.0", "index.adoc");
        catalog
            .add_component_version("docs", "1.0", None, None)
            .unwrap();
        let err = catalog
            .add_component_version("docs", "1.0", None, None)
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateVersion { .. }));
    }

    #[test]
    fn test_explicit_start_page_resolves() {
        let mut catalog = catalog();
        add_page(&mut catalog, "docs", "1.0", "welcome.adoc");
        catalog
            .add_component_version("docs", "1.0", Some("Docs"), Some("welcome.adoc"))
            .unwrap();
        assert_eq!(catalog.get_component("docs").unwrap().url, "/docs/1.0/welcome.html");
    }

    #[test]
    fn test_missing_explicit_start_page_fails() {
        let mut catalog = catalog();
        let err = catalog
            .add_component_version("docs", "1.0", None, Some("nope.adoc"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::StartPageMissing { .. }));
    }

    #[test]
    fn test_missing_default_start_page_synthesizes_placeholder() {
        let mut catalog = catalog();
        catalog
            .add_component_version("docs", "1.0", None, None)
            .unwrap();
        assert_eq!(catalog.get_component("docs").unwrap().url, "/docs/1.0/index.html");
    }

    #[test]
    fn test_component_title_tracks_latest_version() {
        let mut catalog = catalog();
        add_page(&mut catalog, "docs", "1.0", "index.adoc");
        add_page(&mut catalog, "docs", "2.0", "index.adoc");
        catalog
            .add_component_version("docs", "1.0", Some("Docs 1"), None)
            .unwrap();
        catalog
            .add_component_version("docs", "2.0", Some("Docs 2"), None)
            .unwrap();

        let component = catalog.get_component("docs").unwrap();
        assert_eq!(component.title, "Docs 2");

        // An older version arriving later must not steal the title.
        add_page(&mut catalog, "docs", "0.9", "index.adoc");
        catalog
            .add_component_version("docs", "0.9", Some("Docs 0.9"), None)
            .unwrap();
        assert_eq!(catalog.get_component("docs").unwrap().title, "Docs 2");
    }

    // ── lookups ──────────────────────────────────────────────────────

    #[test]
    fn test_find_by_matches_all_given_fields() {
        let mut catalog = catalog();
        add_page(&mut catalog, "docs", "1.0", "a.adoc");
        add_page(&mut catalog, "docs", "2.0", "a.adoc");
        add_page(&mut catalog, "other", "1.0", "a.adoc");

        let found = catalog.find_by(&FileFilter {
            component: Some("docs"),
            relative: Some("a.adoc"),
            ..Default::default()
        });
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|f| f.src.component == "docs"));

        let found = catalog.find_by(&FileFilter {
            extname: Some(".adoc"),
            ..Default::default()
        });
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_get_by_path() {
        let mut catalog = catalog();
        add_page(&mut catalog, "docs", "1.0", "intro.adoc");
        let found = catalog
            .get_by_path("docs", "1.0", "modules/ROOT/pages/intro.adoc")
            .unwrap();
        assert_eq!(found.src.relative, "intro.adoc");
        assert!(catalog.get_by_path("docs", "2.0", "modules/ROOT/pages/intro.adoc").is_none());
    }

    // ── aliases ──────────────────────────────────────────────────────

    #[test]
    fn test_register_alias_and_look_up() {
        let mut catalog = catalog();
        let intro = add_page(&mut catalog, "docs", "2.0", "intro.adoc");
        catalog
            .add_component_version("docs", "2.0", None, None)
            .unwrap();

        catalog.register_page_alias("2.0@docs::old-intro", &intro).unwrap();

        let alias = catalog
            .get_by_id(&FileId {
                component: "docs",
                version: "2.0",
                module: "ROOT",
                family: Family::Alias,
                relative: "old-intro.adoc",
            })
            .unwrap();
        assert_eq!(alias.rel.as_ref().unwrap().id(), intro.id());
        // Alias publishes under its own ID with the target's acting family.
        assert_eq!(alias.url(), Some("/docs/2.0/old-intro.html"));
    }

    #[test]
    fn test_register_alias_twice_conflicts() {
        let mut catalog = catalog();
        let intro = add_page(&mut catalog, "docs", "2.0", "intro.adoc");
        catalog.register_page_alias("2.0@docs::old-intro", &intro).unwrap();
        let err = catalog
            .register_page_alias("2.0@docs::old-intro", &intro)
            .unwrap_err();
        assert!(matches!(err, CatalogError::AliasConflict { .. }));
    }

    #[test]
    fn test_register_alias_over_existing_page_conflicts() {
        let mut catalog = catalog();
        let intro = add_page(&mut catalog, "docs", "2.0", "intro.adoc");
        add_page(&mut catalog, "docs", "2.0", "taken.adoc");
        let err = catalog
            .register_page_alias("2.0@docs::taken", &intro)
            .unwrap_err();
        assert!(matches!(err, CatalogError::AliasConflict { .. }));
    }

    #[test]
    fn test_register_alias_to_itself_has_distinct_error() {
        let mut catalog = catalog();
        let intro = add_page(&mut catalog, "docs", "2.0", "intro.adoc");
        let err = catalog
            .register_page_alias("2.0@docs::intro", &intro)
            .unwrap_err();
        assert!(matches!(err, CatalogError::SelfReferencingAlias { .. }));
    }

    #[test]
    fn test_alias_version_defaults_to_component_latest() {
        let mut catalog = catalog();
        let old = add_page(&mut catalog, "docs", "1.0", "intro.adoc");
        add_page(&mut catalog, "docs", "2.0", "intro.adoc");
        catalog.add_component_version("docs", "1.0", None, None).unwrap();
        catalog.add_component_version("docs", "2.0", None, None).unwrap();

        let alias = catalog.register_page_alias("docs::old-intro", &old).unwrap();
        assert_eq!(alias.src.version, "2.0");
    }

    // ── site start page ──────────────────────────────────────────────

    #[test]
    fn test_site_start_page_never_an_alias() {
        let mut catalog = catalog();
        let intro = add_page(&mut catalog, "docs", "2.0", "intro.adoc");
        catalog.add_component_version("docs", "2.0", None, None).unwrap();
        let alias = catalog.register_page_alias("2.0@docs::start", &intro).unwrap();

        // Point the site start page at the alias; lookup must dereference.
        let _ = alias;
        catalog.register_site_start_page("2.0@docs::start").unwrap();
        let start = catalog.get_site_start_page().unwrap();
        assert_eq!(start.src.family, Family::Page);
        assert_eq!(start.id(), intro.id());
    }

    #[test]
    fn test_site_start_page_missing_spec_fails() {
        let mut catalog = catalog();
        let err = catalog.register_site_start_page("docs::nope.adoc").unwrap_err();
        assert!(matches!(err, CatalogError::StartPageMissing { .. }));
    }

    #[test]
    fn test_get_site_start_page_unset() {
        assert!(catalog().get_site_start_page().is_none());
    }
}
