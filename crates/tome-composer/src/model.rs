//! UI model types handed to the layout engine.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use tome_nav::NavigationTree;

/// The UI bundle as the composer sees it: where it publishes and which
/// layouts it offers. Asset loading is out of scope.
#[derive(Debug, Clone)]
pub struct UiCatalog {
    /// Directory under the site root where UI assets are published.
    pub output_dir: String,
    /// Layout applied when a page doesn't select one.
    pub default_layout: String,
    /// Names of available layouts.
    pub layouts: BTreeSet<String>,
}

impl UiCatalog {
    /// Create a UI catalog.
    #[must_use]
    pub fn new(
        output_dir: impl Into<String>,
        default_layout: impl Into<String>,
        layouts: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            default_layout: default_layout.into(),
            layouts: layouts.into_iter().collect(),
        }
    }

    /// Whether a layout is available.
    #[must_use]
    pub fn has_layout(&self, name: &str) -> bool {
        self.layouts.contains(name)
    }
}

/// A version entry of a component, for version menus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionLink {
    /// Version string.
    pub version: String,
    /// Display title.
    pub title: String,
    /// Start-page URL of this version.
    pub url: String,
}

/// A component as shown in site-wide UI (component selector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentUiModel {
    /// Component name.
    pub name: String,
    /// Display title.
    pub title: String,
    /// Start-page URL of the latest version.
    pub url: String,
    /// Versions, newest first.
    pub versions: Vec<VersionLink>,
}

/// Site-wide model precomputed once per build.
#[derive(Debug, Clone, Serialize)]
pub struct SiteUiModel {
    /// Site title.
    pub title: Option<String>,
    /// Absolute site URL without trailing slash.
    pub url: Option<String>,
    /// URL of the site start page.
    pub home_url: Option<String>,
    /// Components sorted alphabetically by title.
    pub components: Vec<ComponentUiModel>,
    /// Opaque service keys from the playbook.
    pub keys: BTreeMap<String, String>,
    /// Site-absolute URL of the UI bundle output.
    pub ui_url: String,
    /// Default layout name.
    pub default_layout: String,
}

/// One entry in a page's version menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageVersion {
    /// Version string.
    pub version: String,
    /// URL of this page in that version, or the version's start page when
    /// the page doesn't exist there.
    pub url: String,
    /// Whether the page is missing in that version.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub missing: bool,
}

/// One breadcrumb entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreadcrumbItem {
    /// Rendered crumb content.
    pub content: String,
    /// Link target, when the crumb links somewhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Per-page model consumed by the layout engine.
#[derive(Debug, Clone, Serialize)]
pub struct PageUiModel {
    /// Selected layout name.
    pub layout: String,
    /// Document title.
    pub title: Option<String>,
    /// `page-` attributes with the prefix stripped.
    pub attributes: BTreeMap<String, String>,
    /// Publish URL of this page.
    pub url: String,
    /// Component name ("" for site-level pages).
    pub component: String,
    /// Version string.
    pub version: String,
    /// Module name.
    pub module: String,
    /// This page across component versions, newest first; present only
    /// when the component has more than one version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<PageVersion>>,
    /// Navigation menu of the page's component version.
    pub navigation: Vec<NavigationTree>,
    /// Breadcrumb trail.
    pub breadcrumbs: Vec<BreadcrumbItem>,
    /// Absolute canonical URL, when the site URL is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    /// Edit URL of the page source, when the origin supports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<String>,
    /// Whether this page is the site start page.
    pub home: bool,
}

/// The external layout engine: a pure function from (layout, model, body)
/// to bytes.
pub trait LayoutRenderer {
    /// Render a composed page to output bytes.
    fn render(&self, layout: &str, site: &SiteUiModel, page: &PageUiModel, body: &str) -> Vec<u8>;
}
