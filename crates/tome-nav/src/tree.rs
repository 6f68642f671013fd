//! Navigation tree model.

use serde::Serialize;

/// How a navigation item's link should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlType {
    /// Link to a page in this site.
    Internal,
    /// Link to a fragment on the current page.
    Fragment,
    /// Link to an external resource.
    External,
}

/// An entry in a navigation tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavItem {
    /// Rendered inline content (link text for link items).
    pub content: String,
    /// Link target, when the item links somewhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Link treatment, when the item links somewhere.
    #[serde(rename = "urlType", skip_serializing_if = "Option::is_none")]
    pub url_type: Option<UrlType>,
    /// Fragment of an internal link, without the `#`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Nested entries.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<NavItem>,
}

/// One navigation tree: a titled root over its entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationTree {
    /// Always true; the tree node is the root of its list.
    pub root: bool,
    /// Menu position; trees sort ascending by this value.
    pub order: f64,
    /// Rendered list title, when the source list had one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Top-level entries.
    pub items: Vec<NavItem>,
}
