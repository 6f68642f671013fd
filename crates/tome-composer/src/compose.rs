//! Page model composition.

use std::collections::BTreeMap;

use tome_catalog::{
    ContentCatalog, File, FileId, Family, SITE_COMPONENT,
};
use tome_markup::parse_document;
use tome_nav::{NavItem, NavigationCatalog, UrlType};
use tome_playbook::Playbook;

use crate::model::{
    BreadcrumbItem, ComponentUiModel, PageUiModel, PageVersion, SiteUiModel, UiCatalog,
    VersionLink,
};

/// Layout name reserved for the not-found page.
const NOT_FOUND_LAYOUT: &str = "404";

/// Attribute prefix projected into the page model.
const PAGE_ATTRIBUTE_PREFIX: &str = "page-";

/// Error raised while composing a page model.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// Neither the requested layout nor the default exists.
    #[error("layout {layout} not found in UI bundle")]
    LayoutNotFound {
        /// The layout that was requested.
        layout: String,
    },

    /// The file carries no publish metadata and cannot be composed.
    #[error("cannot compose unpublished file: {id}")]
    NotPublishable {
        /// Identity key of the file.
        id: String,
    },
}

/// Composes [`PageUiModel`]s against a precomputed [`SiteUiModel`].
pub struct PageComposer<'a> {
    catalog: &'a ContentCatalog,
    nav: &'a NavigationCatalog,
    ui: UiCatalog,
    site: SiteUiModel,
}

impl<'a> PageComposer<'a> {
    /// Precompute the site model and create a composer.
    #[must_use]
    pub fn new(
        playbook: &Playbook,
        catalog: &'a ContentCatalog,
        nav: &'a NavigationCatalog,
        ui: UiCatalog,
    ) -> Self {
        let site = build_site_model(playbook, catalog, &ui);
        Self {
            catalog,
            nav,
            ui,
            site,
        }
    }

    /// The precomputed site model.
    #[must_use]
    pub fn site(&self) -> &SiteUiModel {
        &self.site
    }

    /// Compose the model for one publishable page.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::NotPublishable`] for files without publish
    /// metadata and [`ComposeError::LayoutNotFound`] when layout selection
    /// fails.
    pub fn compose(&self, page: &File) -> Result<PageUiModel, ComposeError> {
        let url = page
            .url()
            .ok_or_else(|| ComposeError::NotPublishable { id: page.id() })?
            .to_owned();

        let source = String::from_utf8_lossy(&page.contents);
        let doc = parse_document(&source);

        // The site-level 404 page bypasses the normal model.
        if page.src.component == SITE_COMPONENT && page.src.stem == NOT_FOUND_LAYOUT {
            if !self.ui.has_layout(NOT_FOUND_LAYOUT) {
                return Err(ComposeError::LayoutNotFound {
                    layout: NOT_FOUND_LAYOUT.to_owned(),
                });
            }
            return Ok(PageUiModel {
                layout: NOT_FOUND_LAYOUT.to_owned(),
                title: doc.title.or_else(|| Some("Page Not Found".to_owned())),
                attributes: BTreeMap::new(),
                url,
                component: page.src.component.clone(),
                version: page.src.version.clone(),
                module: page.src.module.clone(),
                versions: None,
                navigation: Vec::new(),
                breadcrumbs: Vec::new(),
                canonical_url: None,
                edit_url: None,
                home: false,
            });
        }

        let requested = doc
            .attributes
            .get("page-layout")
            .cloned()
            .unwrap_or_else(|| self.ui.default_layout.clone());
        let layout = self.select_layout(&requested)?;

        let attributes: BTreeMap<String, String> = doc
            .attributes
            .iter()
            .filter_map(|(name, value)| {
                name.strip_prefix(PAGE_ATTRIBUTE_PREFIX)
                    .map(|stripped| (stripped.to_owned(), value.clone()))
            })
            .collect();

        let component = self.catalog.get_component(&page.src.component);
        let versions = component
            .filter(|c| c.versions.len() > 1)
            .map(|c| self.page_versions(c, page));

        let navigation = self
            .nav
            .menu(&page.src.component, &page.src.version)
            .map(<[_]>::to_vec)
            .unwrap_or_default();

        let breadcrumbs = match find_breadcrumbs(&navigation, &url) {
            Some(chain) => chain,
            None => doc
                .title
                .as_ref()
                .map(|title| {
                    vec![BreadcrumbItem {
                        content: title.clone(),
                        url: Some(url.clone()),
                    }]
                })
                .unwrap_or_default(),
        };

        let canonical_url = self.site.url.as_ref().map(|base| {
            let target = versions
                .as_ref()
                .and_then(|all| all.iter().find(|v| !v.missing))
                .map_or(url.as_str(), |v| v.url.as_str());
            format!("{base}{target}")
        });

        let home = self.site.home_url.as_deref() == Some(url.as_str());

        Ok(PageUiModel {
            layout,
            title: doc.title,
            attributes,
            component: page.src.component.clone(),
            version: page.src.version.clone(),
            module: page.src.module.clone(),
            versions,
            navigation,
            breadcrumbs,
            canonical_url,
            edit_url: page.src.edit_url.clone(),
            home,
            url,
        })
    }

    /// Select a layout, falling back to the default for unknown names.
    ///
    /// The 404 layout never falls back: a missing 404 layout is a
    /// configuration error in its own right.
    fn select_layout(&self, requested: &str) -> Result<String, ComposeError> {
        if self.ui.has_layout(requested) {
            return Ok(requested.to_owned());
        }
        if requested == NOT_FOUND_LAYOUT {
            return Err(ComposeError::LayoutNotFound {
                layout: requested.to_owned(),
            });
        }
        if self.ui.has_layout(&self.ui.default_layout) {
            tracing::warn!(
                layout = %requested,
                fallback = %self.ui.default_layout,
                "Unknown layout, using default"
            );
            return Ok(self.ui.default_layout.clone());
        }
        Err(ComposeError::LayoutNotFound {
            layout: requested.to_owned(),
        })
    }

    /// This page across all of its component's versions, newest first.
    ///
    /// Every component version is represented; versions where the page
    /// doesn't exist point at that version's start page and are flagged
    /// missing.
    fn page_versions(
        &self,
        component: &tome_catalog::Component,
        page: &File,
    ) -> Vec<PageVersion> {
        component
            .versions
            .iter()
            .map(|entry| {
                let found = self
                    .catalog
                    .get_by_id(&FileId {
                        component: &page.src.component,
                        version: &entry.version,
                        module: &page.src.module,
                        family: Family::Page,
                        relative: &page.src.relative,
                    })
                    .and_then(|file| file.url().map(str::to_owned));
                match found {
                    Some(url) => PageVersion {
                        version: entry.version.clone(),
                        url,
                        missing: false,
                    },
                    None => PageVersion {
                        version: entry.version.clone(),
                        url: entry.url.clone(),
                        missing: true,
                    },
                }
            })
            .collect()
    }
}

/// Precompute the site model from the playbook and catalog.
fn build_site_model(
    playbook: &Playbook,
    catalog: &ContentCatalog,
    ui: &UiCatalog,
) -> SiteUiModel {
    let mut components: Vec<ComponentUiModel> = catalog
        .components()
        .iter()
        .map(|component| ComponentUiModel {
            name: component.name.clone(),
            title: component.title.clone(),
            url: component.url.clone(),
            versions: component
                .versions
                .iter()
                .map(|v| VersionLink {
                    version: v.version.clone(),
                    title: v.title.clone(),
                    url: v.url.clone(),
                })
                .collect(),
        })
        .collect();
    components.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.name.cmp(&b.name)));

    SiteUiModel {
        title: playbook.site.title.clone(),
        url: playbook
            .site
            .url
            .as_ref()
            .map(|u| u.trim_end_matches('/').to_owned()),
        home_url: catalog
            .get_site_start_page()
            .and_then(|file| file.url().map(str::to_owned)),
        components,
        keys: playbook.site.keys.clone(),
        ui_url: format!("/{}", ui.output_dir.trim_matches('/')),
        default_layout: ui.default_layout.clone(),
    }
}

/// DFS the menu for the chain of items leading to the page URL.
fn find_breadcrumbs(
    menus: &[tome_nav::NavigationTree],
    page_url: &str,
) -> Option<Vec<BreadcrumbItem>> {
    menus
        .iter()
        .find_map(|tree| find_chain(&tree.items, page_url))
}

fn find_chain(items: &[NavItem], page_url: &str) -> Option<Vec<BreadcrumbItem>> {
    for item in items {
        if item.url_type == Some(UrlType::Internal) && item.url.as_deref() == Some(page_url) {
            return Some(vec![crumb(item)]);
        }
        if let Some(mut chain) = find_chain(&item.items, page_url) {
            chain.insert(0, crumb(item));
            return Some(chain);
        }
    }
    None
}

fn crumb(item: &NavItem) -> BreadcrumbItem {
    BreadcrumbItem {
        content: item.content.clone(),
        url: item.url.clone(),
    }
}
