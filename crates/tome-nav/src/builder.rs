//! Navigation menu construction from navigation-family files.

use std::sync::LazyLock;

use regex::Regex;

use tome_catalog::{ContentCatalog, Family, File, FileFilter};
use tome_markup::{convert_inline, parse_document, ListBlock, ListItem, ResolvePageRef};

use crate::catalog::NavigationCatalog;
use crate::tree::{NavItem, NavigationTree, UrlType};

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<a(?P<attrs>[^>]*)>(?P<text>.*?)</a>").unwrap());
static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"class="(?P<class>[^"]*)""#).unwrap());
static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="(?P<href>[^"]*)""#).unwrap());

/// Build the navigation catalog from every navigation file in the content
/// catalog.
///
/// Each top-level unordered list becomes one tree. The first list of a file
/// takes the file's menu index as its order; subsequent lists get
/// fractional offsets so their relative position is stable.
#[must_use]
pub fn build_navigation(
    catalog: &ContentCatalog,
    refs: &dyn ResolvePageRef,
) -> NavigationCatalog {
    let mut nav_catalog = NavigationCatalog::new();

    let nav_files = catalog.find_by(&FileFilter {
        family: Some(Family::Navigation),
        ..Default::default()
    });

    for file in nav_files {
        let Some(nav) = file.nav else {
            tracing::warn!(path = %file.path, "Navigation file without menu index");
            continue;
        };
        let source = String::from_utf8_lossy(&file.contents);
        let doc = parse_document(&source);
        let list_count = doc.lists.len();

        for (offset, list) in doc.lists.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let order = round4(nav.index as f64 + offset as f64 / list_count as f64);
            let tree = build_tree(list, order, &file, refs);
            nav_catalog.add_tree(&file.src.component, &file.src.version, tree);
        }
    }

    nav_catalog
}

fn build_tree(
    list: &ListBlock,
    order: f64,
    file: &File,
    refs: &dyn ResolvePageRef,
) -> NavigationTree {
    NavigationTree {
        root: true,
        order,
        content: list
            .title
            .as_deref()
            .map(|title| convert_inline(title, file, refs)),
        items: list
            .items
            .iter()
            .map(|item| build_item(item, file, refs))
            .collect(),
    }
}

fn build_item(item: &ListItem, file: &File, refs: &dyn ResolvePageRef) -> NavItem {
    let html = convert_inline(&item.content, file, refs);
    let mut nav_item = partition_content(&html);
    nav_item.items = item
        .children
        .iter()
        .map(|child| build_item(child, file, refs))
        .collect();
    nav_item
}

/// Partition rendered item content by its first anchor.
fn partition_content(html: &str) -> NavItem {
    let Some(captures) = ANCHOR_RE.captures(html) else {
        return plain_item(html);
    };
    let attrs = &captures["attrs"];
    let text = captures["text"].to_owned();
    let Some(href) = HREF_RE
        .captures(attrs)
        .map(|c| c["href"].to_owned())
    else {
        return plain_item(html);
    };

    let has_page_role = CLASS_RE
        .captures(attrs)
        .is_some_and(|c| c["class"].split_whitespace().any(|role| role == "page"));

    if has_page_role {
        let (url, hash) = match href.split_once('#') {
            Some((url, hash)) => (url.to_owned(), Some(hash.to_owned())),
            None => (href, None),
        };
        NavItem {
            content: text,
            url: Some(url),
            url_type: Some(UrlType::Internal),
            hash,
            items: Vec::new(),
        }
    } else if href.starts_with('#') {
        NavItem {
            content: text,
            url: Some(href),
            url_type: Some(UrlType::Fragment),
            hash: None,
            items: Vec::new(),
        }
    } else {
        NavItem {
            content: text,
            url: Some(href),
            url_type: Some(UrlType::External),
            hash: None,
            items: Vec::new(),
        }
    }
}

fn plain_item(html: &str) -> NavItem {
    NavItem {
        content: html.to_owned(),
        url: None,
        url_type: None,
        hash: None,
        items: Vec::new(),
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
