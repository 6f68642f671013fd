//! Path-convention classification of aggregated files.
//!
//! Files within a component version are expected to live under
//! `modules/<module>/<kind>/...`. The kind directory determines the family;
//! anything that doesn't match a known convention is discarded silently.
//! Navigation sources are recognized by their listing in the component
//! descriptor rather than by location.

use std::collections::HashMap;

use crate::bundle::{ComponentVersionBundle, RawFile};
use crate::catalog::ContentCatalog;
use crate::error::CatalogError;
use crate::file::{module_root_hops, Family, File, FileSrc, NavContext};
use crate::page_id::ROOT_MODULE;

/// Top-level directory holding a component version's modules.
const MODULES_DIR: &str = "modules/";

/// Classify a bundle's files into the catalog, then register the component
/// version (which resolves its start page against the just-added files).
///
/// # Errors
///
/// Propagates identity collisions, duplicate versions, and unresolvable
/// explicit start pages.
pub fn classify_into(
    catalog: &mut ContentCatalog,
    bundle: ComponentVersionBundle,
) -> Result<(), CatalogError> {
    let nav_index: HashMap<&str, usize> = bundle
        .nav
        .iter()
        .enumerate()
        .map(|(i, path)| (path.as_str(), i))
        .collect();

    for raw in &bundle.files {
        match classify_file(&bundle.name, &bundle.version, raw, &nav_index) {
            Some(file) => {
                catalog.add_file(file)?;
            }
            None => {
                tracing::debug!(path = %raw.path, "Discarded unclassifiable file");
            }
        }
    }

    catalog.add_component_version(
        &bundle.name,
        &bundle.version,
        bundle.title.as_deref(),
        bundle.start_page.as_deref(),
    )?;

    Ok(())
}

/// Classify a single raw file, or `None` when it matches no convention.
fn classify_file(
    component: &str,
    version: &str,
    raw: &RawFile,
    nav_index: &HashMap<&str, usize>,
) -> Option<File> {
    if let Some(&index) = nav_index.get(raw.path.as_str()) {
        return Some(classify_nav_file(component, version, raw, index));
    }

    let in_module = raw.path.strip_prefix(MODULES_DIR)?;
    let (module, rest) = in_module.split_once('/')?;
    if module.is_empty() || rest.is_empty() {
        return None;
    }

    let (family, relative) = if let Some(relative) = rest.strip_prefix("pages/_partials/") {
        (Family::Partial, relative)
    } else if let Some(relative) = rest.strip_prefix("pages/") {
        if !relative.ends_with(crate::file::SOURCE_MARKUP_EXT) {
            return None;
        }
        (Family::Page, relative)
    } else if let Some(relative) = rest.strip_prefix("assets/images/") {
        (Family::Image, relative)
    } else if let Some(relative) = rest.strip_prefix("assets/attachments/") {
        (Family::Attachment, relative)
    } else if let Some(relative) = rest.strip_prefix("examples/") {
        (Family::Example, relative)
    } else {
        return None;
    };

    if relative.is_empty() {
        return None;
    }

    let mut src = FileSrc::new(component, version, module, family, relative)
        .with_origin(raw.origin.clone(), &raw.path);
    src.module_root_path = module_root_hops(rest);

    Some(File::new(raw.path.clone(), raw.contents.clone(), src))
}

/// Classify a file listed in the descriptor's `nav` list.
fn classify_nav_file(component: &str, version: &str, raw: &RawFile, index: usize) -> File {
    // A nav file under a module belongs to it; anywhere else it belongs to
    // the default module and keeps its full path.
    let (module, relative) = raw
        .path
        .strip_prefix(MODULES_DIR)
        .and_then(|in_module| in_module.split_once('/'))
        .filter(|(module, rest)| !module.is_empty() && !rest.is_empty())
        .unwrap_or((ROOT_MODULE, raw.path.as_str()));

    let mut src = FileSrc::new(component, version, module, Family::Navigation, relative)
        .with_origin(raw.origin.clone(), &raw.path);
    src.module_root_path = module_root_hops(relative);

    let mut file = File::new(raw.path.clone(), raw.contents.clone(), src);
    file.nav = Some(NavContext { index });
    file
}
