//! Contextual page ID parsing.
//!
//! A page spec has the shape `[version@][[component:][module:]]relative[.adoc]`
//! and is resolved against a context tuple. Examples:
//!
//! - `topic/page` — relative to the context's component, version, and module
//! - `mod:page` — module override, component/version from context
//! - `comp::page` — component override, module defaults to `ROOT`
//! - `2.0@comp:mod:page.adoc` — fully qualified

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CatalogError;
use crate::file::{Family, SOURCE_MARKUP_EXT};

/// Default module name when a component is named without a module.
pub const ROOT_MODULE: &str = "ROOT";

static PAGE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([^@:]+)@)?(?:(?:([^:]+):)?([^:]*):)?([^:]+?)(?:\.adoc)?$").unwrap()
});

/// Context tuple a spec is resolved against.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageIdContext<'a> {
    /// Component fallback.
    pub component: Option<&'a str>,
    /// Version fallback.
    pub version: Option<&'a str>,
    /// Module fallback.
    pub module: Option<&'a str>,
}

/// A parsed contextual page ID.
///
/// `version` may remain unset; the resolver substitutes the component's
/// latest version. `component` and `module` remain unset only when neither
/// the spec nor the context provided them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageId {
    /// Component name.
    pub component: Option<String>,
    /// Version string.
    pub version: Option<String>,
    /// Module name.
    pub module: Option<String>,
    /// Family, always [`Family::Page`] for parsed specs.
    pub family: Family,
    /// Relative path within the module's page tree, with extension.
    pub relative: String,
}

impl PageId {
    /// Parse a spec against a context.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidPageId`] when the spec does not match
    /// the grammar.
    pub fn parse(spec: &str, ctx: PageIdContext<'_>) -> Result<Self, CatalogError> {
        let captures = PAGE_ID_RE
            .captures(spec)
            .ok_or_else(|| CatalogError::InvalidPageId {
                spec: spec.to_owned(),
            })?;

        let version = captures.get(1).map(|m| m.as_str().to_owned());
        let component = captures.get(2).map(|m| m.as_str().to_owned());
        let module = captures
            .get(3)
            .map(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .map(str::to_owned);
        let relative = captures
            .get(4)
            .map(|m| m.as_str())
            .ok_or_else(|| CatalogError::InvalidPageId {
                spec: spec.to_owned(),
            })?;

        let (component, module) = match component {
            // Component named without a module means the default module.
            Some(c) => (Some(c), Some(module.unwrap_or_else(|| ROOT_MODULE.to_owned()))),
            None => (
                ctx.component.map(str::to_owned),
                module.or_else(|| ctx.module.map(str::to_owned)),
            ),
        };

        Ok(Self {
            component,
            version: version.or_else(|| ctx.version.map(str::to_owned)),
            module,
            family: Family::Page,
            relative: format!("{relative}{SOURCE_MARKUP_EXT}"),
        })
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(version) = &self.version {
            write!(f, "{version}@")?;
        }
        if let Some(component) = &self.component {
            write!(f, "{component}:")?;
        }
        if let Some(module) = &self.module {
            write!(f, "{module}:")?;
        }
        f.write_str(&self.relative)
    }
}
