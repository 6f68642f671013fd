//! Component descriptor parsing.
//!
//! Every walked component root must contain exactly one `tome.yml` naming
//! the component and version. The version may be any YAML scalar and is
//! coerced to a string (`2.0` and `"2.0"` are the same version).

use serde::Deserialize;

/// Descriptor filename expected at the walked root.
pub const DESCRIPTOR_FILENAME: &str = "tome.yml";

/// Raw descriptor as deserialized from YAML.
#[derive(Debug, Deserialize)]
struct RawDescriptor {
    name: Option<String>,
    version: Option<serde_yaml::Value>,
    title: Option<String>,
    start_page: Option<String>,
    #[serde(default)]
    nav: Vec<String>,
}

/// Parsed component descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
    /// Component name.
    pub name: String,
    /// Version, coerced to a string.
    pub version: String,
    /// Display title.
    pub title: Option<String>,
    /// Contextual page spec of the start page.
    pub start_page: Option<String>,
    /// Navigation file paths, in menu order.
    pub nav: Vec<String>,
}

/// Parse a descriptor, returning the failure reason on invalid input.
///
/// # Errors
///
/// Returns a human-readable reason when the YAML is malformed, the name or
/// version is missing, or the version is not a scalar.
pub fn parse_descriptor(content: &[u8]) -> Result<ComponentDescriptor, String> {
    let text = std::str::from_utf8(content).map_err(|_| "not valid UTF-8".to_owned())?;
    let raw: RawDescriptor =
        serde_yaml::from_str(text).map_err(|e| format!("invalid YAML: {e}"))?;

    let name = raw
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| "missing required key: name".to_owned())?;
    let version = raw
        .version
        .ok_or_else(|| "missing required key: version".to_owned())
        .and_then(coerce_version)?;

    Ok(ComponentDescriptor {
        name,
        version,
        title: raw.title,
        start_page: raw.start_page,
        nav: raw.nav,
    })
}

/// Coerce a YAML scalar to a version string.
fn coerce_version(value: serde_yaml::Value) -> Result<String, String> {
    match value {
        serde_yaml::Value::String(s) if !s.is_empty() => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        _ => Err("version must be a non-empty scalar".to_owned()),
    }
}
