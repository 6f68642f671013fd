//! Playbook parsing for the tome site generator.
//!
//! The playbook is the single input record of the pipeline: it names the
//! content sources to aggregate, the URL policy for published pages, the
//! runtime knobs (cache location, fetch behavior, terminal verbosity), and
//! the UI output settings. It is parsed from `tome.toml` with serde and
//! frozen after loading: downstream stages receive it by shared reference
//! and never mutate it.
//!
//! CLI settings can be applied during load via [`CliSettings`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Playbook filename to search for.
const PLAYBOOK_FILENAME: &str = "tome.toml";

/// Name of the cache directory under the playbook dir.
const CACHE_DIR_NAME: &str = ".cache";

/// CLI settings that override playbook values.
///
/// All fields are optional. Only non-None values override the loaded playbook.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override `runtime.pull`.
    pub pull: Option<bool>,
    /// Override `runtime.quiet`.
    pub quiet: Option<bool>,
    /// Override `runtime.silent`.
    pub silent: Option<bool>,
    /// Override `runtime.cache_dir`.
    pub cache_dir: Option<PathBuf>,
    /// Override `ui.output_dir`.
    pub output_dir: Option<String>,
}

/// Playbook error.
#[derive(Debug, thiserror::Error)]
pub enum PlaybookError {
    /// Playbook file not found.
    #[error("Playbook file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Playbook error: {0}")]
    Validation(String),
}

/// Policy mapping a page's internal path to its public URL shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HtmlExtensionStyle {
    /// Keep the `.html` extension.
    #[default]
    Default,
    /// Drop the `.html` extension (`index.html` becomes a trailing slash).
    Drop,
    /// Replace the page basename with a directory (`page/` form).
    Indexify,
}

/// Branch or tag reference patterns.
///
/// Accepts either a comma-separated string or a list of strings. The literal
/// values `HEAD` and `.` resolve to the repository's current branch.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Patterns {
    /// A single pattern, or several separated by commas.
    Csv(String),
    /// An explicit list of patterns.
    List(Vec<String>),
}

impl Patterns {
    /// Expand into individual pattern strings.
    #[must_use]
    pub fn resolve(&self) -> Vec<String> {
        match self {
            Self::Csv(s) => s
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_owned)
                .collect(),
            Self::List(list) => list
                .iter()
                .map(|s| s.trim())
                .filter(|p| !p.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// A content source: one git repository contributing component versions.
#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    /// Repository URL or local path.
    pub url: String,
    /// Branch patterns for this source (falls back to `content.branches`).
    #[serde(default)]
    pub branches: Option<Patterns>,
    /// Tag patterns for this source (falls back to `content.tags`).
    #[serde(default)]
    pub tags: Option<Patterns>,
    /// Path within the repository where the component root lives.
    #[serde(default)]
    pub start_path: Option<String>,
    /// Remote name to fetch from.
    #[serde(default)]
    pub remote: Option<String>,
}

impl Source {
    /// The start path with surrounding slashes trimmed ("" for repo root).
    #[must_use]
    pub fn start_path(&self) -> &str {
        self.start_path
            .as_deref()
            .map_or("", |p| p.trim_matches('/'))
    }
}

/// Site-level settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Site title.
    pub title: Option<String>,
    /// Absolute base URL of the published site.
    pub url: Option<String>,
    /// Contextual page spec of the site start page.
    pub start_page: Option<String>,
    /// Opaque service keys passed through to the UI model.
    pub keys: BTreeMap<String, String>,
}

/// URL policy settings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct UrlSettings {
    /// How published page URLs treat the `.html` extension.
    pub html_extension_style: HtmlExtensionStyle,
}

/// Content aggregation settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    /// Content sources, in declaration order.
    pub sources: Vec<Source>,
    /// Default branch patterns for sources that don't set their own.
    pub branches: Option<Patterns>,
    /// Default tag patterns for sources that don't set their own.
    pub tags: Option<Patterns>,
}

/// Runtime settings as parsed from TOML (paths as strings).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RuntimeSettingsRaw {
    cache_dir: Option<String>,
    pull: Option<bool>,
    quiet: Option<bool>,
    silent: Option<bool>,
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    /// Directory for bare-clone caches of remote sources.
    pub cache_dir: PathBuf,
    /// Fetch updates for previously cached remote sources.
    pub pull: bool,
    /// Suppress progress display.
    pub quiet: bool,
    /// Suppress all terminal output (implies quiet).
    pub silent: bool,
}

impl RuntimeSettings {
    /// Whether the fetch progress display should be suppressed.
    #[must_use]
    pub fn suppress_progress(&self) -> bool {
        self.quiet || self.silent
    }
}

/// UI output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Directory under the site root where UI assets are published.
    pub output_dir: String,
    /// Layout applied to pages that don't select one.
    pub default_layout: Option<String>,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            output_dir: "_".to_owned(),
            default_layout: None,
        }
    }
}

/// AsciiDoc processor settings passed through to the markup adapter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AsciidocSettings {
    /// Global document attributes.
    pub attributes: BTreeMap<String, String>,
    /// Extension script paths (opaque to the core pipeline).
    pub extensions: Vec<PathBuf>,
}

/// Raw playbook as parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PlaybookFile {
    site: SiteSettings,
    urls: UrlSettings,
    content: ContentSettings,
    runtime: RuntimeSettingsRaw,
    ui: UiSettings,
    asciidoc: AsciidocSettings,
}

/// The frozen playbook record consumed by the pipeline.
#[derive(Debug, Clone)]
pub struct Playbook {
    /// Site-level settings.
    pub site: SiteSettings,
    /// URL policy.
    pub urls: UrlSettings,
    /// Content sources and default ref patterns.
    pub content: ContentSettings,
    /// Runtime settings with resolved paths.
    pub runtime: RuntimeSettings,
    /// UI output settings.
    pub ui: UiSettings,
    /// AsciiDoc settings.
    pub asciidoc: AsciidocSettings,
    /// Base directory of the playbook file.
    pub dir: PathBuf,
}

impl Playbook {
    /// Load a playbook with optional CLI settings.
    ///
    /// If `path` is provided, loads from that file. Otherwise searches for
    /// `tome.toml` in the current directory and its parents.
    ///
    /// CLI settings are applied after loading and path resolution, so CLI
    /// arguments take precedence over playbook values.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `path` doesn't exist, the TOML is
    /// malformed, or validation fails.
    pub fn load(
        path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, PlaybookError> {
        let file = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(PlaybookError::NotFound(p.to_path_buf()));
                }
                p.to_path_buf()
            }
            None => Self::discover().ok_or_else(|| {
                PlaybookError::Validation(format!("no {PLAYBOOK_FILENAME} found"))
            })?,
        };

        let content = std::fs::read_to_string(&file)?;
        let dir = file
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let mut playbook = Self::from_toml(&content, &dir)?;

        if let Some(settings) = cli_settings {
            playbook.apply_cli_settings(settings);
        }

        playbook.validate()?;
        Ok(playbook)
    }

    /// Parse a playbook from TOML text, resolving paths against `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn from_toml(content: &str, dir: &Path) -> Result<Self, PlaybookError> {
        let raw: PlaybookFile = toml::from_str(content)?;

        let cache_dir = match raw.runtime.cache_dir {
            Some(ref custom) => resolve_path(dir, custom),
            None => default_cache_dir(dir),
        };

        Ok(Self {
            site: raw.site,
            urls: raw.urls,
            content: raw.content,
            runtime: RuntimeSettings {
                cache_dir,
                pull: raw.runtime.pull.unwrap_or(false),
                quiet: raw.runtime.quiet.unwrap_or(false),
                silent: raw.runtime.silent.unwrap_or(false),
            },
            ui: raw.ui,
            asciidoc: raw.asciidoc,
            dir: dir.to_path_buf(),
        })
    }

    /// Apply CLI settings to the playbook.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(pull) = settings.pull {
            self.runtime.pull = pull;
        }
        if let Some(quiet) = settings.quiet {
            self.runtime.quiet = quiet;
        }
        if let Some(silent) = settings.silent {
            self.runtime.silent = silent;
        }
        if let Some(cache_dir) = &settings.cache_dir {
            self.runtime.cache_dir.clone_from(cache_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.ui.output_dir.clone_from(output_dir);
        }
    }

    /// Validate the playbook.
    fn validate(&self) -> Result<(), PlaybookError> {
        for (i, source) in self.content.sources.iter().enumerate() {
            if source.url.trim().is_empty() {
                return Err(PlaybookError::Validation(format!(
                    "content.sources[{i}].url cannot be empty"
                )));
            }
        }
        if self.ui.output_dir.trim().is_empty() {
            return Err(PlaybookError::Validation(
                "ui.output_dir cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Search for the playbook file in the current directory and parents.
    fn discover() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(PLAYBOOK_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Effective branch patterns for a source.
    #[must_use]
    pub fn branch_patterns(&self, source: &Source) -> Vec<String> {
        source
            .branches
            .as_ref()
            .or(self.content.branches.as_ref())
            .map_or_else(|| vec!["HEAD".to_owned()], Patterns::resolve)
    }

    /// Effective tag patterns for a source.
    #[must_use]
    pub fn tag_patterns(&self, source: &Source) -> Vec<String> {
        source
            .tags
            .as_ref()
            .or(self.content.tags.as_ref())
            .map_or_else(Vec::new, Patterns::resolve)
    }
}

/// Resolve a possibly-relative path string against a base directory.
fn resolve_path(base: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Default cache directory for a playbook directory.
///
/// `TOME_ENV=test` selects an alternate suffix so test runs never collide
/// with a developer's real cache.
fn default_cache_dir(dir: &Path) -> PathBuf {
    let name = match std::env::var("TOME_ENV") {
        Ok(ref env) if env == "test" => "tome-test",
        _ => "tome",
    };
    dir.join(CACHE_DIR_NAME).join(name)
}
