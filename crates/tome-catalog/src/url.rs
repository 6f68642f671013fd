//! Output path and publish URL computation.
//!
//! Both computations are pure functions over a file's identity tuple and the
//! site's extension style. The version literal `master` and the module
//! literal `ROOT` are omitted from paths and URLs.

use tome_playbook::HtmlExtensionStyle;

use crate::file::{
    Family, FileOut, FilePub, FileSrc, MASTER_VERSION, SOURCE_MARKUP_MEDIA_TYPE,
};
use crate::page_id::ROOT_MODULE;

/// Output file name of converted pages.
const INDEX_BASENAME: &str = "index.html";

/// Compute the output location of a file.
#[must_use]
pub fn compute_out(
    src: &FileSrc,
    acting_family: Family,
    style: HtmlExtensionStyle,
) -> FileOut {
    let version = if src.version == MASTER_VERSION {
        ""
    } else {
        src.version.as_str()
    };
    let module = if src.module == ROOT_MODULE {
        ""
    } else {
        src.module.as_str()
    };

    let converted = src.media_type == Some(SOURCE_MARKUP_MEDIA_TYPE);
    let mut basename = if converted {
        format!("{}.html", src.stem)
    } else {
        src.basename.clone()
    };

    // Indexify turns page.html into page/index.html.
    let mut indexify_segment = "";
    if acting_family == Family::Page
        && src.stem != "index"
        && style == HtmlExtensionStyle::Indexify
    {
        indexify_segment = src.stem.as_str();
        basename = INDEX_BASENAME.to_owned();
    }

    let family_segment = match acting_family {
        Family::Image => "_images",
        Family::Attachment => "_attachments",
        _ => "",
    };

    let module_path = join_segments(&[src.component.as_str(), version, module]);
    let relative_dir = src.relative.rsplit_once('/').map_or("", |(dir, _)| dir);
    let dirname = join_segments(&[
        module_path.as_str(),
        family_segment,
        relative_dir,
        indexify_segment,
    ]);
    let path = join_segments(&[dirname.as_str(), basename.as_str()]);

    let module_root_path = relative_dirs(&dirname, &module_path);
    let root_path = relative_dirs(&dirname, "");

    FileOut {
        dirname,
        basename,
        path,
        module_root_path,
        root_path,
    }
}

/// Compute the publish metadata of a file.
///
/// For an alias (which stores no `out`), a transient output location is
/// derived internally so the URL shape matches its acting family.
#[must_use]
pub fn compute_pub(
    src: &FileSrc,
    out: Option<&FileOut>,
    acting_family: Family,
    style: HtmlExtensionStyle,
) -> FilePub {
    if src.family == Family::Navigation {
        let version = if src.version == MASTER_VERSION {
            ""
        } else {
            src.version.as_str()
        };
        let module = if src.module == ROOT_MODULE {
            ""
        } else {
            src.module.as_str()
        };
        let path = join_segments(&[src.component.as_str(), version, module]);
        return FilePub {
            url: format!("/{path}/"),
            module_root_path: Some(".".to_owned()),
            root_path: None,
            canonical_url: None,
        };
    }

    let transient;
    let effective_out = match out {
        Some(out) => out,
        None => {
            transient = compute_out(src, acting_family, style);
            &transient
        }
    };

    let url = if acting_family == Family::Page {
        let mut segments: Vec<&str> = effective_out.path.split('/').collect();
        let last = segments.last_mut().expect("split yields at least one segment");
        match style {
            HtmlExtensionStyle::Default => {}
            HtmlExtensionStyle::Drop => {
                *last = if *last == INDEX_BASENAME {
                    ""
                } else {
                    last.strip_suffix(".html").unwrap_or(last)
                };
            }
            HtmlExtensionStyle::Indexify => *last = "",
        }
        format!("/{}", segments.join("/"))
    } else {
        format!("/{}", effective_out.path)
    };

    FilePub {
        url,
        module_root_path: out.map(|o| o.module_root_path.clone()),
        root_path: out.map(|o| o.root_path.clone()),
        canonical_url: None,
    }
}

/// Compute a link from a page's output directory to a site-absolute URL.
///
/// Used by the cross-reference resolver when relative links are requested.
/// A trailing slash on the target URL is preserved.
#[must_use]
pub fn relativize_url(from_dirname: &str, to_url: &str) -> String {
    let to = to_url.trim_start_matches('/');
    let trailing_slash = to.ends_with('/');

    let from_segments: Vec<&str> = from_dirname.split('/').filter(|s| !s.is_empty()).collect();
    let to_segments: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let common = from_segments
        .iter()
        .zip(&to_segments)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = "../".repeat(from_segments.len() - common);
    let downs = to_segments[common..].join("/");

    let mut result = format!("{ups}{downs}");
    if result.is_empty() {
        return "./".to_owned();
    }
    if trailing_slash {
        result.push('/');
    }
    result
}

/// Join path segments, eliding empty ones.
fn join_segments(segments: &[&str]) -> String {
    segments
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}

/// Relative hops from one directory to an ancestor directory, or `"."`.
fn relative_dirs(from: &str, to: &str) -> String {
    let from_segments: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_segments: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let common = from_segments
        .iter()
        .zip(&to_segments)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from_segments.len() - common];
    parts.extend(&to_segments[common..]);

    if parts.is_empty() {
        ".".to_owned()
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_src(component: &str, version: &str, module: &str, relative: &str) -> FileSrc {
        FileSrc::new(component, version, module, Family::Page, relative)
    }

    // ── extension styles ─────────────────────────────────────────────

    #[test]
    fn test_default_style() {
        let src = page_src("docs", "1.0", "ROOT", "intro.adoc");
        let out = compute_out(&src, Family::Page, HtmlExtensionStyle::Default);
        assert_eq!(out.path, "docs/1.0/intro.html");
        assert_eq!(out.dirname, "docs/1.0");
        assert_eq!(out.basename, "intro.html");

        let publish = compute_pub(&src, Some(&out), Family::Page, HtmlExtensionStyle::Default);
        assert_eq!(publish.url, "/docs/1.0/intro.html");
    }

    #[test]
    fn test_drop_style() {
        let src = page_src("docs", "1.0", "ROOT", "intro.adoc");
        let out = compute_out(&src, Family::Page, HtmlExtensionStyle::Drop);
        let publish = compute_pub(&src, Some(&out), Family::Page, HtmlExtensionStyle::Drop);
        assert_eq!(publish.url, "/docs/1.0/intro");
    }

    #[test]
    fn test_indexify_style() {
        let src = page_src("docs", "1.0", "ROOT", "intro.adoc");
        let out = compute_out(&src, Family::Page, HtmlExtensionStyle::Indexify);
        assert_eq!(out.path, "docs/1.0/intro/index.html");

        let publish = compute_pub(&src, Some(&out), Family::Page, HtmlExtensionStyle::Indexify);
        assert_eq!(publish.url, "/docs/1.0/intro/");
    }

    #[test]
    fn test_indexify_keeps_index_pages_in_place() {
        let src = page_src("docs", "1.0", "ROOT", "index.adoc");
        let out = compute_out(&src, Family::Page, HtmlExtensionStyle::Indexify);
        assert_eq!(out.path, "docs/1.0/index.html");
        assert_eq!(out.basename, "index.html");
    }

    // ── root conventions ─────────────────────────────────────────────

    #[test]
    fn test_master_version_and_root_module_elided() {
        let src = page_src("docs", "master", "ROOT", "index.adoc");
        let out = compute_out(&src, Family::Page, HtmlExtensionStyle::Default);
        assert_eq!(out.path, "docs/index.html");

        let publish = compute_pub(&src, Some(&out), Family::Page, HtmlExtensionStyle::Default);
        assert_eq!(publish.url, "/docs/index.html");
    }

    #[test]
    fn test_drop_style_index_becomes_trailing_slash() {
        let src = page_src("docs", "master", "ROOT", "index.adoc");
        let out = compute_out(&src, Family::Page, HtmlExtensionStyle::Drop);
        let publish = compute_pub(&src, Some(&out), Family::Page, HtmlExtensionStyle::Drop);
        assert_eq!(publish.url, "/docs/");
    }

    // ── non-page families ────────────────────────────────────────────

    #[test]
    fn test_image_family_segment() {
        let src = FileSrc::new("docs", "1.0", "ui", Family::Image, "logo.png");
        let out = compute_out(&src, Family::Image, HtmlExtensionStyle::Default);
        assert_eq!(out.path, "docs/1.0/ui/_images/logo.png");

        let publish = compute_pub(&src, Some(&out), Family::Image, HtmlExtensionStyle::Default);
        assert_eq!(publish.url, "/docs/1.0/ui/_images/logo.png");
    }

    #[test]
    fn test_attachment_family_segment() {
        let src = FileSrc::new("docs", "2.0", "ROOT", Family::Attachment, "kit/sdk.zip");
        let out = compute_out(&src, Family::Attachment, HtmlExtensionStyle::Default);
        assert_eq!(out.path, "docs/2.0/_attachments/kit/sdk.zip");
    }

    #[test]
    fn test_navigation_synthetic_url() {
        let src = FileSrc::new("docs", "master", "ROOT", Family::Navigation, "nav.adoc");
        let publish = compute_pub(&src, None, Family::Navigation, HtmlExtensionStyle::Default);
        assert_eq!(publish.url, "/docs/");
        assert_eq!(publish.module_root_path.as_deref(), Some("."));
    }

    #[test]
    fn test_navigation_url_keeps_named_version_and_module() {
        let src = FileSrc::new("docs", "2.0", "admin", Family::Navigation, "nav.adoc");
        let publish = compute_pub(&src, None, Family::Navigation, HtmlExtensionStyle::Default);
        assert_eq!(publish.url, "/docs/2.0/admin/");
    }

    // ── relative paths ───────────────────────────────────────────────

    #[test]
    fn test_out_relative_paths() {
        let src = page_src("docs", "1.0", "admin", "topic/page.adoc");
        let out = compute_out(&src, Family::Page, HtmlExtensionStyle::Default);
        assert_eq!(out.dirname, "docs/1.0/admin/topic");
        assert_eq!(out.module_root_path, "..");
        assert_eq!(out.root_path, "../../../..");
    }

    #[test]
    fn test_out_relative_paths_at_module_root() {
        let src = page_src("docs", "1.0", "ROOT", "page.adoc");
        let out = compute_out(&src, Family::Page, HtmlExtensionStyle::Default);
        assert_eq!(out.module_root_path, ".");
        assert_eq!(out.root_path, "../..");
    }

    #[test]
    fn test_path_join_consistency() {
        let src = page_src("docs", "1.0", "admin", "topic/page.adoc");
        for style in [
            HtmlExtensionStyle::Default,
            HtmlExtensionStyle::Drop,
            HtmlExtensionStyle::Indexify,
        ] {
            let out = compute_out(&src, Family::Page, style);
            assert_eq!(format!("{}/{}", out.dirname, out.basename), out.path);
        }
    }

    // ── alias (transient out) ────────────────────────────────────────

    #[test]
    fn test_pub_without_out_derives_transient_location() {
        let src = FileSrc::new("docs", "2.0", "ROOT", Family::Alias, "old-intro.adoc");
        let publish = compute_pub(&src, None, Family::Page, HtmlExtensionStyle::Default);
        assert_eq!(publish.url, "/docs/2.0/old-intro.html");
        assert!(publish.module_root_path.is_none());
    }

    // ── relativize ───────────────────────────────────────────────────

    #[test]
    fn test_relativize_url_sibling() {
        assert_eq!(relativize_url("docs/1.0", "/docs/1.0/other.html"), "other.html");
    }

    #[test]
    fn test_relativize_url_across_modules() {
        assert_eq!(
            relativize_url("docs/1.0/admin", "/docs/1.0/user/intro.html"),
            "../user/intro.html"
        );
    }

    #[test]
    fn test_relativize_url_preserves_trailing_slash() {
        assert_eq!(
            relativize_url("docs/1.0", "/docs/2.0/intro/"),
            "../2.0/intro/"
        );
    }

    #[test]
    fn test_relativize_url_same_directory() {
        assert_eq!(relativize_url("docs/1.0", "/docs/1.0/"), "./");
    }
}
