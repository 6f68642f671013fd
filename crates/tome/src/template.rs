//! Built-in HTML layout.
//!
//! A deliberately small stand-in for a real UI bundle: it renders the
//! composed page model into a single-column HTML page with a navigation
//! sidebar, breadcrumbs, and a version menu. Anything fancier belongs in an
//! external layout engine behind the same [`LayoutRenderer`] seam.

use std::fmt::Write;

use tome_catalog::File;
use tome_composer::{LayoutRenderer, PageUiModel, SiteUiModel};
use tome_markup::{convert_inline, escape_html, parse_document, ResolvePageRef};
use tome_nav::NavItem;

/// The layouts shipped with the CLI.
pub(crate) fn builtin_layouts() -> Vec<String> {
    vec!["default".to_owned(), "404".to_owned()]
}

/// Built-in layout engine.
pub(crate) struct BasicLayout;

impl LayoutRenderer for BasicLayout {
    fn render(&self, layout: &str, site: &SiteUiModel, page: &PageUiModel, body: &str) -> Vec<u8> {
        let html = match layout {
            "404" => render_not_found(site, page),
            _ => render_default(site, page, body),
        };
        html.into_bytes()
    }
}

fn render_default(site: &SiteUiModel, page: &PageUiModel, body: &str) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let title = match (&page.title, &site.title) {
        (Some(page_title), Some(site_title)) => format!("{page_title} :: {site_title}"),
        (Some(page_title), None) => page_title.clone(),
        (None, Some(site_title)) => site_title.clone(),
        (None, None) => "Untitled".to_owned(),
    };
    let _ = writeln!(html, "<title>{}</title>", escape_html(&title));
    if let Some(canonical) = &page.canonical_url {
        let _ = writeln!(
            html,
            "<link rel=\"canonical\" href=\"{}\">",
            escape_html(canonical)
        );
    }
    let _ = writeln!(
        html,
        "<link rel=\"stylesheet\" href=\"{}/site.css\">",
        escape_html(&site.ui_url)
    );
    html.push_str("</head>\n<body>\n");

    render_navigation(&mut html, page);
    html.push_str("<main>\n");
    render_breadcrumbs(&mut html, page);
    render_version_menu(&mut html, page);
    html.push_str("<article>\n");
    html.push_str(body);
    html.push_str("</article>\n</main>\n</body>\n</html>\n");
    html
}

fn render_not_found(site: &SiteUiModel, page: &PageUiModel) -> String {
    let title = page.title.as_deref().unwrap_or("Page Not Found");
    let home = site.home_url.as_deref().unwrap_or("/");
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<h1>{}</h1>\n<p><a href=\"{}\">Return to the start page</a></p>\n</body>\n</html>\n",
        escape_html(title),
        escape_html(title),
        escape_html(home)
    )
}

fn render_navigation(html: &mut String, page: &PageUiModel) {
    if page.navigation.is_empty() {
        return;
    }
    html.push_str("<nav>\n");
    for tree in &page.navigation {
        if let Some(content) = &tree.content {
            let _ = writeln!(html, "<h3>{content}</h3>");
        }
        render_nav_items(html, &tree.items);
    }
    html.push_str("</nav>\n");
}

fn render_nav_items(html: &mut String, items: &[NavItem]) {
    if items.is_empty() {
        return;
    }
    html.push_str("<ul>\n");
    for item in items {
        html.push_str("<li>");
        match &item.url {
            Some(url) => {
                let _ = write!(
                    html,
                    "<a href=\"{}\">{}</a>",
                    escape_html(url),
                    escape_html(&item.content)
                );
            }
            None => html.push_str(&item.content),
        }
        render_nav_items(html, &item.items);
        html.push_str("</li>\n");
    }
    html.push_str("</ul>\n");
}

fn render_breadcrumbs(html: &mut String, page: &PageUiModel) {
    if page.breadcrumbs.is_empty() {
        return;
    }
    html.push_str("<nav class=\"breadcrumbs\"><ol>\n");
    for crumb in &page.breadcrumbs {
        match &crumb.url {
            Some(url) => {
                let _ = writeln!(
                    html,
                    "<li><a href=\"{}\">{}</a></li>",
                    escape_html(url),
                    escape_html(&crumb.content)
                );
            }
            None => {
                let _ = writeln!(html, "<li>{}</li>", escape_html(&crumb.content));
            }
        }
    }
    html.push_str("</ol></nav>\n");
}

fn render_version_menu(html: &mut String, page: &PageUiModel) {
    let Some(versions) = &page.versions else {
        return;
    };
    html.push_str("<div class=\"versions\"><ul>\n");
    for entry in versions {
        let class = if entry.missing { " class=\"missing\"" } else { "" };
        let _ = writeln!(
            html,
            "<li{class}><a href=\"{}\">{}</a></li>",
            escape_html(&entry.url),
            escape_html(&entry.version)
        );
    }
    html.push_str("</ul></div>\n");
}

/// Render a page body from its source.
///
/// The real markup engine is external; this covers the structures the
/// built-in layout needs (section headings, paragraphs, and lists) and
/// routes inline references through the resolver hooks.
pub(crate) fn render_body(source: &str, file: &File, refs: &dyn ResolvePageRef) -> String {
    let doc = parse_document(source);
    let mut html = String::with_capacity(source.len());

    if let Some(title) = &doc.title {
        let _ = writeln!(html, "<h1>{}</h1>", escape_html(title));
    }

    let mut in_header = doc.title.is_some();
    let mut in_list = false;
    let mut paragraph: Vec<&str> = Vec::new();

    for line in source.lines() {
        let trimmed = line.trim_end();

        if in_header {
            // Header runs to the first blank line.
            if trimmed.is_empty() {
                in_header = false;
            }
            continue;
        }

        if trimmed.is_empty() {
            flush_paragraph(&mut html, &mut paragraph, file, refs);
            close_list(&mut html, &mut in_list);
            continue;
        }

        if let Some(heading) = parse_heading(trimmed) {
            flush_paragraph(&mut html, &mut paragraph, file, refs);
            close_list(&mut html, &mut in_list);
            let (level, text) = heading;
            let _ = writeln!(
                html,
                "<h{level}>{}</h{level}>",
                convert_inline(text, file, refs)
            );
            continue;
        }

        if let Some(content) = parse_list_item(trimmed) {
            flush_paragraph(&mut html, &mut paragraph, file, refs);
            if !in_list {
                html.push_str("<ul>\n");
                in_list = true;
            }
            let _ = writeln!(html, "<li>{}</li>", convert_inline(content, file, refs));
            continue;
        }

        close_list(&mut html, &mut in_list);
        paragraph.push(trimmed);
    }
    flush_paragraph(&mut html, &mut paragraph, file, refs);
    close_list(&mut html, &mut in_list);

    html
}

fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|&b| b == b'=').count();
    if level < 2 || level > 6 {
        return None;
    }
    let text = line[level..].strip_prefix(' ')?;
    Some((level, text))
}

fn parse_list_item(line: &str) -> Option<&str> {
    let stripped = line.trim_start();
    let stars = stripped.bytes().take_while(|&b| b == b'*').count();
    if stars == 0 {
        return None;
    }
    stripped[stars..].strip_prefix(' ').map(str::trim)
}

fn flush_paragraph(
    html: &mut String,
    paragraph: &mut Vec<&str>,
    file: &File,
    refs: &dyn ResolvePageRef,
) {
    if paragraph.is_empty() {
        return;
    }
    let text = paragraph.join(" ");
    let _ = writeln!(html, "<p>{}</p>", convert_inline(&text, file, refs));
    paragraph.clear();
}

fn close_list(html: &mut String, in_list: &mut bool) {
    if *in_list {
        html.push_str("</ul>\n");
        *in_list = false;
    }
}

#[cfg(test)]
mod tests {
    use tome_catalog::{Family, FileSrc, PageRefTarget};

    use super::*;

    struct NoRefs;

    impl ResolvePageRef for NoRefs {
        fn resolve_page_ref(&self, refspec: &str, _from: &File) -> PageRefTarget {
            PageRefTarget::Unresolved {
                original: refspec.to_owned(),
            }
        }
    }

    fn page() -> File {
        File::new(
            "modules/ROOT/pages/index.adoc",
            Vec::new(),
            FileSrc::new("docs", "1.0", "ROOT", Family::Page, "index.adoc"),
        )
    }

    #[test]
    fn test_render_body_title_and_sections() {
        let html = render_body(
            "= Title\n:page-layout: default\n\nIntro paragraph.\n\n== Section\n\nMore text\nacross lines.\n",
            &page(),
            &NoRefs,
        );
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<h2>Section</h2>"));
        assert!(html.contains("<p>Intro paragraph.</p>"));
        assert!(html.contains("<p>More text across lines.</p>"));
        // Header attributes never leak into the body.
        assert!(!html.contains("page-layout"));
    }

    #[test]
    fn test_render_body_lists() {
        let html = render_body("* one\n* two\n\nafter\n", &page(), &NoRefs);
        assert!(html.contains("<ul>\n<li>one</li>\n<li>two</li>\n</ul>"));
        assert!(html.contains("<p>after</p>"));
    }
}
