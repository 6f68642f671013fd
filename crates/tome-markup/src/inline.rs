//! Inline content conversion.
//!
//! Converts the inline slice of a document (list item content, mainly) to
//! HTML, resolving `xref:` macros through the page-reference hook. Resolved
//! page references carry the `page` role on their anchor; unresolved ones
//! keep the raw target as their text so authors can spot them in output.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use tome_catalog::{File, PageRefTarget};

use crate::hooks::ResolvePageRef;

/// Role class marking an anchor as an internal page reference.
pub const PAGE_REF_ROLE: &str = "page";

static INLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"xref:(?P<xref>[^\s\[\]]+)\[(?P<xref_text>[^\]]*)\]",
        r"|(?P<url>https?://[^\s\[\]]+)\[(?P<url_text>[^\]]*)\]",
        r"|<<(?P<anchor>[^,>]+)(?:,(?P<anchor_text>[^>]+))?>>",
        r"|(?P<bare>https?://[^\s\[\]<>]+)",
    ))
    .unwrap()
});

/// Convert inline content to HTML, resolving page references.
#[must_use]
pub fn convert_inline(content: &str, from: &File, refs: &dyn ResolvePageRef) -> String {
    let mut html = String::with_capacity(content.len() + 32);
    let mut last = 0;

    for captures in INLINE_RE.captures_iter(content) {
        let whole = captures.get(0).expect("capture 0 always present");
        html.push_str(&escape_html(&content[last..whole.start()]));
        render_match(&mut html, &captures, from, refs);
        last = whole.end();
    }
    html.push_str(&escape_html(&content[last..]));
    html
}

fn render_match(
    html: &mut String,
    captures: &Captures<'_>,
    from: &File,
    refs: &dyn ResolvePageRef,
) {
    if let Some(target) = captures.name("xref") {
        let text = captures.name("xref_text").map_or("", |m| m.as_str());
        match refs.resolve_page_ref(target.as_str(), from) {
            PageRefTarget::Internal { url } => {
                let text = if text.is_empty() { target.as_str() } else { text };
                html.push_str(&format!(
                    "<a class=\"xref {PAGE_REF_ROLE}\" href=\"{}\">{}</a>",
                    escape_html(&url),
                    escape_html(text)
                ));
            }
            PageRefTarget::Unresolved { original } => {
                let text = if text.is_empty() { original.as_str() } else { text };
                html.push_str(&format!(
                    "<a class=\"xref unresolved\" href=\"#\">{}</a>",
                    escape_html(text)
                ));
            }
        }
    } else if let Some(url) = captures.name("url") {
        let text = captures.name("url_text").map_or("", |m| m.as_str());
        let text = if text.is_empty() { url.as_str() } else { text };
        html.push_str(&format!(
            "<a href=\"{}\">{}</a>",
            escape_html(url.as_str()),
            escape_html(text)
        ));
    } else if let Some(anchor) = captures.name("anchor") {
        let text = captures
            .name("anchor_text")
            .map_or(anchor.as_str(), |m| m.as_str());
        html.push_str(&format!(
            "<a href=\"#{}\">{}</a>",
            escape_html(anchor.as_str().trim()),
            escape_html(text.trim())
        ));
    } else if let Some(bare) = captures.name("bare") {
        html.push_str(&format!(
            "<a href=\"{0}\">{0}</a>",
            escape_html(bare.as_str())
        ));
    }
}

/// Escape text for HTML output.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
