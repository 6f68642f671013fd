//! Line-oriented extraction of document structure.
//!
//! Extracts exactly what the pipeline consumes from a source document: the
//! document title (`= Title`), header attributes (`:name: value`), and
//! top-level unordered lists with their nesting. Everything else is
//! ignored.

use std::collections::BTreeMap;

/// An item of an unordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Raw inline content of the item.
    pub content: String,
    /// Nested items.
    pub children: Vec<ListItem>,
}

/// A top-level unordered list block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListBlock {
    /// Block title (`.Title` line preceding the list), if any.
    pub title: Option<String>,
    /// Top-level items.
    pub items: Vec<ListItem>,
}

/// The slice of a parsed document the pipeline consumes.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    /// Document title from the `= Title` header line.
    pub title: Option<String>,
    /// Header attributes, name to value.
    pub attributes: BTreeMap<String, String>,
    /// Top-level unordered lists, in document order.
    pub lists: Vec<ListBlock>,
}

/// Parse a source document.
#[must_use]
pub fn parse_document(source: &str) -> ParsedDocument {
    let mut doc = ParsedDocument::default();
    let mut lines = source.lines().peekable();

    // Header: title line, then attribute lines, terminated by a blank line.
    while let Some(&line) = lines.peek() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            lines.next();
            continue;
        }
        if let Some(title) = trimmed.strip_prefix("= ") {
            doc.title = Some(title.trim().to_owned());
            lines.next();
            parse_header_attributes(&mut lines, &mut doc.attributes);
        }
        break;
    }

    // Body: collect unordered list blocks.
    let mut pending_title: Option<String> = None;
    let mut current: Option<ListBlock> = None;
    // Stack of (depth, index path) while building nested items.
    let mut stack: Vec<usize> = Vec::new();

    for line in lines {
        let trimmed = line.trim_end();

        if let Some((depth, content)) = parse_list_line(trimmed) {
            let block = current.get_or_insert_with(|| ListBlock {
                title: pending_title.take(),
                items: Vec::new(),
            });
            push_item(block, &mut stack, depth, content);
            continue;
        }

        // Any non-item line ends the current list.
        if let Some(block) = current.take() {
            doc.lists.push(block);
            stack.clear();
        }

        if let Some(title) = trimmed.strip_prefix('.') {
            // A block title attaches to the next list; two dots is a literal.
            if !title.is_empty() && !title.starts_with('.') {
                pending_title = Some(title.to_owned());
                continue;
            }
        }
        if !trimmed.is_empty() {
            pending_title = None;
        }
    }
    if let Some(block) = current.take() {
        doc.lists.push(block);
    }

    doc
}

/// Consume `:name: value` lines following the title.
fn parse_header_attributes<'a, I: Iterator<Item = &'a str>>(
    lines: &mut std::iter::Peekable<I>,
    attributes: &mut BTreeMap<String, String>,
) {
    while let Some(&line) = lines.peek() {
        let trimmed = line.trim_end();
        if trimmed.starts_with("//") {
            lines.next();
            continue;
        }
        let Some(rest) = trimmed.strip_prefix(':') else {
            break;
        };
        let Some((name, value)) = rest.split_once(':') else {
            break;
        };
        if name.is_empty() || name.contains(' ') {
            break;
        }
        attributes.insert(name.to_owned(), value.trim().to_owned());
        lines.next();
    }
}

/// Parse a list line into (depth, content).
fn parse_list_line(line: &str) -> Option<(usize, &str)> {
    let stripped = line.trim_start();
    let stars = stripped.bytes().take_while(|&b| b == b'*').count();
    if stars == 0 {
        return None;
    }
    let rest = &stripped[stars..];
    let content = rest.strip_prefix(' ')?.trim();
    if content.is_empty() {
        return None;
    }
    Some((stars, content))
}

/// Insert an item at the given depth, tracking the current chain.
fn push_item(block: &mut ListBlock, stack: &mut Vec<usize>, depth: usize, content: &str) {
    // Clamp runaway depth jumps to one level deeper than the current chain.
    let depth = depth.min(stack.len() + 1);
    stack.truncate(depth - 1);

    let mut items = &mut block.items;
    for &index in stack.iter() {
        items = &mut items[index].children;
    }
    items.push(ListItem {
        content: content.to_owned(),
        children: Vec::new(),
    });
    stack.push(items.len() - 1);
}
