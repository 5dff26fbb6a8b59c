//! HTML extraction for indexing and frontier expansion
//!
//! This module turns fetched HTML into the two things the engine needs:
//! - the plain text body pushed to the search index
//! - the set of same-site links that re-enter the frontier
//!
//! Link normalization is deliberately textual and lossy: an href containing a
//! `../` marker keeps only the remainder after the first marker, so multiple
//! parent-path segments are not fully resolved. That is a known limitation of
//! the normalization scheme, kept as-is rather than silently repaired.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Elements whose text never reaches the index
const SKIPPED_ELEMENTS: [&str; 4] = ["title", "script", "style", "meta"];

/// Extracted content of one fetched page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// Plain text body, tag-free, whitespace-collapsed
    pub text: String,

    /// Normalized same-site links discovered on the page
    pub links: HashSet<String>,
}

/// Parses HTML and extracts both the indexable text and the link set
///
/// # Arguments
///
/// * `html` - Raw HTML of the fetched page
/// * `root` - The owning root URL of the crawl job
pub fn extract(html: &str, root: &str) -> ExtractedPage {
    let document = Html::parse_document(html);

    ExtractedPage {
        text: text_of(&document),
        links: links_of(&document, root),
    }
}

/// Extracts just the indexable plain text from HTML
pub fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    text_of(&document)
}

/// Extracts just the normalized same-site link set from HTML
pub fn extract_links(html: &str, root: &str) -> HashSet<String> {
    let document = Html::parse_document(html);
    links_of(&document, root)
}

fn text_of(document: &Html) -> String {
    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);
    collapse_whitespace(&raw)
}

/// Walks the document tree collecting text nodes, skipping everything under
/// title/script/style/meta elements
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    if SKIPPED_ELEMENTS.contains(&element.value().name()) {
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text.text),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}

/// Collapses every run of whitespace to a single space and trims the ends
fn collapse_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for ch in raw.chars() {
        if ch.is_whitespace() {
            pending_space = true;
        } else {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        }
    }

    out
}

fn links_of(document: &Html, root: &str) -> HashSet<String> {
    let mut links = HashSet::new();

    if let Ok(anchor_selector) = Selector::parse("a[href]") {
        for element in document.select(&anchor_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(link) = normalize_href(href, root) {
                    links.insert(link);
                }
            }
        }
    }

    links
}

/// Applies the link normalization rules for one href
///
/// Returns None for cross-site links (absolute URLs that do not contain the
/// root), which are out of scope for the traversal.
fn normalize_href(href: &str, root: &str) -> Option<String> {
    let mut href = href;

    // Fragments never distinguish documents
    if let Some(pos) = href.find('#') {
        href = &href[..pos];
    }

    // Keep only the remainder after the first parent-path marker
    if let Some(pos) = href.find("../") {
        href = &href[pos + 3..];
    }

    if href.contains(root) {
        Some(href.to_string())
    } else if href.contains("http://") || href.contains("https://") {
        None
    } else {
        Some(format!("{}/{}", root, href))
    }
}
