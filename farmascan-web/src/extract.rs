//! Shared DOM helpers used by every dialect parser.

use farmascan_common::SENTINEL;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::OnceLock;
use url::Url;

/// Parse a CSS selector that is known valid at compile time.
pub(crate) fn static_selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Compile a pattern that is known valid at compile time.
pub(crate) fn static_pattern(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern")
}

/// Collapse whitespace runs to single spaces and trim.
pub(crate) fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Concatenated text content of an element, whitespace-collapsed.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

/// Cleaned candidate name, or `None` when fewer than 3 characters remain.
pub(crate) fn clean_name(raw: &str) -> Option<String> {
    let cleaned = collapse_whitespace(raw);
    if cleaned.chars().count() < 3 {
        None
    } else {
        Some(cleaned)
    }
}

/// Whether the element's `class` attribute matches `pattern`.
pub(crate) fn class_matches(el: ElementRef<'_>, pattern: &Regex) -> bool {
    el.value()
        .attr("class")
        .map(|classes| pattern.is_match(classes))
        .unwrap_or(false)
}

/// First descendant, in document order, whose tag is one of `tags` (empty
/// slice = any tag) and whose class matches `pattern`. The root itself is
/// not considered.
pub(crate) fn find_by_class<'a>(
    root: ElementRef<'a>,
    tags: &[&str],
    pattern: &Regex,
) -> Option<ElementRef<'a>> {
    root.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| {
            (tags.is_empty() || tags.contains(&el.value().name())) && class_matches(*el, pattern)
        })
}

/// Nearest ancestor with the given tag (and class pattern, when one is
/// given), falling back to the anchor itself. SPA and VTEX catalogs wrap
/// product anchors in cards this way.
pub(crate) fn ancestor_card<'a>(
    anchor: ElementRef<'a>,
    tag: &str,
    class_pattern: Option<&Regex>,
) -> ElementRef<'a> {
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| {
            el.value().name() == tag
                && class_pattern
                    .map(|pattern| class_matches(*el, pattern))
                    .unwrap_or(true)
        })
        .unwrap_or(anchor)
}

/// Resolve `href` against the site base. Rejects empty hrefs, unparsable
/// URLs, and anything shorter than the base plus a minimal product path.
pub(crate) fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let resolved = base.join(href).ok()?.to_string();
    if resolved.len() < base.as_str().len() + 5 {
        return None;
    }
    Some(resolved)
}

/// First `img[src]` under `root`, resolved to absolute; sentinel if absent.
pub(crate) fn first_image_src(root: ElementRef<'_>, base: &Url) -> String {
    static IMG: OnceLock<Selector> = OnceLock::new();
    let img = IMG.get_or_init(|| static_selector("img[src]"));
    root.select(img)
        .next()
        .and_then(|el| el.value().attr("src"))
        .and_then(|src| base.join(src.trim()).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| SENTINEL.to_string())
}

/// First text node under `root` carrying an `S/`-prefixed amount. Last
/// resort for price extraction when no class pattern matched.
pub(crate) fn text_node_price(root: ElementRef<'_>) -> Option<String> {
    static PRICE_TEXT: OnceLock<Regex> = OnceLock::new();
    let pattern = PRICE_TEXT.get_or_init(|| static_pattern(r"S/\s*[\d,\.]+"));
    root.text()
        .find(|text| pattern.is_match(text))
        .map(|text| text.trim().to_string())
}
