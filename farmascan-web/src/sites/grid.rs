//! Generic card-grid dialect (Inkafarma, Mifarma).
//!
//! Neither storefront exposes a stable single selector for product cards, so
//! candidates come from a union of patterns: test-id attributes, `product`
//! class substrings, and product-path anchors. Several patterns routinely
//! hit the same element, hence the node-identity dedup.

use crate::extract::{
    class_matches, clean_name, element_text, find_by_class, first_image_src, resolve_link,
    static_pattern, static_selector, text_node_price,
};
use crate::price::{normalize_price, reconcile_prices};
use crate::sites::SiteSpec;
use farmascan_common::{ProductRecord, SENTINEL};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

struct GridRules {
    cards: Vec<Selector>,
    anchor: Selector,
    headings: Selector,
    name_class: Regex,
    regular_class: Regex,
    offer_class: Regex,
}

fn rules() -> &'static GridRules {
    static RULES: OnceLock<GridRules> = OnceLock::new();
    RULES.get_or_init(|| GridRules {
        cards: [
            r#"div[data-testid="product-card"]"#,
            r#"article[class*="product"]"#,
            "div.product-card",
            "div.product-item",
            r#"div[class*="ProductCard"]"#,
            "li.product",
            r#"a[href*="/producto/"]"#,
            r#"a[href*="/p/"]"#,
        ]
        .iter()
        .map(|css| static_selector(css))
        .collect(),
        anchor: static_selector("a[href]"),
        headings: static_selector("h1, h2, h3, h4"),
        name_class: static_pattern("(?i)name|title"),
        regular_class: static_pattern("(?i)old|original|list-price|line-through"),
        offer_class: static_pattern("(?i)price|precio"),
    })
}

pub(crate) fn parse(spec: &SiteSpec, html: &str, max_items: usize) -> Vec<ProductRecord> {
    let r = rules();
    let doc = Html::parse_document(html);
    let base = spec.base();

    let mut seen_nodes = HashSet::new();
    let mut cards = Vec::new();
    for selector in &r.cards {
        for el in doc.select(selector) {
            if seen_nodes.insert(el.id()) {
                cards.push(el);
            }
        }
    }
    debug!(
        target: "web.site",
        site = %spec.pharmacy,
        candidates = cards.len(),
        "candidate elements detected"
    );

    let mut seen_links = HashSet::new();
    let mut records = Vec::new();
    for card in cards {
        if let Some(record) = extract_card(r, spec, &base, card, &mut seen_links) {
            records.push(record);
            if records.len() >= max_items {
                break;
            }
        }
    }
    records
}

fn extract_card(
    r: &GridRules,
    spec: &SiteSpec,
    base: &Url,
    card: ElementRef<'_>,
    seen_links: &mut HashSet<String>,
) -> Option<ProductRecord> {
    let link_el = if card.value().name() == "a" {
        card
    } else {
        card.select(&r.anchor).next()?
    };
    let link = resolve_link(base, link_el.value().attr("href")?)?;
    if !seen_links.insert(link.clone()) {
        return None;
    }

    let mut name = card
        .select(&r.headings)
        .find(|el| class_matches(*el, &r.name_class))
        .map(element_text)
        .unwrap_or_default();
    if name.chars().count() < 3 {
        name = element_text(link_el);
    }
    let name = clean_name(&name)?;

    let image_url = first_image_src(card, base);

    let regular = find_by_class(card, &[], &r.regular_class)
        .map(|el| normalize_price(&element_text(el)))
        .unwrap_or_else(|| SENTINEL.to_string());

    let mut offer = SENTINEL.to_string();
    if let Some(el) = find_by_class(card, &[], &r.offer_class) {
        let mut text = element_text(el);
        if regular != SENTINEL {
            // The struck-through price often nests inside the same container.
            text = text.replace(regular.trim_start_matches("S/ "), "");
        }
        offer = normalize_price(&text);
    }
    if offer == SENTINEL {
        if let Some(loose) = text_node_price(card) {
            offer = normalize_price(&loose);
        }
    }
    let (offer_price, regular_price) = reconcile_prices(offer, regular);

    Some(ProductRecord {
        name,
        offer_price,
        regular_price,
        image_url,
        link,
        pharmacy: spec.pharmacy,
    })
}
