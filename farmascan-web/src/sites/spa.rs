//! React/SPA catalog dialect (Boticas y Salud).
//!
//! The storefront renders everything client-side and its class names are
//! build artifacts, so candidates are anchors whose href looks like a
//! product path; the card is the nearest `product`-classed div around the
//! anchor, or the anchor itself when the markup is flat.

use crate::extract::{
    ancestor_card, clean_name, element_text, find_by_class, first_image_src, resolve_link,
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

struct SpaRules {
    anchors: Selector,
    product_path: Regex,
    card_class: Regex,
    name_class: Regex,
    regular_class: Regex,
    offer_class: Regex,
}

fn rules() -> &'static SpaRules {
    static RULES: OnceLock<SpaRules> = OnceLock::new();
    RULES.get_or_init(|| SpaRules {
        anchors: static_selector("a[href]"),
        product_path: static_pattern("/tienda/productos/"),
        card_class: static_pattern("product"),
        name_class: static_pattern("product-card__name|product__name"),
        regular_class: static_pattern("(?i)price-original|old-price|list-price"),
        offer_class: static_pattern("price|precio"),
    })
}

pub(crate) fn parse(spec: &SiteSpec, html: &str, max_items: usize) -> Vec<ProductRecord> {
    let r = rules();
    let doc = Html::parse_document(html);
    let base = spec.base();

    let anchors: Vec<_> = doc
        .select(&r.anchors)
        .filter(|a| {
            a.value()
                .attr("href")
                .map(|href| r.product_path.is_match(href))
                .unwrap_or(false)
        })
        .collect();
    debug!(
        target: "web.site",
        site = %spec.pharmacy,
        candidates = anchors.len(),
        "candidate elements detected"
    );

    let mut seen_links = HashSet::new();
    let mut records = Vec::new();
    for anchor in anchors {
        if let Some(record) = extract_card(r, spec, &base, anchor, &mut seen_links) {
            records.push(record);
            if records.len() >= max_items {
                break;
            }
        }
    }
    records
}

fn extract_card(
    r: &SpaRules,
    spec: &SiteSpec,
    base: &Url,
    anchor: ElementRef<'_>,
    seen_links: &mut HashSet<String>,
) -> Option<ProductRecord> {
    let link = resolve_link(base, anchor.value().attr("href")?)?;
    if !seen_links.insert(link.clone()) {
        return None;
    }

    let card = ancestor_card(anchor, "div", Some(&r.card_class));

    let mut name = find_by_class(card, &["div"], &r.name_class)
        .map(element_text)
        .unwrap_or_default();
    if name.is_empty() {
        name = element_text(anchor);
    }
    let name = clean_name(&name)?;

    let image_url = first_image_src(card, base);

    let regular = find_by_class(card, &["div"], &r.regular_class)
        .map(|el| normalize_price(&element_text(el)))
        .unwrap_or_else(|| SENTINEL.to_string());

    let mut offer = SENTINEL.to_string();
    if let Some(el) = find_by_class(card, &["div"], &r.offer_class) {
        let mut text = element_text(el);
        if regular != SENTINEL {
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
