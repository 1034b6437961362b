//! VTEX catalog dialect (Farmacia Universal).
//!
//! VTEX product URLs end in `/p` and cards are `article` elements. Prices
//! are split across `currencyInteger`/`currencyFraction` spans that have to
//! be stitched back together before normalization, and anchor text drags in
//! call-to-action filler (comprar/agregar/ver) that is stripped from names.

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

struct VtexRules {
    anchors: Selector,
    product_path: Regex,
    name_class: Regex,
    regular_class: Regex,
    integer_class: Regex,
    fraction_class: Regex,
    filler_words: Regex,
}

fn rules() -> &'static VtexRules {
    static RULES: OnceLock<VtexRules> = OnceLock::new();
    RULES.get_or_init(|| VtexRules {
        anchors: static_selector("a[href]"),
        product_path: static_pattern(r"/[^/]+/p$"),
        name_class: static_pattern("productBrand|productName"),
        regular_class: static_pattern("(?i)listPrice|list-price"),
        integer_class: static_pattern("currencyInteger"),
        fraction_class: static_pattern("currencyFraction"),
        filler_words: static_pattern(r"(?i)\b(comprar|agregar|ver)\b"),
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
    r: &VtexRules,
    spec: &SiteSpec,
    base: &Url,
    anchor: ElementRef<'_>,
    seen_links: &mut HashSet<String>,
) -> Option<ProductRecord> {
    let link = resolve_link(base, anchor.value().attr("href")?)?;
    if !seen_links.insert(link.clone()) {
        return None;
    }

    let card = ancestor_card(anchor, "article", None);

    let mut name = find_by_class(card, &["span"], &r.name_class)
        .map(element_text)
        .unwrap_or_default();
    if name.is_empty() {
        name = element_text(anchor);
    }
    let name = r.filler_words.replace_all(&name, "").into_owned();
    let name = clean_name(&name)?;

    let image_url = first_image_src(card, base);

    let regular = find_by_class(card, &["span"], &r.regular_class)
        .map(|el| normalize_price(&element_text(el)))
        .unwrap_or_else(|| SENTINEL.to_string());

    let offer = match find_by_class(card, &["span"], &r.integer_class) {
        Some(integer_el) => {
            let mut amount = element_text(integer_el);
            if let Some(fraction_el) = find_by_class(card, &["span"], &r.fraction_class) {
                amount.push('.');
                amount.push_str(&element_text(fraction_el));
            }
            normalize_price(&format!("S/ {amount}"))
        }
        None => text_node_price(card)
            .map(|loose| normalize_price(&loose))
            .unwrap_or_else(|| SENTINEL.to_string()),
    };
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
