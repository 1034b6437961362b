//! Magento dialect (BoticasPeru).
//!
//! Magento search results are the tamest of the four dialects: fixed list
//! containers, stable class names, and a price ladder of
//! old-price / special-price / finalPrice wrapper / bare price.

use crate::extract::{clean_name, element_text, resolve_link, static_selector};
use crate::price::{normalize_price, reconcile_prices};
use crate::sites::SiteSpec;
use farmascan_common::{ProductRecord, SENTINEL};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

struct MagentoRules {
    cards: Selector,
    anchor: Selector,
    name: Selector,
    image: Selector,
    old_price: Selector,
    special_price: Selector,
    final_price: Selector,
    price: Selector,
}

fn rules() -> &'static MagentoRules {
    static RULES: OnceLock<MagentoRules> = OnceLock::new();
    RULES.get_or_init(|| MagentoRules {
        cards: static_selector("li.item.product, div.product-item"),
        anchor: static_selector("a[href]"),
        name: static_selector(".product-item-link"),
        image: static_selector("img.product-image-photo"),
        old_price: static_selector("span.old-price"),
        special_price: static_selector("span.special-price"),
        final_price: static_selector(r#"span.price-wrapper[data-price-type="finalPrice"]"#),
        price: static_selector("span.price"),
    })
}

pub(crate) fn parse(spec: &SiteSpec, html: &str, max_items: usize) -> Vec<ProductRecord> {
    let r = rules();
    let doc = Html::parse_document(html);
    let base = spec.base();

    let cards: Vec<_> = doc.select(&r.cards).collect();
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
    r: &MagentoRules,
    spec: &SiteSpec,
    base: &Url,
    card: ElementRef<'_>,
    seen_links: &mut HashSet<String>,
) -> Option<ProductRecord> {
    let link_el = card.select(&r.anchor).next()?;
    let href = link_el.value().attr("href")?;
    // Magento product pages are .html documents; anything else is chrome.
    if !href.contains(".html") {
        return None;
    }
    let link = resolve_link(base, href)?;
    if !seen_links.insert(link.clone()) {
        return None;
    }

    let name = card
        .select(&r.name)
        .next()
        .map(element_text)
        .unwrap_or_else(|| element_text(link_el));
    let name = clean_name(&name)?;

    let image_url = card
        .select(&r.image)
        .next()
        .and_then(|img| {
            img.value()
                .attr("src")
                .or_else(|| img.value().attr("data-src"))
        })
        .and_then(|src| base.join(src.trim()).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| SENTINEL.to_string());

    let regular = card
        .select(&r.old_price)
        .next()
        .and_then(|wrapper| wrapper.select(&r.price).next())
        .map(|el| normalize_price(&element_text(el)))
        .unwrap_or_else(|| SENTINEL.to_string());

    let mut offer = card
        .select(&r.special_price)
        .next()
        .and_then(|wrapper| wrapper.select(&r.price).next())
        .map(|el| normalize_price(&element_text(el)))
        .unwrap_or_else(|| SENTINEL.to_string());
    if offer == SENTINEL {
        offer = card
            .select(&r.final_price)
            .next()
            .and_then(|wrapper| wrapper.select(&r.price).next())
            .map(|el| normalize_price(&element_text(el)))
            .unwrap_or_else(|| SENTINEL.to_string());
    }
    if offer == SENTINEL {
        offer = card
            .select(&r.price)
            .next()
            .map(|el| normalize_price(&element_text(el)))
            .unwrap_or_else(|| SENTINEL.to_string());
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

#[cfg(test)]
mod tests {
    use super::*;
    use farmascan_common::Pharmacy;

    const LISTING: &str = r#"
    <html><body><ol class="products list items">
      <li class="item product">
        <a href="https://boticasperu.pe/panadol-antigripal-nf.html" class="product photo">
          <img class="product-image-photo" data-src="/media/catalog/panadol.jpg">
        </a>
        <a class="product-item-link" href="https://boticasperu.pe/panadol-antigripal-nf.html">
          Panadol Antigripal NF Caja x 100
        </a>
        <span class="special-price"><span class="price">S/ 22.90</span></span>
        <span class="old-price"><span class="price">S/ 26.00</span></span>
      </li>
      <li class="item product">
        <a class="product-item-link" href="https://boticasperu.pe/aspirina-100mg.html">Aspirina 100 mg</a>
        <span class="price-wrapper" data-price-type="finalPrice"><span class="price">S/ 5.40</span></span>
      </li>
      <li class="item product">
        <a class="product-item-link" href="https://boticasperu.pe/categoria">Categoria sin .html</a>
      </li>
      <li class="item product">
        <a class="product-item-link" href="https://boticasperu.pe/aspirina-100mg.html">Aspirina repetida</a>
      </li>
    </ol></body></html>
    "#;

    fn spec() -> SiteSpec {
        SiteSpec::of(Pharmacy::BoticasPeru)
    }

    #[test]
    fn reads_the_special_old_price_pair() {
        let records = parse(&spec(), LISTING, 10);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.name, "Panadol Antigripal NF Caja x 100");
        assert_eq!(first.offer_price, "S/ 22.90");
        assert_eq!(first.regular_price, "S/ 26.00");
        assert_eq!(
            first.image_url,
            "https://boticasperu.pe/media/catalog/panadol.jpg"
        );
        assert_eq!(first.pharmacy, Pharmacy::BoticasPeru);
    }

    #[test]
    fn final_price_wrapper_is_the_second_rung() {
        let records = parse(&spec(), LISTING, 10);
        let second = &records[1];
        assert_eq!(second.offer_price, "S/ 5.40");
        assert_eq!(second.regular_price, SENTINEL);
        assert_eq!(second.image_url, SENTINEL);
    }

    #[test]
    fn non_html_links_and_duplicates_are_rejected() {
        let records = parse(&spec(), LISTING, 10);
        assert!(records.iter().all(|r| r.link.contains(".html")));
        let links: HashSet<_> = records.iter().map(|r| r.link.as_str()).collect();
        assert_eq!(links.len(), records.len());
    }

    #[test]
    fn cap_applies_per_site() {
        assert_eq!(parse(&spec(), LISTING, 1).len(), 1);
    }
}
