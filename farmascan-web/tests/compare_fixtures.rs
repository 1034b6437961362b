//! End-to-end comparison over fixture markup: every dialect parses, records
//! normalize, and the merge order stays fixed under adversarial latencies.

use async_trait::async_trait;
use farmascan_common::{FarmascanError, Pharmacy, ProductRecord, SENTINEL};
use farmascan_web::{compare_with, PageCapture, PageCapturer, SiteSpec};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

const GRID_LISTING: &str = r#"
<html><body>
  <div data-testid="product-card">
    <a href="/producto/panadol-antigripal-nf-100">
      <h3 class="product-name">Panadol Antigripal NF 100 Tabletas</h3>
    </a>
    <img src="/media/panadol-nf.jpg">
    <span class="price">S/ 9.90</span>
    <span class="old-price line-through">S/ 12.50</span>
  </div>
  <div class="product-item">
    <a href="/producto/panadol-forte-48">
      <h4 class="product-title">Panadol Forte 48 Tabletas</h4>
    </a>
    <img src="/media/panadol-forte.jpg">
    <span class="precio">S/ 7.40</span>
  </div>
  <div class="product-card">
    <a href="/producto/panadol-ninos-jarabe">Panadol Niños Jarabe 60 ml</a>
    <span class="product-price">S/ 13.00</span>
    <span class="list-price">S/ 13.00</span>
  </div>
</body></html>
"#;

const MAGENTO_LISTING: &str = r#"
<html><body><ol class="products list items">
  <li class="item product">
    <a href="https://boticasperu.pe/panadol-antigripal-nf.html">
      <img class="product-image-photo" src="/media/catalog/panadol-nf.jpg">
    </a>
    <a class="product-item-link" href="https://boticasperu.pe/panadol-antigripal-nf.html">
      Panadol Antigripal NF Caja x 100
    </a>
    <span class="special-price"><span class="price">S/ 22.90</span></span>
    <span class="old-price"><span class="price">S/ 26.00</span></span>
  </li>
  <li class="item product">
    <a class="product-item-link" href="https://boticasperu.pe/panadol-forte-48.html">Panadol Forte Caja x 48</a>
    <span class="price-wrapper" data-price-type="finalPrice"><span class="price">S/ 15.80</span></span>
  </li>
  <div class="product-item">
    <a class="product-item-link" href="https://boticasperu.pe/panadol-jarabe-60ml.html">Panadol Jarabe 60 ml</a>
    <span class="price">S/ 12.40</span>
  </div>
</ol></body></html>
"#;

const SPA_LISTING: &str = r#"
<html><body><div id="root">
  <div class="product-card">
    <a href="/tienda/productos/panadol-antigripal-nf-12">
      <div class="product-card__name">Panadol Antigripal NF 12 Tabletas</div>
    </a>
    <img src="https://cdn.boticasysalud.com/panadol-nf.webp">
    <div class="product-card__price">S/ 7.20</div>
    <div class="price-original">S/ 8.00</div>
  </div>
  <div class="product-card">
    <a href="/tienda/productos/panadol-extra-fuerte-24">Panadol Extra Fuerte 24 Tabletas</a>
    <div class="product-card__price">S/ 5.60</div>
  </div>
  <div class="product-card">
    <a href="/tienda/productos/panadol-ninos-gotas">Panadol Niños Gotas 15 ml</a>
    <span>S/ 10.30</span>
  </div>
</div></body></html>
"#;

const VTEX_LISTING: &str = r#"
<html><body><section>
  <article>
    <a href="/panadol-antigripal-nf/p">
      <span class="vtex-product-summary-2-x-productBrand">Panadol Antigripal NF</span>
      Comprar
    </a>
    <img src="/arquivos/ids/panadol-nf.png">
    <span class="vtex-price-format-1-x-listPrice">S/ 14.00</span>
    <span class="vtex-price-format-1-x-currencyInteger">11</span>
    <span class="vtex-price-format-1-x-currencyFraction">50</span>
  </article>
  <article>
    <a href="/panadol-forte-24/p">Comprar Panadol Forte x 24</a>
    <div>S/ 18.90</div>
  </article>
  <article>
    <a href="/panadol-jarabe-60ml/p">
      <span class="vtex-product-summary-2-x-productName">Panadol Jarabe 60 ml</span>
    </a>
    <span class="vtex-price-format-1-x-currencyInteger">9</span>
  </article>
</section></body></html>
"#;

struct FixtureCapturer {
    pages: HashMap<Pharmacy, String>,
    delays_ms: HashMap<Pharmacy, u64>,
    failing: HashSet<Pharmacy>,
}

impl FixtureCapturer {
    fn with_all_sites() -> Self {
        let mut pages = HashMap::new();
        pages.insert(Pharmacy::Inkafarma, GRID_LISTING.to_string());
        pages.insert(Pharmacy::Mifarma, GRID_LISTING.to_string());
        pages.insert(Pharmacy::BoticasPeru, MAGENTO_LISTING.to_string());
        pages.insert(Pharmacy::BoticasYSalud, SPA_LISTING.to_string());
        pages.insert(Pharmacy::FarmaciaUniversal, VTEX_LISTING.to_string());
        Self {
            pages,
            delays_ms: HashMap::new(),
            failing: HashSet::new(),
        }
    }

    fn empty() -> Self {
        Self {
            pages: HashMap::new(),
            delays_ms: HashMap::new(),
            failing: HashSet::new(),
        }
    }

    /// First sites slowest: completion order becomes the reverse of the
    /// declared site order.
    fn with_inverted_latencies(mut self) -> Self {
        for (idx, pharmacy) in Pharmacy::ALL.iter().enumerate() {
            let rank = (Pharmacy::ALL.len() - idx) as u64;
            self.delays_ms.insert(*pharmacy, rank * 30);
        }
        self
    }

    fn failing_site(mut self, pharmacy: Pharmacy) -> Self {
        self.failing.insert(pharmacy);
        self
    }
}

#[async_trait]
impl PageCapturer for FixtureCapturer {
    async fn capture(
        &self,
        spec: &SiteSpec,
        keyword: &str,
    ) -> farmascan_common::Result<PageCapture> {
        if let Some(ms) = self.delays_ms.get(&spec.pharmacy) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        if self.failing.contains(&spec.pharmacy) {
            return Err(FarmascanError::Extraction(format!(
                "simulated session failure for {}",
                spec.pharmacy
            )));
        }
        let html = self.pages.get(&spec.pharmacy).cloned().unwrap_or_default();
        Ok(PageCapture {
            url: spec.search_url(keyword),
            html,
        })
    }
}

fn site_slice<'a>(records: &'a [ProductRecord], pharmacy: Pharmacy) -> Vec<&'a ProductRecord> {
    records.iter().filter(|r| r.pharmacy == pharmacy).collect()
}

fn assert_grouped_in_site_order(records: &[ProductRecord]) {
    let position = |p: Pharmacy| Pharmacy::ALL.iter().position(|&q| q == p).unwrap();
    let mut last = 0;
    for record in records {
        let current = position(record.pharmacy);
        assert!(
            current >= last,
            "record for {} appeared after a later site",
            record.pharmacy
        );
        last = current;
    }
}

#[tokio::test]
async fn full_comparison_normalizes_every_dialect_in_site_order() {
    let capturer = FixtureCapturer::with_all_sites().with_inverted_latencies();
    let records = compare_with(&capturer, "panadol", 10).await;

    assert_eq!(records.len(), 15);
    assert_grouped_in_site_order(&records);
    for pharmacy in Pharmacy::ALL {
        assert_eq!(site_slice(&records, pharmacy).len(), 3);
    }

    // Grid: was/now pair, base-resolved links and images.
    let inka = site_slice(&records, Pharmacy::Inkafarma);
    assert_eq!(inka[0].name, "Panadol Antigripal NF 100 Tabletas");
    assert_eq!(inka[0].offer_price, "S/ 9.90");
    assert_eq!(inka[0].regular_price, "S/ 12.50");
    assert_eq!(
        inka[0].link,
        "https://inkafarma.pe/producto/panadol-antigripal-nf-100"
    );
    assert_eq!(inka[0].image_url, "https://inkafarma.pe/media/panadol-nf.jpg");

    // The same markup parsed for Mifarma resolves against its own base.
    let mifarma = site_slice(&records, Pharmacy::Mifarma);
    assert_eq!(
        mifarma[0].link,
        "https://www.mifarma.com.pe/producto/panadol-antigripal-nf-100"
    );

    // Magento ladder.
    let boticas = site_slice(&records, Pharmacy::BoticasPeru);
    assert_eq!(boticas[0].offer_price, "S/ 22.90");
    assert_eq!(boticas[0].regular_price, "S/ 26.00");
    assert_eq!(boticas[1].offer_price, "S/ 15.80");
    assert_eq!(boticas[2].offer_price, "S/ 12.40");

    // SPA cards.
    let bys = site_slice(&records, Pharmacy::BoticasYSalud);
    assert_eq!(bys[0].name, "Panadol Antigripal NF 12 Tabletas");
    assert_eq!(bys[0].offer_price, "S/ 7.20");
    assert_eq!(bys[0].regular_price, "S/ 8.00");
    assert_eq!(bys[2].offer_price, "S/ 10.30");

    // VTEX split price and filler-stripped names.
    let universal = site_slice(&records, Pharmacy::FarmaciaUniversal);
    assert_eq!(universal[0].offer_price, "S/ 11.50");
    assert_eq!(universal[0].regular_price, "S/ 14.00");
    assert_eq!(universal[1].name, "Panadol Forte x 24");
    assert_eq!(universal[2].offer_price, "S/ 9.00");
}

#[tokio::test]
async fn record_invariants_hold_across_all_sites() {
    let capturer = FixtureCapturer::with_all_sites();
    let records = compare_with(&capturer, "panadol", 10).await;

    for pharmacy in Pharmacy::ALL {
        let slice = site_slice(&records, pharmacy);
        let links: HashSet<_> = slice.iter().map(|r| r.link.as_str()).collect();
        assert_eq!(links.len(), slice.len(), "duplicate link within {pharmacy}");
    }

    for record in &records {
        assert!(record.name.trim().chars().count() >= 3);
        // Swap rule: the offer slot is empty only when nothing was found.
        if record.offer_price == SENTINEL {
            assert_eq!(record.regular_price, SENTINEL);
        }
        // Collapse rule: a was/now pair never shows the same price twice.
        if record.offer_price != SENTINEL {
            assert_ne!(record.offer_price, record.regular_price);
        }
    }
}

#[tokio::test]
async fn per_site_cap_bounds_each_slice() {
    let capturer = FixtureCapturer::with_all_sites();
    let records = compare_with(&capturer, "panadol", 2).await;

    assert_eq!(records.len(), 10);
    for pharmacy in Pharmacy::ALL {
        assert!(site_slice(&records, pharmacy).len() <= 2);
    }
    assert_grouped_in_site_order(&records);
}

#[tokio::test]
async fn all_sites_empty_is_a_valid_result() {
    let capturer = FixtureCapturer::empty();
    let records = compare_with(&capturer, "panadol", 10).await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn one_broken_site_does_not_abort_the_comparison() {
    let capturer = FixtureCapturer::with_all_sites().failing_site(Pharmacy::Mifarma);
    let records = compare_with(&capturer, "panadol", 10).await;

    assert!(site_slice(&records, Pharmacy::Mifarma).is_empty());
    assert_eq!(site_slice(&records, Pharmacy::Inkafarma).len(), 3);
    assert_eq!(site_slice(&records, Pharmacy::FarmaciaUniversal).len(), 3);
    assert_grouped_in_site_order(&records);
}
