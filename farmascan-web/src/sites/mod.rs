//! Per-site capture parameters, dialect dispatch, and the extractor boundary.

pub mod grid;
pub mod magento;
pub mod spa;
pub mod vtex;

use crate::browser::PageCapturer;
use farmascan_common::{Pharmacy, ProductRecord};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Capture and parse strategy for one storefront.
///
/// Navigation/settle/scroll budgets differ per site because the heavier
/// client-side catalogs (the React storefront, VTEX) need more scroll pulses
/// before lazy-loaded cards materialise.
#[derive(Debug, Clone)]
pub struct SiteSpec {
    pub pharmacy: Pharmacy,
    pub base_url: &'static str,
    pub nav_timeout: Duration,
    pub settle: Duration,
    pub scroll_cycles: u32,
    pub scroll_pause: Duration,
}

impl SiteSpec {
    pub fn of(pharmacy: Pharmacy) -> Self {
        match pharmacy {
            Pharmacy::Inkafarma => Self {
                pharmacy,
                base_url: "https://inkafarma.pe",
                nav_timeout: Duration::from_secs(45),
                settle: Duration::from_secs(5),
                scroll_cycles: 5,
                scroll_pause: Duration::from_millis(2000),
            },
            Pharmacy::Mifarma => Self {
                pharmacy,
                base_url: "https://www.mifarma.com.pe",
                nav_timeout: Duration::from_secs(45),
                settle: Duration::from_secs(5),
                scroll_cycles: 5,
                scroll_pause: Duration::from_millis(2000),
            },
            Pharmacy::BoticasPeru => Self {
                pharmacy,
                base_url: "https://boticasperu.pe",
                nav_timeout: Duration::from_secs(40),
                settle: Duration::from_secs(3),
                scroll_cycles: 4,
                scroll_pause: Duration::from_millis(1500),
            },
            Pharmacy::BoticasYSalud => Self {
                pharmacy,
                base_url: "https://www.boticasysalud.com",
                nav_timeout: Duration::from_secs(40),
                settle: Duration::from_secs(5),
                scroll_cycles: 8,
                scroll_pause: Duration::from_millis(1500),
            },
            Pharmacy::FarmaciaUniversal => Self {
                pharmacy,
                base_url: "https://www.farmaciauniversal.com",
                nav_timeout: Duration::from_secs(40),
                settle: Duration::from_secs(6),
                scroll_cycles: 10,
                scroll_pause: Duration::from_millis(1500),
            },
        }
    }

    /// Search URL with the URL-encoded keyword injected where this
    /// storefront expects it.
    pub fn search_url(&self, keyword: &str) -> String {
        let q = urlencoding::encode(keyword);
        match self.pharmacy {
            Pharmacy::Inkafarma | Pharmacy::Mifarma => {
                format!("{}/buscador?keyword={q}", self.base_url)
            }
            Pharmacy::BoticasPeru => {
                format!("{}/catalogsearch/result/?q={q}", self.base_url)
            }
            Pharmacy::BoticasYSalud => {
                format!("{}/tienda/busqueda?q={q}", self.base_url)
            }
            Pharmacy::FarmaciaUniversal => {
                format!("{}/{q}?_q={q}&map=ft", self.base_url)
            }
        }
    }

    /// Upper bound for the whole capture: navigation plus the settle/scroll
    /// budget plus a fixed grace period.
    pub fn capture_deadline(&self) -> Duration {
        self.nav_timeout
            + self.settle
            + self.scroll_pause * self.scroll_cycles
            + Duration::from_secs(15)
    }

    /// Base URL for resolving relative links and images.
    pub fn base(&self) -> Url {
        Url::parse(self.base_url).expect("static base URL")
    }

    /// Parse captured markup under this site's dialect.
    pub fn parse_listing(&self, html: &str, max_items: usize) -> Vec<ProductRecord> {
        match self.pharmacy {
            Pharmacy::Inkafarma | Pharmacy::Mifarma => grid::parse(self, html, max_items),
            Pharmacy::BoticasPeru => magento::parse(self, html, max_items),
            Pharmacy::BoticasYSalud => spa::parse(self, html, max_items),
            Pharmacy::FarmaciaUniversal => vtex::parse(self, html, max_items),
        }
    }
}

/// Run one site end to end: capture, parse, cap.
///
/// Never propagates: navigation timeouts, session failures, and markup
/// surprises all log a diagnostic and yield an empty list, so one broken
/// site cannot abort the comparison.
pub async fn extract_site(
    capturer: &dyn PageCapturer,
    pharmacy: Pharmacy,
    keyword: &str,
    max_items: usize,
) -> Vec<ProductRecord> {
    let spec = SiteSpec::of(pharmacy);
    info!(target: "web.site", site = %pharmacy, "loading");

    let capture = match capturer.capture(&spec, keyword).await {
        Ok(capture) => capture,
        Err(e) => {
            warn!(target: "web.site", site = %pharmacy, error = %e, "site extraction failed");
            return Vec::new();
        }
    };

    let records = spec.parse_listing(&capture.html, max_items);
    info!(
        target: "web.site",
        site = %pharmacy,
        count = records.len(),
        "records extracted"
    );
    records
}
