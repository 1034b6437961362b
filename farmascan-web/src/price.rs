//! Price-text canonicalisation shared by every site extractor.

use farmascan_common::SENTINEL;
use regex::Regex;
use std::sync::OnceLock;

fn price_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"S/\s*([\d,\.]+)").expect("static pattern"))
}

/// Extract and canonicalise the first `S/`-prefixed price in `text`.
///
/// Thousands separators are stripped and the value is re-rendered with two
/// decimal places. A fragment that matches the pattern but fails numeric
/// parsing (for instance two decimal points) is returned comma-stripped
/// behind the currency symbol rather than discarded. No match yields the
/// sentinel. Deterministic and side-effect-free.
pub fn normalize_price(text: &str) -> String {
    let Some(caps) = price_pattern().captures(text) else {
        return SENTINEL.to_string();
    };
    let digits = caps[1].replace(',', "");
    match digits.parse::<f64>() {
        Ok(value) => format!("S/ {value:.2}"),
        Err(_) => format!("S/ {digits}"),
    }
}

/// Apply the offer/regular reconciliation rules to a freshly extracted pair.
///
/// Swap: the offer price is the sentinel only when no price was determined
/// at all, so a lone regular price moves into the offer slot. Collapse:
/// textually equal prices drop the regular side, avoiding a redundant
/// was/now display of identical values.
pub fn reconcile_prices(offer: String, regular: String) -> (String, String) {
    let (mut offer, mut regular) = (offer, regular);
    if offer == SENTINEL && regular != SENTINEL {
        std::mem::swap(&mut offer, &mut regular);
    }
    if offer == regular {
        regular = SENTINEL.to_string();
    }
    (offer, regular)
}
