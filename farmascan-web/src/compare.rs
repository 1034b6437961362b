//! Fan-out/fan-in orchestration across the five storefronts.

use crate::browser::{PageCapturer, WebdriverCapturer};
use crate::sites::extract_site;
use farmascan_common::{FarmascanConfig, Pharmacy, ProductRecord};
use futures::future::join_all;
use tracing::info;

/// Compare prices for `keyword` across the five pharmacies using a real
/// browser session per site.
///
/// The caller is responsible for validating the keyword; the engine only
/// URL-encodes it. An empty result is a valid, successful outcome.
pub async fn compare(keyword: &str, max_items: usize) -> Vec<ProductRecord> {
    let capturer = WebdriverCapturer::new(FarmascanConfig::from_env());
    compare_with(&capturer, keyword, max_items).await
}

/// Capturer-parameterized comparison.
///
/// All five extractions run concurrently and unconditionally: no early
/// cancellation when one finishes, no abort when one fails. Results are
/// concatenated in the fixed [`Pharmacy::ALL`] order regardless of which
/// site settles first.
pub async fn compare_with(
    capturer: &dyn PageCapturer,
    keyword: &str,
    max_items: usize,
) -> Vec<ProductRecord> {
    info!(
        target: "web.compare",
        keyword,
        max_items,
        "starting comparison"
    );

    let extractions = Pharmacy::ALL
        .iter()
        .map(|&pharmacy| extract_site(capturer, pharmacy, keyword, max_items));
    let per_site = join_all(extractions).await;

    let merged: Vec<ProductRecord> = per_site.into_iter().flatten().collect();
    info!(
        target: "web.compare",
        keyword,
        total = merged.len(),
        "comparison finished"
    );
    merged
}
