//! Multi-site extraction engine for pharmacy price comparison.
//!
//! - Price-text canonicalisation (`price`)
//! - Page capture trait and WebDriver-backed implementation (`browser`)
//! - Per-site dialect rules and extractors (`sites`)
//! - Concurrent fan-out orchestrator (`compare`)
//!
//! The engine coerces four storefront markup dialects into one record shape
//! under a uniform failure contract: a broken or slow site yields an empty
//! slice of the result, never an error for the whole comparison.

pub mod browser;
pub mod compare;
mod extract;
pub mod price;
pub mod sites;

pub use browser::{PageCapture, PageCapturer, WebdriverCapturer};
pub use compare::{compare, compare_with};
pub use price::{normalize_price, reconcile_prices};
pub use sites::{extract_site, SiteSpec};
