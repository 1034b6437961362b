//! Driver layer for browser automation.
//!
//! This crate exposes the browser session factory and page helpers the
//! extraction engine uses to collect rendered storefront markup in a
//! stealthy, reliable way. One [`farmascan_browser::driver::FarmascanDriver`]
//! corresponds to one isolated browser session; the owning extractor must
//! close it, on the error path too.
//!
//! - [`farmascan_browser::driver::FarmascanDriver`]: WebDriver client wrapper
//! - [`farmascan_browser::page::FarmascanPage`]: navigation, settle and scroll helpers
//! - [`farmascan_browser::behavioral::BehavioralEngine`]: human-like timings
//! - [`farmascan_browser::stealth`]: stealth arguments and JS evasions
pub mod farmascan_browser;
