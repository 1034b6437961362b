//! Common types and utilities shared across Farmascan crates.
//!
//! This crate defines the output record shape, configuration, observability
//! helpers, and shared error types used throughout the Farmascan workspace.
//! It is intentionally lightweight and dependency-minimal so that all crates
//! can depend on it without introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`Pharmacy`]: the five storefronts covered by a comparison
//! - [`ProductRecord`]: the sole entity returned to callers
//! - [`FarmascanConfig`]: runtime configuration for the extraction engine
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`FarmascanError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! Constructing a default configuration:
//!
//! ```rust
//! use farmascan_common::{FarmascanConfig, StealthLevel};
//!
//! let mut cfg = FarmascanConfig::default();
//! cfg.stealth_level = StealthLevel::Balanced;
//! assert_eq!(cfg.default_max_items, 15);
//! assert!(cfg.headless);
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Literal standing in for any field that could not be determined.
pub const SENTINEL: &str = "No disponible";

/// The five storefronts covered by a comparison call.
///
/// The declaration order is the fixed merge order of the orchestrator: a
/// comparison result always groups records as Inkafarma, Mifarma,
/// BoticasPeru, Boticas y Salud, Farmacia Universal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pharmacy {
    Inkafarma,
    Mifarma,
    BoticasPeru,
    #[serde(rename = "Boticas y Salud")]
    BoticasYSalud,
    #[serde(rename = "Farmacia Universal")]
    FarmaciaUniversal,
}

impl Pharmacy {
    /// Fan-out and merge order.
    pub const ALL: [Pharmacy; 5] = [
        Pharmacy::Inkafarma,
        Pharmacy::Mifarma,
        Pharmacy::BoticasPeru,
        Pharmacy::BoticasYSalud,
        Pharmacy::FarmaciaUniversal,
    ];

    /// Operator-facing display label.
    pub fn label(&self) -> &'static str {
        match self {
            Pharmacy::Inkafarma => "Inkafarma",
            Pharmacy::Mifarma => "Mifarma",
            Pharmacy::BoticasPeru => "BoticasPeru",
            Pharmacy::BoticasYSalud => "Boticas y Salud",
            Pharmacy::FarmaciaUniversal => "Farmacia Universal",
        }
    }
}

impl std::fmt::Display for Pharmacy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One normalized product listing.
///
/// Records live for the duration of a single comparison call; nothing is
/// persisted. Prices are either the canonical `"S/ D.DD"` form or the
/// [`SENTINEL`]. `link` is unique within one pharmacy's slice of the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub name: String,
    pub offer_price: String,
    pub regular_price: String,
    pub image_url: String,
    pub link: String,
    pub pharmacy: Pharmacy,
}

/// Browser automation stealth level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StealthLevel {
    Lightweight,
    Balanced,
    Maximum,
}

/// Runtime configuration for the extraction engine.
///
/// Passed to the capturer and the CLI entrypoint to configure session
/// behavior. Site-specific timing (settle delays, scroll budgets) is not
/// configuration; it lives with each site's dialect rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmascanConfig {
    /// WebDriver endpoint the session factory connects to.
    pub webdriver_url: String,
    /// Whether to run browser automation without a visible window.
    pub headless: bool,
    /// Browser automation stealth level.
    pub stealth_level: StealthLevel,
    /// Per-site record cap applied when the caller does not pass one.
    pub default_max_items: usize,
}

impl Default for FarmascanConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            stealth_level: StealthLevel::Balanced,
            default_max_items: 15,
        }
    }
}

impl FarmascanConfig {
    /// Defaults overlaid with `FARMASCAN_WEBDRIVER_URL` and
    /// `FARMASCAN_HEADLESS` when set.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(url) = std::env::var("FARMASCAN_WEBDRIVER_URL") {
            if !url.trim().is_empty() {
                cfg.webdriver_url = url;
            }
        }
        if let Ok(raw) = std::env::var("FARMASCAN_HEADLESS") {
            match raw.trim() {
                "0" | "false" | "no" => cfg.headless = false,
                "1" | "true" | "yes" => cfg.headless = true,
                _ => {}
            }
        }
        cfg
    }
}

/// Error types used across the Farmascan system.
#[derive(thiserror::Error, Debug)]
pub enum FarmascanError {
    /// A site extraction failed before any records could be produced.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The browser driver reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation exceeded its deadline.
    #[error("Timeout occurred")]
    Timeout,
}

/// Convenient alias for results that use [`FarmascanError`].
pub type Result<T> = std::result::Result<T, FarmascanError>;
