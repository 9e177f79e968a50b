//! Guest Quota Configuration
//!
//! Daily allowances and storage settings for the guest usage tracker.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::{QuotaError, QuotaResult};
use super::feature::GatedFeature;
use super::store::is_valid_storage_key;

/// Default storage key for the persisted ledger
pub const DEFAULT_STORAGE_KEY: &str = "guest_usage";

/// Default account-creation route
pub const DEFAULT_SIGNUP_PATH: &str = "/auth?mode=signup";

/// Guest quota configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Enable guest quotas
    pub enabled: bool,

    /// Free searches per day
    pub search_limit: u32,

    /// Free menu scrapes per day
    pub menu_scrape_limit: u32,

    /// Free AI analyses per day
    pub ai_analysis_limit: u32,

    /// Free comparisons per day
    pub comparison_limit: u32,

    /// Key the ledger is stored under
    pub storage_key: String,

    /// Route the sign-up call-to-action navigates to
    pub signup_path: String,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            search_limit: GatedFeature::Search.default_daily_limit(),
            menu_scrape_limit: GatedFeature::MenuScrape.default_daily_limit(),
            ai_analysis_limit: GatedFeature::AiAnalysis.default_daily_limit(),
            comparison_limit: GatedFeature::Comparison.default_daily_limit(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            signup_path: DEFAULT_SIGNUP_PATH.to_string(),
        }
    }
}

impl QuotaConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::default().apply_env_overrides()
    }

    /// Apply `GUEST_QUOTA_*` environment overrides on top of `self`
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply `GUEST_QUOTA_*` overrides read through `lookup`.
    ///
    /// Values that do not parse are logged and ignored.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("GUEST_QUOTA_ENABLED") {
            match val.trim().parse::<bool>() {
                Ok(enabled) => self.enabled = enabled,
                Err(_) => warn!(
                    "Ignoring GUEST_QUOTA_ENABLED={:?}: expected 'true' or 'false'",
                    val
                ),
            }
        }

        for feature in GatedFeature::ALL {
            let name = limit_var(feature);
            let Some(val) = lookup(&name) else {
                continue;
            };
            match val.trim().parse::<u32>() {
                Ok(limit) => self = self.with_limit(feature, limit),
                Err(_) => warn!("Ignoring {}={:?}: expected a non-negative integer", name, val),
            }
        }

        self
    }

    /// Daily limit enforced for a feature
    pub fn limit_for(&self, feature: GatedFeature) -> u32 {
        match feature {
            GatedFeature::Search => self.search_limit,
            GatedFeature::MenuScrape => self.menu_scrape_limit,
            GatedFeature::AiAnalysis => self.ai_analysis_limit,
            GatedFeature::Comparison => self.comparison_limit,
        }
    }

    /// Override the daily limit for one feature
    pub fn with_limit(mut self, feature: GatedFeature, limit: u32) -> Self {
        match feature {
            GatedFeature::Search => self.search_limit = limit,
            GatedFeature::MenuScrape => self.menu_scrape_limit = limit,
            GatedFeature::AiAnalysis => self.ai_analysis_limit = limit,
            GatedFeature::Comparison => self.comparison_limit = limit,
        }
        self
    }

    /// Disable guest quotas (for testing)
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> QuotaResult<()> {
        if !is_valid_storage_key(&self.storage_key) {
            return Err(QuotaError::InvalidConfig(format!(
                "storage_key '{}' must be non-empty, use only letters, digits, '_', '-' or '.', and not start with '.'",
                self.storage_key
            )));
        }
        if !self.signup_path.starts_with('/') {
            return Err(QuotaError::InvalidConfig(format!(
                "signup_path must be an absolute route, got '{}'",
                self.signup_path
            )));
        }
        Ok(())
    }
}

/// Environment variable overriding a feature's daily limit
fn limit_var(feature: GatedFeature) -> String {
    format!("GUEST_QUOTA_{}_LIMIT", feature.key().to_uppercase())
}
