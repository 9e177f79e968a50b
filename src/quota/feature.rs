//! Gated Feature Types
//!
//! The closed set of capabilities that anonymous visitors may only use a few
//! times per day.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::QuotaError;

/// Features whose backend call is preceded by a guest quota check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatedFeature {
    /// Restaurant search
    Search,
    /// Menu scraping for dietary insights
    MenuScrape,
    /// AI summary of a restaurant
    AiAnalysis,
    /// Side-by-side restaurant comparison
    Comparison,
}

impl GatedFeature {
    /// Every gated feature, in display order
    pub const ALL: [GatedFeature; 4] = [
        GatedFeature::Search,
        GatedFeature::MenuScrape,
        GatedFeature::AiAnalysis,
        GatedFeature::Comparison,
    ];

    /// Stable identifier used in the persisted ledger
    pub fn key(&self) -> &'static str {
        match self {
            GatedFeature::Search => "search",
            GatedFeature::MenuScrape => "menu_scrape",
            GatedFeature::AiAnalysis => "ai_analysis",
            GatedFeature::Comparison => "comparison",
        }
    }

    /// Name shown to the visitor
    pub fn display_name(&self) -> &'static str {
        match self {
            GatedFeature::Search => "Search",
            GatedFeature::MenuScrape => "Menu scraping",
            GatedFeature::AiAnalysis => "AI analysis",
            GatedFeature::Comparison => "Restaurant comparison",
        }
    }

    /// Built-in free uses per day
    pub fn default_daily_limit(&self) -> u32 {
        match self {
            GatedFeature::Search => 3,
            GatedFeature::MenuScrape => 1,
            GatedFeature::AiAnalysis => 1,
            GatedFeature::Comparison => 1,
        }
    }
}

impl fmt::Display for GatedFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for GatedFeature {
    type Err = QuotaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        GatedFeature::ALL
            .into_iter()
            .find(|f| f.key() == normalized)
            .ok_or_else(|| QuotaError::UnknownFeature(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique() {
        let mut keys: Vec<&str> = GatedFeature::ALL.iter().map(|f| f.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), GatedFeature::ALL.len());
    }

    #[test]
    fn test_parse_feature() {
        assert_eq!("search".parse::<GatedFeature>().unwrap(), GatedFeature::Search);
        assert_eq!("menu-scrape".parse::<GatedFeature>().unwrap(), GatedFeature::MenuScrape);
        assert_eq!(" AI_ANALYSIS ".parse::<GatedFeature>().unwrap(), GatedFeature::AiAnalysis);
        assert!("reservations".parse::<GatedFeature>().is_err());
    }

    #[test]
    fn test_serde_matches_key() {
        for feature in GatedFeature::ALL {
            let json = serde_json::to_string(&feature).unwrap();
            assert_eq!(json, format!("\"{}\"", feature.key()));
        }
    }

    #[test]
    fn test_default_limits() {
        assert_eq!(GatedFeature::Search.default_daily_limit(), 3);
        assert_eq!(GatedFeature::Comparison.default_daily_limit(), 1);
    }
}
