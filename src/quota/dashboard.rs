//! Usage Dashboard Support
//!
//! Read-only snapshot of every gated feature's allowance for today, used to
//! render remaining-tries badges.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::feature::GatedFeature;
use super::tracker::Viewer;

/// Usage of one feature today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureUsage {
    /// Uses consumed today
    pub used: u32,

    /// Daily limit being enforced
    pub limit: u32,

    /// Uses left today
    pub remaining: u32,
}

impl FeatureUsage {
    pub fn new(used: u32, limit: u32) -> Self {
        Self {
            used,
            limit,
            remaining: limit.saturating_sub(used),
        }
    }

    /// Percentage of the daily limit consumed
    pub fn utilization_percent(&self) -> f64 {
        if self.limit > 0 {
            (self.used.min(self.limit) as f64 / self.limit as f64) * 100.0
        } else {
            100.0
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// All features' usage for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Day the snapshot describes
    pub date: NaiveDate,

    /// Who the counts apply to
    pub viewer: Viewer,

    /// Per-feature usage
    pub features: BTreeMap<GatedFeature, FeatureUsage>,
}

impl UsageSnapshot {
    /// Remaining uses for a feature (zero if absent)
    pub fn remaining(&self, feature: GatedFeature) -> u32 {
        self.features
            .get(&feature)
            .map(|u| u.remaining)
            .unwrap_or(0)
    }

    /// Features with no uses left
    pub fn exhausted(&self) -> Vec<GatedFeature> {
        self.features
            .iter()
            .filter(|(_, u)| u.is_exhausted())
            .map(|(f, _)| *f)
            .collect()
    }

    /// Total uses consumed today across features
    pub fn total_used(&self) -> u32 {
        self.features.values().map(|u| u.used).sum()
    }
}
