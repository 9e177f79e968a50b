//! Guest Quota Library
//!
//! This library provides the guest usage quota tracker for the restaurant
//! discovery client: per-feature daily allowances for anonymous visitors,
//! persisted ledger storage, and the sign-up prompt shown once an allowance
//! is used up.

pub mod config;
pub mod logging;
pub mod quota;

pub use config::Config;
pub use quota::{GatedFeature, GuestUsageTracker, QuotaConfig, Viewer};
