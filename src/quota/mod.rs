//! Guest Usage Quota Module
//!
//! This module gates a small set of features for anonymous visitors to a
//! fixed number of uses per local calendar day.
//!
//! # Features
//!
//! - Per-feature daily allowance with lazy day-boundary reset
//! - Two-phase gate: check before the backend call, register after it succeeds
//! - Persisted ledger behind a pluggable key-value store
//! - Sign-up prompt through a notification surface once exhausted
//! - Snapshot subscription for presentation state
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Guest Usage Tracker                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐         │
//! │  │   Clock     │  │  Notifier   │  │  Snapshot   │         │
//! │  │ (today)     │  │ (sign-up)   │  │  watchers   │         │
//! │  └─────────────┘  └─────────────┘  └─────────────┘         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────┐   │
//! │  │         Usage Ledger (KeyValueStore, JSON)           │   │
//! │  └─────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod feature;
pub mod notify;
pub mod store;
pub mod tracker;

pub use clock::{Clock, FixedClock, LocalClock};
pub use config::QuotaConfig;
pub use dashboard::{FeatureUsage, UsageSnapshot};
pub use error::{QuotaError, QuotaResult};
pub use feature::GatedFeature;
pub use notify::{CallToAction, Navigator, Notification, Notifier, RecordingNotifier, Route, TracingNotifier};
pub use store::{is_valid_storage_key, FileStore, KeyValueStore, MemoryStore, UsageLedger, UsageRecord};
pub use tracker::{GuestUsageTracker, Viewer};
