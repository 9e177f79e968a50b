//! Guest Usage Tracker
//!
//! Gates features for anonymous visitors to a daily allowance.
//!
//! Access is checked *before* a feature's backend call and usage is
//! registered only *after* the call succeeds, so failed attempts are never
//! charged:
//!
//! ```no_run
//! use guest_quota::quota::{GatedFeature, GuestUsageTracker, MemoryStore, QuotaConfig};
//!
//! let tracker = GuestUsageTracker::new(QuotaConfig::default(), MemoryStore::new());
//! if tracker.check_feature_access(GatedFeature::Search) {
//!     // ... run the search ...
//!     tracker.register_usage(GatedFeature::Search);
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::clock::{Clock, LocalClock};
use super::config::QuotaConfig;
use super::dashboard::{FeatureUsage, UsageSnapshot};
use super::feature::GatedFeature;
use super::notify::{Notification, Notifier, TracingNotifier};
use super::store::{KeyValueStore, UsageLedger};

/// Who is using the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Viewer {
    /// Not signed in; guest quotas apply
    #[default]
    Anonymous,
    /// Signed in; exempt from guest quotas
    Authenticated,
}

/// Daily guest quota tracker.
///
/// Cloned handles share configuration, viewer state and subscribers. The
/// backing store is the only source of truth for counts; concurrent handles
/// on the same store follow last-writer-wins.
#[derive(Clone)]
pub struct GuestUsageTracker {
    config: Arc<QuotaConfig>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    viewer: Arc<RwLock<Viewer>>,
    updates: Arc<watch::Sender<UsageSnapshot>>,
}

impl GuestUsageTracker {
    /// Create a tracker on the local wall clock that logs notifications
    pub fn new(config: QuotaConfig, store: impl KeyValueStore + 'static) -> Self {
        let tracker = Self {
            config: Arc::new(config),
            store: Arc::new(store),
            clock: Arc::new(LocalClock),
            notifier: Arc::new(TracingNotifier),
            viewer: Arc::new(RwLock::new(Viewer::Anonymous)),
            updates: Arc::new(watch::channel(Self::empty_snapshot()).0),
        };
        tracker.publish();
        tracker
    }

    /// Replace the clock
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self.publish();
        self
    }

    /// Replace the notification surface
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Current configuration
    pub fn config(&self) -> &QuotaConfig {
        &self.config
    }

    /// Current viewer
    pub fn viewer(&self) -> Viewer {
        match self.viewer.read() {
            Ok(viewer) => *viewer,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Update the viewer after sign-in or sign-out
    pub fn set_viewer(&self, viewer: Viewer) {
        match self.viewer.write() {
            Ok(mut current) => *current = viewer,
            Err(poisoned) => *poisoned.into_inner() = viewer,
        }
        debug!("Viewer changed to {:?}", viewer);
        self.publish();
    }

    /// Daily limit enforced for `feature`
    pub fn daily_limit(&self, feature: GatedFeature) -> u32 {
        self.config.limit_for(feature)
    }

    /// Uses of `feature` left today. Never fails and never writes.
    pub fn remaining_uses(&self, feature: GatedFeature) -> u32 {
        let limit = self.daily_limit(feature);
        if self.is_exempt() {
            return limit;
        }

        let used = self.load_ledger().count_for(feature, self.clock.today());
        limit.saturating_sub(used)
    }

    /// Whether any uses of `feature` are left today
    pub fn has_free_tries_for(&self, feature: GatedFeature) -> bool {
        self.remaining_uses(feature) > 0
    }

    /// Gate run before a feature's backend call.
    ///
    /// Returns `false` and shows the sign-up prompt once today's allowance is
    /// used up. Never registers usage.
    pub fn check_feature_access(&self, feature: GatedFeature) -> bool {
        if self.is_exempt() {
            return true;
        }

        let remaining = self.remaining_uses(feature);
        if remaining > 0 {
            debug!(%feature, remaining, "Guest access allowed");
            return true;
        }

        warn!(%feature, "Guest quota exhausted");
        let notification = Notification::quota_exhausted(feature, &self.config.signup_path);
        self.notifier.notify(&notification);
        false
    }

    /// Charge one use of `feature` after its action succeeded.
    ///
    /// Applies the lazy day reset, persists the ledger and refreshes
    /// subscribers. Storage failures are logged and otherwise ignored.
    pub fn register_usage(&self, feature: GatedFeature) {
        if self.is_exempt() {
            debug!(%feature, "Usage not tracked for exempt viewer");
            return;
        }

        let today = self.clock.today();
        let mut ledger = self.load_ledger();
        let count = ledger.increment(feature, today);

        if let Err(e) = ledger.save(self.store.as_ref(), &self.config.storage_key) {
            warn!(%feature, "Failed to persist guest usage: {}", e);
        }

        info!(
            %feature,
            count,
            limit = self.daily_limit(feature),
            "Registered guest usage"
        );
        self.publish();
    }

    /// Snapshot of every feature's usage today
    pub fn all_usage(&self) -> UsageSnapshot {
        let today = self.clock.today();
        let viewer = self.viewer();
        let exempt = self.is_exempt();
        let ledger = if exempt {
            UsageLedger::new()
        } else {
            self.load_ledger()
        };

        let features: BTreeMap<GatedFeature, FeatureUsage> = GatedFeature::ALL
            .into_iter()
            .map(|feature| {
                let used = ledger.count_for(feature, today);
                (feature, FeatureUsage::new(used, self.daily_limit(feature)))
            })
            .collect();

        UsageSnapshot {
            date: today,
            viewer,
            features,
        }
    }

    /// Subscribe to snapshot updates published after every registered use
    pub fn subscribe(&self) -> watch::Receiver<UsageSnapshot> {
        self.updates.subscribe()
    }

    /// Drop all persisted usage, as when the visitor clears site data
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(&self.config.storage_key) {
            warn!("Failed to clear guest usage: {}", e);
        }
        info!("Cleared guest usage");
        self.publish();
    }

    fn is_exempt(&self) -> bool {
        !self.config.enabled || self.viewer() == Viewer::Authenticated
    }

    /// Read the ledger, treating unreadable storage as no prior usage
    fn load_ledger(&self) -> UsageLedger {
        match UsageLedger::load(self.store.as_ref(), &self.config.storage_key) {
            Ok(ledger) => ledger,
            Err(e) => {
                warn!("Guest usage unreadable, assuming no prior usage: {}", e);
                UsageLedger::new()
            }
        }
    }

    fn publish(&self) {
        let snapshot = self.all_usage();
        self.updates.send_replace(snapshot);
    }

    fn empty_snapshot() -> UsageSnapshot {
        UsageSnapshot {
            date: chrono::NaiveDate::MIN,
            viewer: Viewer::Anonymous,
            features: BTreeMap::new(),
        }
    }
}

impl std::fmt::Debug for GuestUsageTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestUsageTracker")
            .field("config", &self.config)
            .field("viewer", &self.viewer())
            .finish_non_exhaustive()
    }
}
