//! Notification and navigation collaborators.
//!
//! The tracker tells the visitor a quota is exhausted through a [`Notifier`];
//! the sign-up call-to-action hands its route to a [`Navigator`].

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::feature::GatedFeature;

/// Navigation targets a call-to-action can point at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum Route {
    /// Account creation screen
    SignUp(String),
}

impl Route {
    pub fn path(&self) -> &str {
        match self {
            Route::SignUp(path) => path,
        }
    }
}

/// Action button attached to a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallToAction {
    pub label: String,
    pub target: Route,
}

impl CallToAction {
    /// Follow the action's route
    pub fn activate(&self, navigator: &dyn Navigator) {
        navigator.navigate(self.target.path());
    }
}

/// A user-facing toast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub action: Option<CallToAction>,
}

impl Notification {
    pub fn new(message: impl Into<String>, action: Option<CallToAction>) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            action,
        }
    }

    /// Toast shown when a guest has used up today's allowance
    pub fn quota_exhausted(feature: GatedFeature, signup_path: &str) -> Self {
        Self::new(
            format!(
                "You've used all your free {} tries for today. Sign up for unlimited access.",
                feature.display_name().to_lowercase()
            ),
            Some(CallToAction {
                label: "Sign up".to_string(),
                target: Route::SignUp(signup_path.to_string()),
            }),
        )
    }
}

/// Notification surface
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Navigation facility
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Notifier that writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        match &notification.action {
            Some(action) => tracing::warn!(
                id = %notification.id,
                action = %action.label,
                route = action.target.path(),
                "{}",
                notification.message
            ),
            None => tracing::warn!(id = %notification.id, "{}", notification.message),
        }
    }
}

/// Notifier that keeps every notification it receives. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingNavigator {
        visited: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, path: &str) {
            self.visited.lock().unwrap().push(path.to_string());
        }
    }

    #[test]
    fn test_quota_exhausted_copy() {
        let n = Notification::quota_exhausted(GatedFeature::AiAnalysis, "/auth?mode=signup");
        assert!(n.message.contains("ai analysis"));

        let action = n.action.unwrap();
        assert_eq!(action.label, "Sign up");
        assert_eq!(action.target, Route::SignUp("/auth?mode=signup".to_string()));
    }

    #[test]
    fn test_call_to_action_navigates() {
        let navigator = RecordingNavigator::default();
        let n = Notification::quota_exhausted(GatedFeature::Search, "/signup");
        n.action.unwrap().activate(&navigator);

        assert_eq!(*navigator.visited.lock().unwrap(), vec!["/signup".to_string()]);
    }

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        let shared = notifier.clone();
        notifier.notify(&Notification::new("hello", None));

        assert_eq!(shared.count(), 1);
        assert_eq!(shared.sent()[0].message, "hello");
    }

    #[test]
    fn test_notification_ids_unique() {
        let a = Notification::new("a", None);
        let b = Notification::new("a", None);
        assert_ne!(a.id, b.id);
    }
}
