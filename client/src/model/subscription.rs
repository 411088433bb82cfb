//! Subscription snapshot
//!
//! The backend reports the subscription state at login and on demand via
//! `/auth/subscription-status`. The client never computes any of it; this is
//! a stored snapshot, trusted only until the next refresh.

use serde::{Deserialize, Serialize};

/// Subscription lifecycle states known to this client.
///
/// The provider may introduce new states at any time; those parse as
/// `Unknown` instead of failing the whole snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Trial,
    Active,
    Expired,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Trial => "trial",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Snapshot of the account's subscription.
///
/// Every field defaults: the login payload (`subscription_info`) carries only
/// a subset of what `/auth/subscription-status` returns, and both must parse
/// into the same type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub is_active: bool,
    /// Days left on the trial clock. The backend derives this from the trial
    /// end date and reports negative values once it has passed.
    #[serde(default)]
    pub days_remaining: i64,
    #[serde(default)]
    pub patient_limit: Option<u32>,
    #[serde(default)]
    pub current_plan: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_payload_parses() {
        // Shape of `subscription_info` in the login/registration response.
        let sub: Subscription = serde_json::from_value(json!({
            "is_active": true,
            "message": "Trial active until 2026-09-28",
            "patient_limit": 3,
            "days_remaining": 29
        }))
        .unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Trial);
        assert!(sub.is_active);
        assert_eq!(sub.days_remaining, 29);
        assert_eq!(sub.patient_limit, Some(3));
    }

    #[test]
    fn unknown_status_does_not_fail_the_snapshot() {
        let sub: Subscription =
            serde_json::from_value(json!({ "status": "grandfathered", "is_active": true }))
                .unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Unknown);
        assert!(sub.is_active);
    }

    #[test]
    fn empty_snapshot_defaults_closed() {
        let sub: Subscription = serde_json::from_value(json!({})).unwrap();

        assert!(!sub.is_active);
        assert_eq!(sub.days_remaining, 0);
        assert_eq!(sub.patient_limit, None);
    }

    #[test]
    fn negative_days_survive_a_roundtrip() {
        let sub = Subscription {
            status: SubscriptionStatus::Expired,
            is_active: false,
            days_remaining: -4,
            patient_limit: Some(3),
            current_plan: None,
            message: None,
        };

        let raw = serde_json::to_string(&sub).unwrap();
        assert_eq!(serde_json::from_str::<Subscription>(&raw).unwrap(), sub);
    }
}
