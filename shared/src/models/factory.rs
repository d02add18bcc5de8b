//! Factory (tenant) and subscription models

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Days reported for a lifetime plan
pub const LIFETIME_DAYS_REMAINING: i64 = 99_999;

/// Default trial length for a newly created factory
pub const DEFAULT_TRIAL_DAYS: i64 = 30;

/// A factory owned by a single user; the tenant boundary for all data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Factory {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub location: Option<String>,
    /// One of `trial`, `active`, `expired`, `lifetime`
    pub subscription_status: String,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub plan_expiry_date: Option<DateTime<Utc>>,
    /// One of `monthly`, `yearly`, `lifetime`
    pub plan_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Stored subscription state of a factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    Trial,
    Active,
    Expired,
    Lifetime,
}

impl SubscriptionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionState::Trial => "trial",
            SubscriptionState::Active => "active",
            SubscriptionState::Expired => "expired",
            SubscriptionState::Lifetime => "lifetime",
        }
    }

    /// Parse the stored column value; unknown values are treated as a trial
    pub fn parse(value: &str) -> Self {
        match value {
            "active" => SubscriptionState::Active,
            "expired" => SubscriptionState::Expired,
            "lifetime" => SubscriptionState::Lifetime,
            _ => SubscriptionState::Trial,
        }
    }
}

/// Paid plans a factory can purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Monthly,
    Yearly,
}

impl Plan {
    pub fn from_id(plan_id: &str) -> Option<Self> {
        match plan_id {
            "monthly" => Some(Plan::Monthly),
            "yearly" => Some(Plan::Yearly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Monthly => "monthly",
            Plan::Yearly => "yearly",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Plan::Monthly => Duration::days(30),
            Plan::Yearly => Duration::days(365),
        }
    }
}

/// Computed subscription view used by the paywall
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscriptionStatus {
    pub subscription_status: String,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub plan_expiry_date: Option<DateTime<Utc>>,
    pub plan_type: Option<String>,
    pub days_remaining: i64,
    pub is_trial_expired: bool,
    pub is_active: bool,
    pub can_perform_action: bool,
}

impl SubscriptionStatus {
    /// Evaluate a factory's subscription at `now`
    pub fn evaluate(factory: &Factory, now: DateTime<Utc>) -> Self {
        let state = SubscriptionState::parse(&factory.subscription_status);

        if state == SubscriptionState::Lifetime {
            return Self {
                subscription_status: state.as_str().to_string(),
                trial_ends_at: None,
                plan_expiry_date: None,
                plan_type: Some("lifetime".to_string()),
                days_remaining: LIFETIME_DAYS_REMAINING,
                is_trial_expired: false,
                is_active: true,
                can_perform_action: true,
            };
        }

        let is_active = state == SubscriptionState::Active
            && factory.plan_expiry_date.map_or(false, |expiry| expiry > now);

        let is_trial_expired = state == SubscriptionState::Trial
            && factory.trial_ends_at.map_or(false, |ends| ends < now);

        let days_remaining = match (is_active, factory.plan_expiry_date, factory.trial_ends_at) {
            (true, Some(expiry), _) => days_until(expiry, now),
            (false, _, Some(trial_end)) if !is_trial_expired => days_until(trial_end, now),
            _ => 0,
        };

        Self {
            subscription_status: factory.subscription_status.clone(),
            trial_ends_at: factory.trial_ends_at,
            plan_expiry_date: factory.plan_expiry_date,
            plan_type: factory.plan_type.clone(),
            days_remaining,
            is_trial_expired,
            is_active,
            can_perform_action: is_active || !is_trial_expired,
        }
    }
}

/// Whole days from `now` until `end`, never negative
fn days_until(end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ((end - now).num_seconds() / 86_400).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory(status: &str) -> Factory {
        Factory {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Shree Bricks".to_string(),
            location: None,
            subscription_status: status.to_string(),
            trial_ends_at: None,
            plan_expiry_date: None,
            plan_type: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_fresh_trial_can_act() {
        let now = Utc::now();
        let mut f = factory("trial");
        f.trial_ends_at = Some(now + Duration::days(10) + Duration::hours(1));

        let status = SubscriptionStatus::evaluate(&f, now);
        assert!(!status.is_trial_expired);
        assert!(!status.is_active);
        assert!(status.can_perform_action);
        assert_eq!(status.days_remaining, 10);
    }

    #[test]
    fn test_expired_trial_is_blocked() {
        let now = Utc::now();
        let mut f = factory("trial");
        f.trial_ends_at = Some(now - Duration::days(1));

        let status = SubscriptionStatus::evaluate(&f, now);
        assert!(status.is_trial_expired);
        assert!(!status.can_perform_action);
        assert_eq!(status.days_remaining, 0);
    }

    #[test]
    fn test_active_plan_counts_plan_days() {
        let now = Utc::now();
        let mut f = factory("active");
        f.plan_expiry_date = Some(now + Duration::days(365));
        f.plan_type = Some("yearly".to_string());

        let status = SubscriptionStatus::evaluate(&f, now);
        assert!(status.is_active);
        assert!(status.can_perform_action);
        assert_eq!(status.days_remaining, 365);
    }

    #[test]
    fn test_lapsed_plan_is_not_active_but_not_trial_expired() {
        let now = Utc::now();
        let mut f = factory("active");
        f.plan_expiry_date = Some(now - Duration::days(2));

        let status = SubscriptionStatus::evaluate(&f, now);
        assert!(!status.is_active);
        assert!(!status.is_trial_expired);
        // Mirrors the paywall rule: only an expired trial blocks actions
        assert!(status.can_perform_action);
    }

    #[test]
    fn test_lifetime() {
        let status = SubscriptionStatus::evaluate(&factory("lifetime"), Utc::now());
        assert!(status.is_active);
        assert_eq!(status.days_remaining, LIFETIME_DAYS_REMAINING);
        assert_eq!(status.plan_type.as_deref(), Some("lifetime"));
    }

    #[test]
    fn test_plan_ids() {
        assert_eq!(Plan::from_id("monthly"), Some(Plan::Monthly));
        assert_eq!(Plan::from_id("yearly").map(|p| p.duration().num_days()), Some(365));
        assert_eq!(Plan::from_id("weekly"), None);
    }

    #[test]
    fn test_status_wire_format() {
        let status = SubscriptionStatus::evaluate(&factory("lifetime"), Utc::now());
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["subscription_status"], "lifetime");
        assert_eq!(json["days_remaining"], LIFETIME_DAYS_REMAINING);
        assert_eq!(json["can_perform_action"], true);
        assert!(json["trial_ends_at"].is_null());
        assert_eq!(serde_json::to_string(&SubscriptionState::Active).unwrap(), "\"active\"");
    }
}
