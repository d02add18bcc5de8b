//! Operator overview of every registered user
//!
//! Guarded by a PIN from configuration rather than a user token. With no PIN
//! configured the overview is switched off.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{Factory, SubscriptionState, SubscriptionStatus};
use sqlx::PgPool;
use uuid::Uuid;

use super::factory::FACTORY_COLUMNS;
use crate::error::{AppError, AppResult};

/// Header carrying the PIN on admin reads, kept out of the logged URI
pub const ADMIN_PIN_HEADER: &str = "x-admin-pin";

/// Admin service
#[derive(Clone)]
pub struct AdminService {
    db: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct VerifyPinRequest {
    pub pin: String,
}

/// Subscription shown next to a user in the overview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubscriptionLabel {
    /// Registered but no factory created yet
    Free,
    Trial,
    Premium,
    Expired,
    Lifetime,
}

/// One row of the user overview
#[derive(Debug, Clone, Serialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub factory_name: Option<String>,
    pub location: Option<String>,
    pub subscription_status: SubscriptionLabel,
    pub days_left: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A registered user as stored
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Check a supplied PIN against the configured one
pub fn verify_pin(configured: Option<&str>, supplied: &str) -> AppResult<()> {
    let expected = configured
        .filter(|pin| !pin.is_empty())
        .ok_or_else(|| AppError::Forbidden("Admin access is not enabled".to_string()))?;

    if pins_match(expected.as_bytes(), supplied.as_bytes()) {
        Ok(())
    } else {
        tracing::warn!("Rejected admin PIN");
        Err(AppError::InvalidAdminPin)
    }
}

/// Equality that inspects every byte regardless of where the first mismatch is
fn pins_match(expected: &[u8], supplied: &[u8]) -> bool {
    expected.len() == supplied.len()
        && expected
            .iter()
            .zip(supplied)
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}

/// Label and days left for a user's factory at `now`
pub fn subscription_label(
    factory: Option<&Factory>,
    now: DateTime<Utc>,
) -> (SubscriptionLabel, Option<i64>) {
    let Some(factory) = factory else {
        return (SubscriptionLabel::Free, None);
    };

    let status = SubscriptionStatus::evaluate(factory, now);
    match SubscriptionState::parse(&factory.subscription_status) {
        SubscriptionState::Lifetime => (SubscriptionLabel::Lifetime, None),
        _ if status.is_active => (SubscriptionLabel::Premium, Some(status.days_remaining)),
        SubscriptionState::Trial if !status.is_trial_expired => (
            SubscriptionLabel::Trial,
            factory.trial_ends_at.map(|_| status.days_remaining),
        ),
        _ => (SubscriptionLabel::Expired, Some(0)),
    }
}

/// Join users to their factories, newest registration first
pub fn build_overview(
    users: Vec<UserRow>,
    factories: Vec<Factory>,
    now: DateTime<Utc>,
) -> Vec<AdminUser> {
    let by_owner: HashMap<Uuid, Factory> =
        factories.into_iter().map(|f| (f.owner_id, f)).collect();

    let mut overview: Vec<AdminUser> = users
        .into_iter()
        .map(|user| {
            let factory = by_owner.get(&user.id);
            let (subscription_status, days_left) = subscription_label(factory, now);
            AdminUser {
                id: user.id,
                email: user.email,
                factory_name: factory.map(|f| f.name.clone()),
                location: factory.and_then(|f| f.location.clone()),
                subscription_status,
                days_left,
                created_at: user.created_at,
            }
        })
        .collect();

    overview.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    overview
}

impl AdminService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_users(&self) -> AppResult<Vec<AdminUser>> {
        let users = sqlx::query_as::<_, (Uuid, String, DateTime<Utc>)>(
            "SELECT id, email, created_at FROM users",
        )
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|(id, email, created_at)| UserRow { id, email, created_at })
        .collect();

        let factories = sqlx::query_as::<_, Factory>(&format!(
            "SELECT {} FROM factories",
            FACTORY_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        let overview = build_overview(users, factories, Utc::now());
        tracing::info!(users = overview.len(), "Admin user overview served");

        Ok(overview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn factory(owner_id: Uuid, status: &str) -> Factory {
        Factory {
            id: Uuid::new_v4(),
            owner_id,
            name: "Sri Venkateswara Bricks".to_string(),
            location: Some("Vijayawada".to_string()),
            subscription_status: status.to_string(),
            trial_ends_at: None,
            plan_expiry_date: None,
            plan_type: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_pin_checks() {
        assert!(verify_pin(Some("4821"), "4821").is_ok());
        assert!(matches!(verify_pin(Some("4821"), "4822"), Err(AppError::InvalidAdminPin)));
        assert!(matches!(verify_pin(Some("4821"), "48210"), Err(AppError::InvalidAdminPin)));
        assert!(matches!(verify_pin(None, "4821"), Err(AppError::Forbidden(_))));
        assert!(matches!(verify_pin(Some(""), ""), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_labels() {
        let now = Utc::now();
        let owner = Uuid::new_v4();

        assert_eq!(subscription_label(None, now), (SubscriptionLabel::Free, None));

        let lifetime = factory(owner, "lifetime");
        assert_eq!(subscription_label(Some(&lifetime), now), (SubscriptionLabel::Lifetime, None));

        let mut premium = factory(owner, "active");
        premium.plan_expiry_date = Some(now + Duration::days(20) + Duration::hours(1));
        assert_eq!(subscription_label(Some(&premium), now), (SubscriptionLabel::Premium, Some(20)));

        let mut lapsed = premium.clone();
        lapsed.plan_expiry_date = Some(now - Duration::days(1));
        assert_eq!(subscription_label(Some(&lapsed), now), (SubscriptionLabel::Expired, Some(0)));

        let mut trial = factory(owner, "trial");
        trial.trial_ends_at = Some(now + Duration::days(5) + Duration::hours(1));
        assert_eq!(subscription_label(Some(&trial), now), (SubscriptionLabel::Trial, Some(5)));

        trial.trial_ends_at = None;
        assert_eq!(subscription_label(Some(&trial), now), (SubscriptionLabel::Trial, None));

        trial.trial_ends_at = Some(now - Duration::hours(1));
        assert_eq!(subscription_label(Some(&trial), now), (SubscriptionLabel::Expired, Some(0)));

        let expired = factory(owner, "expired");
        assert_eq!(subscription_label(Some(&expired), now), (SubscriptionLabel::Expired, Some(0)));
    }

    #[test]
    fn test_overview_joins_and_orders() {
        let now = Utc::now();
        let early = UserRow {
            id: Uuid::new_v4(),
            email: "early@brickworks.in".to_string(),
            created_at: now - Duration::days(40),
        };
        let late = UserRow {
            id: Uuid::new_v4(),
            email: "late@brickworks.in".to_string(),
            created_at: now - Duration::days(1),
        };
        let factories = vec![factory(early.id, "lifetime")];

        let overview = build_overview(vec![early.clone(), late.clone()], factories, now);

        assert_eq!(overview[0].email, "late@brickworks.in");
        assert_eq!(overview[0].subscription_status, SubscriptionLabel::Free);
        assert_eq!(overview[0].factory_name, None);
        assert_eq!(overview[1].id, early.id);
        assert_eq!(overview[1].subscription_status, SubscriptionLabel::Lifetime);
        assert_eq!(overview[1].location.as_deref(), Some("Vijayawada"));
    }
}
