//! Authentication middleware
//!
//! JWT validation, the authenticated-user extractor, and the factory scope
//! every data endpoint runs under.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use shared::models::{Factory, SubscriptionStatus};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::{AuthService, FactoryService};
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => {
            return AppError::InvalidToken("Missing or invalid Authorization header".to_string())
                .into_response();
        }
    };

    let claims = match AuthService::decode_token(token, &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(err) => return err.into_response(),
    };

    let user_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => {
            return AppError::InvalidToken("Invalid user ID in token".to_string()).into_response()
        }
    };

    request.extensions_mut().insert(AuthUser {
        user_id,
        email: claims.email,
    });

    next.run(request).await
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::InvalidToken("Authentication required".to_string()))
    }
}

/// The caller's factory, resolved once per request
///
/// Services take the factory id from here; no handler looks the factory up
/// on its own.
#[derive(Clone, Debug)]
pub struct FactoryContext {
    pub user: AuthUser,
    pub factory: Factory,
    pub subscription: SubscriptionStatus,
}

impl FactoryContext {
    pub fn factory_id(&self) -> Uuid {
        self.factory.id
    }

    /// Gate for anything that writes factory data
    pub fn require_active(&self) -> Result<(), AppError> {
        if self.subscription.can_perform_action {
            Ok(())
        } else {
            tracing::info!(
                factory_id = %self.factory.id,
                "Write refused, subscription lapsed"
            );
            Err(AppError::SubscriptionRequired)
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for FactoryContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        let factory = FactoryService::new(state.db.clone(), state.config.subscription.trial_days)
            .find_by_owner(user.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Factory".to_string()))?;

        let subscription = SubscriptionStatus::evaluate(&factory, Utc::now());

        Ok(FactoryContext {
            user,
            factory,
            subscription,
        })
    }
}
