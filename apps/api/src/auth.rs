//! Request identity and access checks.
//!
//! Authentication happens upstream: the gateway verifies the session and
//! forwards the user id in the `x-user-id` header. This module only trusts
//! that header and checks what the user is allowed to generate.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::store::ContentStore;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Permission required for lesson plans, unit plans, feedback and the follow-up endpoints.
pub const CREATE_CHAT: &str = "create:chat";

/// The verified caller of a request.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<Uuid>().ok())
            .ok_or(AppError::Unauthorized)?;
        Ok(CurrentUser { id })
    }
}

/// What a route requires of its caller beyond being authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Authenticated,
    Permission(&'static str),
    ValidSubscription,
}

/// Aborts with 401/403 unless the user satisfies `access`. Runs before any
/// persistence or generation.
pub async fn require_access(
    store: &dyn ContentStore,
    user: CurrentUser,
    access: Access,
) -> Result<(), AppError> {
    let account = store
        .user_access(user.id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    match access {
        Access::Authenticated => Ok(()),
        Access::Permission(permission) if account.has_permission(permission) => Ok(()),
        Access::Permission(permission) => Err(AppError::Forbidden(format!(
            "You do not have the '{permission}' permission"
        ))),
        Access::ValidSubscription if account.has_valid_subscription(Utc::now()) => Ok(()),
        Access::ValidSubscription => Err(AppError::Forbidden(
            "An active subscription is required".to_string(),
        )),
    }
}
