//! Authentication route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use bookstore_core::UserId;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::Registration;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
    pub repeat_password: String,
    pub first_name: String,
    pub last_name: String,
    pub shipping_address: String,
}

impl From<RegistrationRequest> for Registration {
    fn from(request: RegistrationRequest) -> Self {
        Self {
            email: request.email,
            password: request.password,
            repeat_password: request.repeat_password,
            first_name: request.first_name,
            last_name: request.last_name,
            shipping_address: request.shipping_address,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub shipping_address: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email.into_inner(),
            first_name: user.first_name,
            last_name: user.last_name,
            shipping_address: user.shipping_address,
        }
    }
}

/// Register a customer account.
#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegistrationRequest>,
) -> Result<Json<UserResponse>> {
    let user = state.auth().register(&request.into()).await?;
    Ok(Json(user.into()))
}

/// Login and store the user in the session.
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<UserResponse>> {
    let user = state.auth().login(&request.email, &request.password).await?;

    set_current_user(&session, &CurrentUser::from(&user))
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(Json(user.into()))
}

/// End the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}
