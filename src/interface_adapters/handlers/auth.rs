use crate::domain::{AuthError, LoginRequest};
use crate::interface_adapters::extract::Payload;
use crate::interface_adapters::protocol::{ErrorResponse, error_response};
use crate::interface_adapters::state::AppState;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde_json::Value;
use std::sync::Arc;

type AuthResult = Result<Json<Value>, (StatusCode, Json<ErrorResponse>)>;

#[tracing::instrument(name = "login", skip_all)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Payload(body): Payload<LoginRequest>,
) -> AuthResult {
    let reply = state.auth.login(body, &headers).await.map_err(map_auth_error)?;
    tracing::info!("login forwarded to auth provider.");
    Ok(Json(reply))
}

#[tracing::instrument(name = "logout", skip_all)]
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> AuthResult {
    let reply = state.auth.logout(&headers).await.map_err(map_auth_error)?;
    Ok(Json(reply))
}

#[tracing::instrument(name = "current_user", skip_all)]
pub async fn current_user(State(state): State<Arc<AppState>>, headers: HeaderMap) -> AuthResult {
    let reply = state
        .auth
        .current_user(&headers)
        .await
        .map_err(map_auth_error)?;
    Ok(Json(reply))
}

// Maps auth port errors to HTTP responses.
fn map_auth_error(err: AuthError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        AuthError::NotConfigured => {
            tracing::warn!("auth provider is not configured.");
            error_response(StatusCode::NOT_IMPLEMENTED, "authentication is not configured")
        }
        AuthError::Rejected(message) => error_response(StatusCode::UNAUTHORIZED, &message),
        AuthError::Upstream(message) => {
            tracing::error!(error = %message, "auth provider failed.");
            error_response(StatusCode::BAD_GATEWAY, &message)
        }
    }
}
