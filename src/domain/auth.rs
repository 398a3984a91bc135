use crate::domain::{AuthError, LoginRequest};
use async_trait::async_trait;
use axum::http::HeaderMap;
use serde_json::Value;

// Authentication is owned by an external collaborator. Handlers depend on this
// port and pass the raw request headers through untouched; no session or token
// scheme is assumed here.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn login(&self, req: LoginRequest, headers: &HeaderMap) -> Result<Value, AuthError>;

    async fn logout(&self, headers: &HeaderMap) -> Result<Value, AuthError>;

    async fn current_user(&self, headers: &HeaderMap) -> Result<Value, AuthError>;
}

// Default provider used until a real collaborator is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredAuth;

#[async_trait]
impl AuthProvider for UnconfiguredAuth {
    async fn login(&self, _req: LoginRequest, _headers: &HeaderMap) -> Result<Value, AuthError> {
        Err(AuthError::NotConfigured)
    }

    async fn logout(&self, _headers: &HeaderMap) -> Result<Value, AuthError> {
        Err(AuthError::NotConfigured)
    }

    async fn current_user(&self, _headers: &HeaderMap) -> Result<Value, AuthError> {
        Err(AuthError::NotConfigured)
    }
}
