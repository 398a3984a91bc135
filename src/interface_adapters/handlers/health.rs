use crate::domain::HealthStatus;
use axum::Json;

// Liveness check; never touches state.
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::ok())
}
