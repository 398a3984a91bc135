// Domain layer: payload types, ports and errors shared by the server and the client.

mod api;
mod auth;
mod errors;
mod mode;
mod startup;

// Re-export the domain boundary types and ports.
pub use api::{HealthStatus, LoginRequest};
pub use auth::{AuthProvider, UnconfiguredAuth};
pub use errors::{AuthError, StartupError};
pub use mode::BuildMode;
pub use startup::StartupPhase;
