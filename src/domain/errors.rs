use crate::domain::StartupPhase;
use std::{fmt, net::SocketAddr};

// Errors an auth collaborator can report back through the port.
#[derive(Debug)]
pub enum AuthError {
    NotConfigured,
    Rejected(String),
    Upstream(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::NotConfigured => write!(f, "authentication is not configured"),
            AuthError::Rejected(message) => write!(f, "{message}"),
            AuthError::Upstream(message) => write!(f, "auth upstream error: {message}"),
        }
    }
}

impl std::error::Error for AuthError {}

// Errors raised while bringing the route server up.
#[derive(Debug)]
pub enum StartupError {
    InvalidTransition {
        from: StartupPhase,
        to: StartupPhase,
    },
    InvalidAssetUrl {
        url: String,
        reason: String,
    },
    Bind {
        address: SocketAddr,
        source: std::io::Error,
    },
    Serve(std::io::Error),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::InvalidTransition { from, to } => {
                write!(f, "invalid startup transition {from} -> {to}")
            }
            StartupError::InvalidAssetUrl { url, reason } => {
                write!(f, "invalid development asset url {url:?}: {reason}")
            }
            StartupError::Bind { address, source } => {
                write!(f, "failed to bind {address}: {source}")
            }
            StartupError::Serve(err) => write!(f, "server error: {err}"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Bind { source, .. } => Some(source),
            StartupError::Serve(err) => Some(err),
            _ => None,
        }
    }
}
