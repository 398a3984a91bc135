use crate::interface_adapters::handlers::auth::{current_user, login, logout};
use crate::interface_adapters::handlers::health::health;
use crate::interface_adapters::protocol::error_response;
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{MethodFilter, MethodRouter, on},
};
use std::sync::Arc;

// Every backend route lives under this prefix; everything else belongs to the UI bundle.
pub const API_PREFIX: &str = "/api";

// Request body ceiling applied to the whole router.
pub const MAX_BODY_BYTES: usize = 100 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteHandler {
    Health,
    Login,
    Logout,
    CurrentUser,
}

#[derive(Debug, Clone, Copy)]
pub struct RouteEntry {
    pub method: MethodFilter,
    pub path: &'static str,
    pub handler: RouteHandler,
}

// Static route table. New endpoints are added here, nowhere else.
pub const ROUTES: &[RouteEntry] = &[
    RouteEntry {
        method: MethodFilter::GET,
        path: "/api/health",
        handler: RouteHandler::Health,
    },
    RouteEntry {
        method: MethodFilter::POST,
        path: "/api/auth/login",
        handler: RouteHandler::Login,
    },
    RouteEntry {
        method: MethodFilter::POST,
        path: "/api/auth/logout",
        handler: RouteHandler::Logout,
    },
    RouteEntry {
        method: MethodFilter::GET,
        path: "/api/users/me",
        handler: RouteHandler::CurrentUser,
    },
];

fn method_router(entry: &RouteEntry) -> MethodRouter<Arc<AppState>> {
    match entry.handler {
        RouteHandler::Health => on(entry.method, health),
        RouteHandler::Login => on(entry.method, login),
        RouteHandler::Logout => on(entry.method, logout),
        RouteHandler::CurrentUser => on(entry.method, current_user),
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    // Wire the HTTP routes to their handlers.
    ROUTES
        .iter()
        .fold(Router::<Arc<AppState>>::new(), |router, entry| {
            router.route(entry.path, method_router(entry))
        })
        .with_state(state)
}

// `/api` itself and anything below it. `/apiary` is a UI path.
pub fn is_api_path(path: &str) -> bool {
    path.strip_prefix(API_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

// Response for requests no route or asset handled.
pub async fn fallthrough(uri: Uri) -> Response {
    if is_api_path(uri.path()) {
        return error_response(StatusCode::NOT_FOUND, "Not found").into_response();
    }
    StatusCode::NOT_FOUND.into_response()
}
