use crate::domain::{BuildMode, HealthStatus};
use reqwest::{
    Client, Method, StatusCode, Url,
    cookie::{CookieStore, Jar},
    header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderName, HeaderValue, SET_COOKIE},
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value, json};
use std::{fmt, sync::Arc, time::Duration};

// Relative base used when the UI is served by the route server itself.
pub const PRODUCTION_BASE_ADDRESS: &str = "/api";
// Absolute base used against a local development backend.
pub const DEVELOPMENT_BASE_ADDRESS: &str = "http://localhost:5000/api";
// Message used when an error response carries no readable `message`.
pub const FALLBACK_ERROR_MESSAGE: &str = "An unexpected error occurred";

pub fn resolve_base_address(mode: BuildMode) -> &'static str {
    match mode {
        BuildMode::Production => PRODUCTION_BASE_ADDRESS,
        BuildMode::Development => DEVELOPMENT_BASE_ADDRESS,
    }
}

// Whether cookies travel with a request and are recorded from its response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Credentials {
    #[default]
    Include,
    Omit,
}

// Per-call request description. Defaults: GET, no body, credentials included.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    pub credentials: Credentials,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            credentials: Credentials::Include,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self::default().method(Method::POST)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }
}

// The single failure shape callers see. Transport, status and decode failures
// all collapse into a message; the status is kept when one was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    message: String,
    status: Option<StatusCode>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status: Option<StatusCode>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    fn transport(err: reqwest::Error) -> Self {
        Self::new(err.to_string(), err.status())
    }

    fn decode(err: impl fmt::Display, status: StatusCode) -> Self {
        Self::new(err.to_string(), Some(status))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

// Caller headers replace defaults key by key; untouched defaults survive.
pub fn merge_headers(mut merged: HeaderMap, overrides: &HeaderMap) -> HeaderMap {
    for name in overrides.keys() {
        merged.remove(name);
        for value in overrides.get_all(name) {
            merged.append(name.clone(), value.clone());
        }
    }
    merged
}

// Thin wrapper around reqwest that every UI call goes through.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    cookies: Arc<Jar>,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            cookies: Arc::new(Jar::default()),
            base_url: base_url.into(),
        }
    }

    // A native client has no page origin, so the production relative base is
    // joined onto the origin the UI was served from.
    pub fn for_mode(mode: BuildMode, origin: &str) -> Self {
        let base_url = match mode {
            BuildMode::Production => format!(
                "{}{}",
                origin.trim_end_matches('/'),
                resolve_base_address(mode)
            ),
            BuildMode::Development => resolve_base_address(mode).to_string(),
        };
        Self::new(base_url)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::transport)?;
        Ok(Self {
            http,
            cookies: Arc::new(Jar::default()),
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let url = Url::parse(&url).map_err(|err| ApiError::new(format!("{err}: {url}"), None))?;

        let mut headers = merge_headers(default_headers(), &options.headers);
        if options.credentials == Credentials::Include && !headers.contains_key(COOKIE) {
            if let Some(cookie) = self.cookies.cookies(&url) {
                headers.insert(COOKIE, cookie);
            }
        }

        let mut builder = self
            .http
            .request(options.method.clone(), url.clone())
            .headers(headers);
        if let Some(body) = &options.body {
            let bytes = serde_json::to_vec(body).map_err(|err| ApiError::new(err.to_string(), None))?;
            builder = builder.body(bytes);
        }

        let res = builder.send().await.map_err(|err| {
            tracing::debug!(endpoint, error = %err, "api request did not complete");
            ApiError::transport(err)
        })?;
        let status = res.status();

        if options.credentials == Credentials::Include {
            let mut set_cookies = res.headers().get_all(SET_COOKIE).iter();
            self.cookies.set_cookies(&mut set_cookies, &url);
        }

        if !status.is_success() {
            let message = res
                .json::<ErrorBody>()
                .await
                .ok()
                .map(|payload| payload.message)
                .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
            tracing::debug!(endpoint, %status, %message, "api request failed");
            return Err(ApiError::new(message, Some(status)));
        }

        // No body to decode; hand back an empty object instead.
        if status == StatusCode::NO_CONTENT {
            return serde_json::from_value(Value::Object(Map::new()))
                .map_err(|err| ApiError::decode(err, status));
        }

        res.json::<T>()
            .await
            .map_err(|err| ApiError::decode(err, status))
    }

    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.request("/health", RequestOptions::get()).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Value, ApiError> {
        let body = json!({ "email": email, "password": password });
        self.request("/auth/login", RequestOptions::post().body(body))
            .await
    }

    pub async fn logout(&self) -> Result<Value, ApiError> {
        self.request("/auth/logout", RequestOptions::post()).await
    }

    pub async fn current_user(&self) -> Result<Value, ApiError> {
        self.request("/users/me", RequestOptions::get()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{ACCEPT, AUTHORIZATION};

    #[test]
    fn production_resolves_to_relative_prefix() {
        assert_eq!(resolve_base_address(BuildMode::Production), "/api");
    }

    #[test]
    fn development_resolves_to_local_backend() {
        assert_eq!(
            resolve_base_address(BuildMode::Development),
            "http://localhost:5000/api"
        );
    }

    #[test]
    fn for_mode_joins_production_prefix_onto_origin() {
        let client = ApiClient::for_mode(BuildMode::Production, "https://educare.example/");
        assert_eq!(client.base_url(), "https://educare.example/api");
    }

    #[test]
    fn for_mode_ignores_origin_in_development() {
        let client = ApiClient::for_mode(BuildMode::Development, "https://educare.example");
        assert_eq!(client.base_url(), "http://localhost:5000/api");
    }

    #[test]
    fn caller_headers_override_defaults_case_insensitively() {
        let mut overrides = HeaderMap::new();
        overrides.insert(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("text/plain"),
        );

        let merged = merge_headers(default_headers(), &overrides);

        assert_eq!(merged.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(merged[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn defaults_persist_when_caller_sets_other_headers() {
        let mut overrides = HeaderMap::new();
        overrides.insert(AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        overrides.append(ACCEPT, HeaderValue::from_static("application/json"));
        overrides.append(ACCEPT, HeaderValue::from_static("text/html"));

        let merged = merge_headers(default_headers(), &overrides);

        assert_eq!(merged[CONTENT_TYPE], "application/json");
        assert_eq!(merged[AUTHORIZATION], "Bearer t");
        assert_eq!(merged.get_all(ACCEPT).iter().count(), 2);
    }

    #[test]
    fn request_options_default_to_get_with_credentials() {
        let options = RequestOptions::default();

        assert_eq!(options.method, Method::GET);
        assert!(options.headers.is_empty());
        assert!(options.body.is_none());
        assert_eq!(options.credentials, Credentials::Include);
    }

    #[test]
    fn api_error_displays_only_its_message() {
        let err = ApiError::new("Invalid credentials", Some(StatusCode::UNAUTHORIZED));

        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }
}
