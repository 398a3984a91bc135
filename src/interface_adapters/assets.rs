use crate::domain::{StartupError, StartupPhase};
use crate::interface_adapters::protocol::error_response;
use crate::interface_adapters::routes::{MAX_BODY_BYTES, fallthrough, is_api_path};
use axum::{
    Router,
    body::{Body, to_bytes},
    extract::Request,
    http::{
        StatusCode,
        header::{CONNECTION, HOST, TRANSFER_ENCODING},
    },
    response::{IntoResponse, Response},
};
use reqwest::Url;
use std::path::{Path, PathBuf};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

// Entry document of the built UI bundle.
pub const INDEX_DOCUMENT: &str = "index.html";

// How non-API requests are answered. Server startup only sees `prepare`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetMode {
    // Assets and module reload are owned by an external dev server; non-API requests go there.
    Development { dev_server_url: String },
    // Serve the built bundle from disk, falling back to its entry document.
    Production { dist_dir: PathBuf },
}

impl AssetMode {
    // Phase reached once `prepare` succeeds.
    pub fn phase(&self) -> StartupPhase {
        match self {
            AssetMode::Development { .. } => StartupPhase::DevAssetsWired,
            AssetMode::Production { .. } => StartupPhase::ProdAssetsChecked,
        }
    }

    pub fn prepare(&self, app: Router) -> Result<Router, StartupError> {
        match self {
            AssetMode::Development { dev_server_url } => wire_dev_assets(app, dev_server_url),
            AssetMode::Production { dist_dir } => Ok(check_prod_assets(app, dist_dir)),
        }
    }
}

fn wire_dev_assets(app: Router, dev_server_url: &str) -> Result<Router, StartupError> {
    let base = Url::parse(dev_server_url).map_err(|err| StartupError::InvalidAssetUrl {
        url: dev_server_url.to_string(),
        reason: err.to_string(),
    })?;
    if base.cannot_be_a_base() {
        return Err(StartupError::InvalidAssetUrl {
            url: dev_server_url.to_string(),
            reason: "url cannot be used as a base".to_string(),
        });
    }

    tracing::info!(dev_server_url = %base, "forwarding UI requests to development asset server");
    let proxy = DevAssetProxy {
        http: reqwest::Client::new(),
        base,
    };

    Ok(app.fallback(move |req: Request| {
        let proxy = proxy.clone();
        async move { proxy.forward(req).await }
    }))
}

fn check_prod_assets(app: Router, dist_dir: &Path) -> Router {
    if !dist_dir.is_dir() {
        // Not fatal: the API stays up without the bundle.
        tracing::warn!(
            dist_dir = %dist_dir.display(),
            "built assets directory not found, static serving skipped"
        );
        return app.fallback(fallthrough);
    }

    tracing::info!(dist_dir = %dist_dir.display(), "serving built UI bundle");
    let serve = ServeDir::new(dist_dir).fallback(ServeFile::new(dist_dir.join(INDEX_DOCUMENT)));

    app.fallback(move |req: Request| {
        let serve = serve.clone();
        async move { serve_bundle(serve, req).await }
    })
}

async fn serve_bundle(serve: ServeDir<ServeFile>, req: Request) -> Response {
    // Unknown API paths must never be answered with the UI document.
    if is_api_path(req.uri().path()) {
        return fallthrough(req.uri().clone()).await;
    }

    match serve.oneshot(req).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

// Forwards UI requests to the external development asset server.
#[derive(Clone)]
struct DevAssetProxy {
    http: reqwest::Client,
    base: Url,
}

impl DevAssetProxy {
    async fn forward(&self, req: Request) -> Response {
        if is_api_path(req.uri().path()) {
            return fallthrough(req.uri().clone()).await;
        }

        let path_and_query = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());
        let url = match self.base.join(&path_and_query) {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!(path = %path_and_query, error = %err, "invalid asset path");
                return StatusCode::BAD_REQUEST.into_response();
            }
        };

        let (parts, body) = req.into_parts();
        let body = match to_bytes(body, MAX_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(_) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
        };
        let mut headers = parts.headers;
        headers.remove(HOST);

        let upstream = match self
            .http
            .request(parts.method, url)
            .headers(headers)
            .body(body)
            .send()
            .await
        {
            Ok(res) => res,
            Err(err) => {
                tracing::warn!(error = %err, "development asset server unavailable");
                return error_response(
                    StatusCode::BAD_GATEWAY,
                    "development asset server unavailable",
                )
                .into_response();
            }
        };

        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        // The body is re-framed below.
        headers.remove(TRANSFER_ENCODING);
        headers.remove(CONNECTION);

        match upstream.bytes().await {
            Ok(bytes) => {
                let mut response = Response::new(Body::from(bytes));
                *response.status_mut() = status;
                *response.headers_mut() = headers;
                response
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to read development asset response");
                error_response(StatusCode::BAD_GATEWAY, "development asset server unavailable")
                    .into_response()
            }
        }
    }
}
