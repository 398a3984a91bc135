// Framework bootstrap for the route server runtime.

use crate::domain::{AuthProvider, StartupError, StartupPhase, UnconfiguredAuth};
use crate::frameworks::config::{self, LogFormat};
use crate::interface_adapters::assets::AssetMode;
use crate::interface_adapters::routes::{self, MAX_BODY_BYTES};
use crate::interface_adapters::state::AppState;
use crate::use_cases::StartupTracker;

use axum::{Router, extract::DefaultBodyLimit};
use std::{backtrace::Backtrace, net::SocketAddr, sync::Arc};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

fn init_runtime() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    match config::log_format() {
        LogFormat::Json => subscriber.json().with_current_span(true).init(),
        LogFormat::Compact => subscriber.compact().init(),
    }

    // Route panics through tracing.
    std::panic::set_hook(Box::new(|info| {
        tracing::error!(%info, backtrace = %Backtrace::capture(), "panic");
    }));
}

// Registers middleware, the route table and the asset branch, in that order.
pub fn build_app(
    state: Arc<AppState>,
    assets: &AssetMode,
    tracker: &mut StartupTracker,
) -> Result<Router, StartupError> {
    // Body limits and request tracing wrap every request, API or asset.
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));
    tracker.advance(StartupPhase::MiddlewareRegistered)?;

    let app = routes::app(state);
    tracker.advance(StartupPhase::RoutesRegistered)?;

    let app = assets.prepare(app)?;
    tracker.advance(assets.phase())?;

    Ok(app.layer(middleware))
}

// Serves on an already bound listener. Used by tests and by `run_with_config`.
pub async fn run(
    listener: tokio::net::TcpListener,
    assets: AssetMode,
    auth: Arc<dyn AuthProvider>,
) -> Result<(), StartupError> {
    let mut tracker = StartupTracker::new();
    let app = build_app(Arc::new(AppState { auth }), &assets, &mut tracker)?;
    listen(listener, app, &mut tracker, std::future::pending()).await
}

pub async fn run_with_config() -> Result<(), StartupError> {
    init_runtime();

    let mode = config::server_mode();
    let assets = config::asset_mode_for(mode);
    let address = SocketAddr::new(config::bind_host(), config::http_port());
    tracing::debug!(?mode, ?assets, %address, "server configured");

    let mut tracker = StartupTracker::new();
    start(
        address,
        &assets,
        Arc::new(UnconfiguredAuth),
        &mut tracker,
        shutdown_signal(),
    )
    .await
}

// Builds the app, then binds `address` last. A bind failure is the one fatal
// startup condition: the tracker ends in `Failed` and the error is returned.
pub async fn start(
    address: SocketAddr,
    assets: &AssetMode,
    auth: Arc<dyn AuthProvider>,
    tracker: &mut StartupTracker,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), StartupError> {
    let app = build_app(Arc::new(AppState { auth }), assets, tracker).inspect_err(|e| {
        tracing::error!(error = %e, "failed to build app");
    })?;

    let listener = match tokio::net::TcpListener::bind(address).await {
        Ok(l) => l,
        Err(source) => {
            tracker.fail()?;
            tracing::error!(%address, error = %source, "failed to bind");
            return Err(StartupError::Bind { address, source });
        }
    };

    listen(listener, app, tracker, shutdown).await
}

async fn listen(
    listener: tokio::net::TcpListener,
    app: Router,
    tracker: &mut StartupTracker,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), StartupError> {
    let address = listener.local_addr().map_err(StartupError::Serve)?;
    tracker.advance(StartupPhase::Listening)?;
    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(StartupError::Serve)
        .inspect_err(|e| {
            tracing::error!(error = %e, "server error");
        })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        // Without a signal handler, keep serving until the process is killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            auth: Arc::new(UnconfiguredAuth),
        })
    }

    #[test]
    fn when_production_app_is_built_then_tracker_reaches_prod_assets_checked() {
        let dist = tempfile::tempdir().expect("expected temp dir");
        let assets = AssetMode::Production {
            dist_dir: dist.path().to_path_buf(),
        };
        let mut tracker = StartupTracker::new();

        build_app(state(), &assets, &mut tracker).expect("expected app to build");

        assert_eq!(tracker.phase(), StartupPhase::ProdAssetsChecked);
    }

    #[test]
    fn when_dev_asset_url_is_invalid_then_build_stops_after_routes() {
        let assets = AssetMode::Development {
            dev_server_url: "::not-a-url::".to_string(),
        };
        let mut tracker = StartupTracker::new();

        let result = build_app(state(), &assets, &mut tracker);

        assert!(matches!(result, Err(StartupError::InvalidAssetUrl { .. })));
        assert_eq!(tracker.phase(), StartupPhase::RoutesRegistered);
    }

    #[tokio::test]
    async fn when_port_is_taken_then_start_fails_with_bind_error_and_tracker_failed() {
        let held = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("hold a port");
        let address = held.local_addr().expect("held addr");
        let dist = tempfile::tempdir().expect("expected temp dir");
        let assets = AssetMode::Production {
            dist_dir: dist.path().to_path_buf(),
        };
        let mut tracker = StartupTracker::new();

        let result = start(
            address,
            &assets,
            Arc::new(UnconfiguredAuth),
            &mut tracker,
            std::future::pending(),
        )
        .await;

        match result {
            Err(StartupError::Bind { address: failed, .. }) => assert_eq!(failed, address),
            other => panic!("expected bind error, got {other:?}"),
        }
        assert_eq!(tracker.phase(), StartupPhase::Failed);
        drop(held);
    }

    #[test]
    fn when_tracker_was_already_used_then_build_is_rejected() {
        let dist = tempfile::tempdir().expect("expected temp dir");
        let assets = AssetMode::Production {
            dist_dir: dist.path().to_path_buf(),
        };
        let mut tracker = StartupTracker::new();
        build_app(state(), &assets, &mut tracker).expect("expected first build");

        let result = build_app(state(), &assets, &mut tracker);

        assert!(matches!(
            result,
            Err(StartupError::InvalidTransition { .. })
        ));
    }
}
