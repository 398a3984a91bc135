// Shared server bootstrap, bundle fixture and auth double for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, http::HeaderMap, http::header::COOKIE};
use educare_gateway::domain::{AuthError, AuthProvider, LoginRequest};
use educare_gateway::interface_adapters::assets::AssetMode;
use serde_json::{Value, json};
use std::{
    net::SocketAddr,
    path::PathBuf,
    sync::{Arc, OnceLock, mpsc},
    time::{Duration, Instant},
};

pub const INDEX_HTML: &str = "<!doctype html><title>TherMite Educare OS</title>";
pub const APP_JS: &str = "console.log('educare');";

// Origin of the shared server, set once by the first test that needs it.
static SERVER_ORIGIN: OnceLock<String> = OnceLock::new();


// Stand-in for the external auth collaborator.
pub struct FakeAuth;

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn login(&self, req: LoginRequest, _headers: &HeaderMap) -> Result<Value, AuthError> {
        if req.password != "correct-horse" {
            return Err(AuthError::Rejected("Invalid email or password".to_string()));
        }
        Ok(json!({ "user": { "email": req.email, "role": "admin" } }))
    }

    async fn logout(&self, _headers: &HeaderMap) -> Result<Value, AuthError> {
        Ok(json!({ "success": true }))
    }

    async fn current_user(&self, headers: &HeaderMap) -> Result<Value, AuthError> {
        match headers.get(COOKIE) {
            Some(_) => Ok(json!({ "email": "admin@educare.test" })),
            None => Err(AuthError::Rejected("Not authenticated".to_string())),
        }
    }
}

// Writes a minimal built bundle that outlives every test in the binary.
fn write_bundle() -> PathBuf {
    let dist = std::env::temp_dir().join(format!("educare-dist-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(dist.join("assets")).expect("create dist dir");
    std::fs::write(dist.join("index.html"), INDEX_HTML).expect("write index");
    std::fs::write(dist.join("assets/app.js"), APP_JS).expect("write app.js");
    dist
}

// Start the shared route server once and return its origin (no `/api`).
pub fn ensure_server() -> &'static str {
    SERVER_ORIGIN.get_or_init(|| {
        let dist_dir = write_bundle();
        let (addr_tx, addr_rx) = mpsc::channel::<SocketAddr>();

        // The server gets its own thread and runtime so it outlives every `#[tokio::test]` runtime.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("server runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("server addr");
                addr_tx.send(addr).expect("publish server addr");
                educare_gateway::run(
                    listener,
                    AssetMode::Production { dist_dir },
                    Arc::new(FakeAuth),
                )
                .await
                .expect("server failed");
            });
        });

        let addr = addr_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("server did not bind in time");
        wait_until_accepting(addr);
        format!("http://{addr}")
    })
}

// Serve `router` on an ephemeral port inside the current test runtime.
pub async fn spawn_router(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral mock port");
    let addr = listener.local_addr().expect("get mock addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock server failed");
    });
    format!("http://{addr}")
}

// The listener is bound before the address is published; poll until accept is live.
fn wait_until_accepting(addr: SocketAddr) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("server at {addr} did not accept connections in time");
}
