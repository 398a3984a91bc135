use crate::domain::BuildMode;
use crate::interface_adapters::assets::AssetMode;
use std::{
    env,
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
};

// Runtime/server settings read from the environment.

pub const DEFAULT_HTTP_PORT: u16 = 5000;

pub fn http_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_HTTP_PORT)
}

// Log output shape, selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
}

impl LogFormat {
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

pub fn log_format() -> LogFormat {
    LogFormat::from_env_value(env::var("LOG_FORMAT").ok().as_deref())
}

pub fn bind_host() -> IpAddr {
    env::var("HOST")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

// Server branch selection; see `BuildMode::for_server`.
pub fn server_mode() -> BuildMode {
    BuildMode::for_server(env::var("NODE_ENV").ok().as_deref())
}

pub fn dist_dir() -> PathBuf {
    env::var("DIST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("dist/public"))
}

pub fn dev_asset_url() -> String {
    env::var("DEV_ASSET_URL").unwrap_or_else(|_| "http://localhost:5173".to_string())
}

pub fn asset_mode() -> AssetMode {
    asset_mode_for(server_mode())
}

pub fn asset_mode_for(mode: BuildMode) -> AssetMode {
    match mode {
        BuildMode::Production => AssetMode::Production {
            dist_dir: dist_dir(),
        },
        BuildMode::Development => AssetMode::Development {
            dev_server_url: dev_asset_url(),
        },
    }
}
