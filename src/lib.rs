pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use domain::BuildMode;
pub use frameworks::config::http_port;
pub use frameworks::server::{run, run_with_config};
pub use interface_adapters::clients::api::{
    ApiClient, ApiError, Credentials, RequestOptions, resolve_base_address,
};
