// Build mode shared by the gateway client (base address) and the server (asset branch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Production,
    Development,
}

impl BuildMode {
    // Only the exact value `production` selects the production branch.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some("production") => BuildMode::Production,
            _ => BuildMode::Development,
        }
    }

    // The server serves the built bundle in every non-development mode: only an
    // unset value or `development` selects the development branch.
    pub fn for_server(value: Option<&str>) -> Self {
        match value {
            None | Some("development") => BuildMode::Development,
            Some(_) => BuildMode::Production,
        }
    }

    pub fn is_production(self) -> bool {
        self == BuildMode::Production
    }
}
