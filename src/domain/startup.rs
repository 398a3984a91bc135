use std::fmt;

// Phases the route server passes through before it accepts connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupPhase {
    Uninitialized,
    MiddlewareRegistered,
    RoutesRegistered,
    DevAssetsWired,
    ProdAssetsChecked,
    Listening,
    Failed,
}

impl StartupPhase {
    pub fn can_advance_to(self, next: StartupPhase) -> bool {
        use StartupPhase::*;
        matches!(
            (self, next),
            (Uninitialized, MiddlewareRegistered)
                | (MiddlewareRegistered, RoutesRegistered)
                | (RoutesRegistered, DevAssetsWired)
                | (RoutesRegistered, ProdAssetsChecked)
                | (DevAssetsWired, Listening)
                | (ProdAssetsChecked, Listening)
                // Failure is only reachable from the listen step.
                | (DevAssetsWired, Failed)
                | (ProdAssetsChecked, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, StartupPhase::Listening | StartupPhase::Failed)
    }
}

impl fmt::Display for StartupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StartupPhase::Uninitialized => "uninitialized",
            StartupPhase::MiddlewareRegistered => "middleware_registered",
            StartupPhase::RoutesRegistered => "routes_registered",
            StartupPhase::DevAssetsWired => "dev_assets_wired",
            StartupPhase::ProdAssetsChecked => "prod_assets_checked",
            StartupPhase::Listening => "listening",
            StartupPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}
