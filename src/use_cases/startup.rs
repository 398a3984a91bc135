use crate::domain::{StartupError, StartupPhase};

// Tracks the route server's startup sequence and rejects out-of-order steps.
#[derive(Debug)]
pub struct StartupTracker {
    phase: StartupPhase,
}

impl StartupTracker {
    pub fn new() -> Self {
        Self {
            phase: StartupPhase::Uninitialized,
        }
    }

    pub fn phase(&self) -> StartupPhase {
        self.phase
    }

    pub fn advance(&mut self, next: StartupPhase) -> Result<(), StartupError> {
        if !self.phase.can_advance_to(next) {
            return Err(StartupError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::debug!(from = %self.phase, to = %next, "startup phase advanced");
        self.phase = next;
        Ok(())
    }

    // Marks the listen step as failed. Callers still surface the underlying error.
    pub fn fail(&mut self) -> Result<(), StartupError> {
        self.advance(StartupPhase::Failed)
    }
}

impl Default for StartupTracker {
    fn default() -> Self {
        Self::new()
    }
}
