//! Session identity and lifecycle status.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a process session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a process session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Process is running
    Running,
    /// Process exited on its own
    Exited,
    /// Process was killed by us
    Terminated,
}

impl SessionStatus {
    /// Whether the session can still accept input.
    pub fn is_running(&self) -> bool {
        matches!(self, SessionStatus::Running)
    }
}
