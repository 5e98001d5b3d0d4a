//! Error types for keyedit.

use thiserror::Error;

/// Main error type for keyedit operations.
///
/// Variants that originate in the external program carry its raw output so
/// callers can act on the diagnostic text (for example "bad passphrase").
#[derive(Debug, Error)]
pub enum Error {
    /// The external program could not be started
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        /// Program that failed to start
        command: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Writing to the process input failed
    #[error("Failed to write to process input: {0}")]
    Write(#[source] std::io::Error),

    /// Session already terminated
    #[error("Session already terminated")]
    SessionTerminated,

    /// Operation attempted on an editor that is not active
    #[error("Cannot call function on an inactive editor")]
    EditorInactive,

    /// The process ended before the expected marker appeared
    #[error("Process ended before '{marker}' appeared:\n\n=====\n{output}\n=====")]
    Protocol {
        /// Marker line that was awaited
        marker: String,
        /// Output captured since the previous marker
        output: String,
        /// Everything the process wrote to stderr
        stderr: String,
    },

    /// Timeout waiting for a marker or for process exit
    #[error("Timeout waiting for '{marker}' after {waited_ms}ms:\n\n=====\n{output}\n=====")]
    WaitTimeout {
        /// Marker (or exit) that was awaited
        marker: String,
        /// Time waited in milliseconds
        waited_ms: u64,
        /// Output captured since the previous marker
        output: String,
    },

    /// A batch invocation exited unsuccessfully
    #[error("Encountered an error executing a GPG command (exit code {code:?}):\n\n=====\n{output}\n=====")]
    BatchFailed {
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Captured stdout followed by stderr
        output: String,
    },

    /// Parse error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A protocol token outside its closed set
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with custom message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Raw external-program text attached to this error, if any.
    pub fn output(&self) -> Option<&str> {
        match self {
            Error::Protocol { output, .. }
            | Error::WaitTimeout { output, .. }
            | Error::BatchFailed { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Whether the error means the underlying process is gone.
    pub fn is_fatal_to_session(&self) -> bool {
        matches!(
            self,
            Error::Protocol { .. } | Error::WaitTimeout { .. } | Error::SessionTerminated
        )
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
