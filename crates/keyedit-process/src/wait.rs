//! Marker-based waiting on process output.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use keyedit_core::{Error, Result};

use crate::session::{lock, ProcessSession};

impl ProcessSession {
    /// Wait until a complete output line equal to `marker` appears.
    ///
    /// Only output after the previously matched marker is searched. Returns
    /// the text between that point and the start of the marker line, and
    /// moves the consumed offset past the marker line.
    ///
    /// Fails with [`Error::Protocol`] if the output closes first (the
    /// session becomes exited) and with [`Error::WaitTimeout`] if `timeout`
    /// elapses (the process is killed).
    pub async fn wait_for(&mut self, marker: &str, timeout: Duration) -> Result<String> {
        if !self.status().is_running() {
            return Err(Error::SessionTerminated);
        }

        let start = Instant::now();
        let deadline = start + timeout;
        let notify = Arc::clone(&self.stdout_notify);

        loop {
            let notified = notify.notified();

            let closed = {
                let buffer = lock(&self.stdout_buf);
                if let Some((line_start, line_end)) = buffer.find_line(marker, self.consumed) {
                    let window = buffer.slice(self.consumed, line_start);
                    debug!(
                        "Marker '{}' matched: id={}, {} bytes of output",
                        marker,
                        self.id(),
                        line_start.saturating_sub(self.consumed)
                    );
                    self.consumed = line_end;
                    return Ok(window);
                }
                buffer.is_eof()
            };

            if closed {
                warn!("Output closed before marker '{}': id={}", marker, self.id());
                return Err(self.closed_error(marker).await);
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                let output = self.pending_output();
                let waited_ms = start.elapsed().as_millis() as u64;
                warn!(
                    "Timed out after {}ms waiting for '{}': id={}",
                    waited_ms,
                    marker,
                    self.id()
                );
                self.kill().await;
                return Err(Error::WaitTimeout {
                    marker: marker.to_string(),
                    waited_ms,
                    output,
                });
            }
        }
    }

    /// Reap a process that went away while `marker` was still expected.
    ///
    /// Returns the [`Error::Protocol`] carrying whatever the process wrote
    /// after the last matched marker, including its complete stderr.
    pub async fn closed_error(&mut self, marker: &str) -> Error {
        self.mark_exited().await;
        Error::Protocol {
            marker: marker.to_string(),
            output: self.pending_output(),
            stderr: self.stderr_output(),
        }
    }
}
