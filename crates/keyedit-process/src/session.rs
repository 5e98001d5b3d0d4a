//! Process session management.

use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use keyedit_core::{Error, Result, SessionId, SessionStatus};

use crate::output::OutputBuffer;

/// Arguments whose following value must never reach the logs.
const SECRET_FLAGS: &[&str] = &["--passphrase"];

/// Label used in timeout errors raised while waiting for exit.
pub(crate) const EXIT_MARKER: &str = "<process exit>";

/// A running external process with buffered, marker-addressable output.
///
/// All three standard streams are piped. Background tasks drain stdout and
/// stderr into append-only buffers so the child never blocks on a full
/// pipe. The child is killed when the session is dropped.
#[derive(Debug)]
pub struct ProcessSession {
    /// Session identifier
    id: SessionId,

    /// Program that was executed
    command: String,

    /// Arguments with secrets redacted
    display_args: Vec<String>,

    /// Child process handle
    child: Child,

    /// Input pipe; `None` once closed
    stdin: Option<ChildStdin>,

    /// Everything read from stdout
    pub(crate) stdout_buf: Arc<Mutex<OutputBuffer>>,

    /// Everything read from stderr
    stderr_buf: Arc<Mutex<OutputBuffer>>,

    /// Signalled whenever stdout grows or closes
    pub(crate) stdout_notify: Arc<Notify>,

    /// Reader tasks for stdout and stderr
    readers: Vec<JoinHandle<()>>,

    /// End offset of the last matched marker line
    pub(crate) consumed: usize,

    /// Current session status
    status: SessionStatus,

    /// Exit status once reaped
    exit_status: Option<ExitStatus>,

    /// Session creation time
    created_at: SystemTime,
}

pub(crate) fn lock(buffer: &Mutex<OutputBuffer>) -> MutexGuard<'_, OutputBuffer> {
    // The buffer is append-only, so a panicked writer cannot leave it torn.
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

fn redact(args: &[String]) -> Vec<String> {
    let mut hide_next = false;
    args.iter()
        .map(|arg| {
            let shown = if hide_next { "***".to_string() } else { arg.clone() };
            hide_next = SECRET_FLAGS.contains(&arg.as_str());
            shown
        })
        .collect()
}

fn spawn_reader<R>(
    mut reader: R,
    buffer: Arc<Mutex<OutputBuffer>>,
    notify: Option<Arc<Notify>>,
    stream: &'static str,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = vec![0u8; 4096];
        loop {
            match reader.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => {
                    debug!("Read {} bytes from {}", n, stream);
                    lock(&buffer).append(&chunk[..n]);
                    if let Some(notify) = &notify {
                        notify.notify_one();
                    }
                }
                Err(e) => {
                    warn!("Error reading {}: {}", stream, e);
                    break;
                }
            }
        }
        lock(&buffer).mark_eof();
        if let Some(notify) = &notify {
            notify.notify_one();
        }
    })
}

impl ProcessSession {
    /// Spawn a process with piped standard streams.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Example
    /// ```no_run
    /// # use keyedit_process::ProcessSession;
    /// # use std::time::Duration;
    /// # async fn example() -> keyedit_core::Result<()> {
    /// let mut session = ProcessSession::spawn("cat", &[])?;
    /// session.send("READY").await?;
    /// let before = session.wait_for("READY", Duration::from_secs(1)).await?;
    /// assert!(before.is_empty());
    /// session.kill().await;
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn(program: &str, args: &[String]) -> Result<Self> {
        Self::spawn_with_env(program, args, &[])
    }

    /// Spawn a process with extra environment variables.
    pub fn spawn_with_env(program: &str, args: &[String], envs: &[(&str, &str)]) -> Result<Self> {
        let display_args = redact(args);
        info!("Spawning process: command='{}' args={:?}", program, display_args);

        let mut child = Command::new(program)
            .args(args)
            .envs(envs.iter().copied())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                error!("Failed to spawn command '{}': {}", program, source);
                Error::Spawn {
                    command: program.to_string(),
                    source,
                }
            })?;

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Other("child stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Other("child stderr was not captured".to_string()))?;

        let stdout_buf = Arc::new(Mutex::new(OutputBuffer::new()));
        let stderr_buf = Arc::new(Mutex::new(OutputBuffer::new()));
        let stdout_notify = Arc::new(Notify::new());

        let readers = vec![
            spawn_reader(
                stdout,
                Arc::clone(&stdout_buf),
                Some(Arc::clone(&stdout_notify)),
                "stdout",
            ),
            spawn_reader(stderr, Arc::clone(&stderr_buf), None, "stderr"),
        ];

        let id = SessionId::new();
        info!(
            "Process spawned: id={}, command='{}', pid={:?}",
            id,
            program,
            child.id()
        );

        Ok(Self {
            id,
            command: program.to_string(),
            display_args,
            child,
            stdin,
            stdout_buf,
            stderr_buf,
            stdout_notify,
            readers,
            consumed: 0,
            status: SessionStatus::Running,
            exit_status: None,
            created_at: SystemTime::now(),
        })
    }

    /// Get the session ID.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Get the command.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Get the arguments, with secrets redacted.
    pub fn args(&self) -> &[String] {
        &self.display_args
    }

    /// Get the session creation time.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Get the current session status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Exit status, once the process has been reaped.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.exit_status
    }

    /// Check if the process is still running.
    pub fn is_alive(&mut self) -> bool {
        if !self.status.is_running() {
            return false;
        }
        match self.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                self.exit_status = Some(status);
                false
            }
            Err(_) => false,
        }
    }

    /// Full accumulated stdout text.
    pub fn output(&self) -> String {
        lock(&self.stdout_buf).text()
    }

    /// Full accumulated stderr text.
    pub fn stderr_output(&self) -> String {
        lock(&self.stderr_buf).text()
    }

    /// Stdout produced since the last matched marker.
    pub fn pending_output(&self) -> String {
        lock(&self.stdout_buf).slice_from(self.consumed)
    }

    /// Offset just past the last matched marker line.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Write `line` plus a newline to the process input and flush it.
    pub async fn send(&mut self, line: &str) -> Result<()> {
        if !self.status.is_running() {
            return Err(Error::SessionTerminated);
        }
        let stdin = self.stdin.as_mut().ok_or(Error::SessionTerminated)?;

        debug!("Writing line to process: id={}, {} bytes", self.id, line.len() + 1);
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');

        stdin.write_all(&data).await.map_err(Error::Write)?;
        stdin.flush().await.map_err(Error::Write)?;
        Ok(())
    }

    /// Close the input pipe so the process sees EOF.
    pub fn close_stdin(&mut self) {
        if self.stdin.take().is_some() {
            debug!("Closed stdin: id={}", self.id);
        }
    }

    /// Wait for the process to exit and for its output to be drained.
    ///
    /// Closes stdin first. On timeout the process is killed.
    pub async fn wait_exit(&mut self, timeout: Duration) -> Result<ExitStatus> {
        if let Some(status) = self.exit_status {
            self.drain_readers(Instant::now() + timeout).await;
            return Ok(status);
        }
        if self.status == SessionStatus::Terminated {
            return Err(Error::SessionTerminated);
        }

        self.close_stdin();
        let start = Instant::now();
        let deadline = start + timeout;

        match tokio::time::timeout_at(deadline, self.child.wait()).await {
            Ok(Ok(status)) => {
                self.exit_status = Some(status);
                self.set_status(SessionStatus::Exited);
                self.drain_readers(deadline).await;
                Ok(status)
            }
            Ok(Err(e)) => Err(Error::Io(e)),
            Err(_) => {
                let output = self.pending_output();
                warn!("Process did not exit in time: id={}", self.id);
                self.kill().await;
                Err(Error::WaitTimeout {
                    marker: EXIT_MARKER.to_string(),
                    waited_ms: start.elapsed().as_millis() as u64,
                    output,
                })
            }
        }
    }

    /// Kill the process and release its pipes.
    ///
    /// Idempotent: calling this on a dead session is a no-op.
    pub async fn kill(&mut self) {
        self.close_stdin();
        if !self.status.is_running() {
            return;
        }

        info!("Killing process: id={}", self.id);
        if let Err(e) = self.child.kill().await {
            debug!("Kill of id={} reported: {}", self.id, e);
        }
        self.exit_status = self.child.try_wait().ok().flatten();
        for reader in self.readers.drain(..) {
            reader.abort();
        }
        self.set_status(SessionStatus::Terminated);
    }

    /// Record that the process ended on its own and reap it.
    pub(crate) async fn mark_exited(&mut self) {
        self.close_stdin();
        if !self.status.is_running() {
            return;
        }
        match tokio::time::timeout(Duration::from_secs(1), self.child.wait()).await {
            Ok(Ok(status)) => self.exit_status = Some(status),
            _ => {
                if let Err(e) = self.child.kill().await {
                    debug!("Kill of id={} reported: {}", self.id, e);
                }
            }
        }
        // stderr may still hold the diagnostic explaining the exit
        self.drain_readers(Instant::now() + Duration::from_secs(1)).await;
        self.set_status(SessionStatus::Exited);
    }

    async fn drain_readers(&mut self, deadline: Instant) {
        for reader in self.readers.drain(..) {
            if tokio::time::timeout_at(deadline, reader).await.is_err() {
                warn!("Output of id={} still open after exit", self.id);
            }
        }
    }

    fn set_status(&mut self, status: SessionStatus) {
        let old_status = self.status;
        self.status = status;
        info!(
            "Session status changed: id={}, {:?} → {:?}",
            self.id, old_status, status
        );
    }
}
