//! Configuration types for keyedit.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Driver configuration loaded from YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DriverConfig {
    /// How to invoke the external program
    pub gpg: GpgSettings,
    /// Timeouts for blocking operations
    pub timeouts: TimeoutSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl DriverConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let config: DriverConfig = serde_yaml::from_str(yaml)
            .map_err(|e| crate::Error::Config(format!("invalid YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        if self.gpg.program.trim().is_empty() {
            return Err(crate::Error::Config(
                "gpg.program cannot be empty".to_string(),
            ));
        }

        if self.timeouts.ready_ms == 0 || self.timeouts.exit_ms == 0 || self.timeouts.batch_ms == 0
        {
            return Err(crate::Error::Config("timeouts must be > 0".to_string()));
        }

        Ok(())
    }

    /// Common leading arguments: extra args, then `--homedir` if set.
    pub fn base_args(&self) -> Vec<String> {
        let mut args = self.gpg.extra_args.clone();
        if let Some(homedir) = &self.gpg.homedir {
            args.push("--homedir".to_string());
            args.push(homedir.display().to_string());
        }
        args
    }
}

/// External program settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GpgSettings {
    /// Executable to run
    pub program: String,
    /// GnuPG home directory (`--homedir`)
    pub homedir: Option<PathBuf>,
    /// Arguments placed before every generated argument
    pub extra_args: Vec<String>,
}

impl Default for GpgSettings {
    fn default() -> Self {
        Self {
            program: "gpg".to_string(),
            homedir: None,
            extra_args: vec![],
        }
    }
}

/// Timeout settings, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    /// Bound on each wait for the ready marker
    pub ready_ms: u64,
    /// Bound on waiting for the editor to exit after save/quit
    pub exit_ms: u64,
    /// Bound on a whole batch listing invocation
    pub batch_ms: u64,
}

impl TimeoutSettings {
    /// Ready-marker timeout.
    pub fn ready(&self) -> Duration {
        Duration::from_millis(self.ready_ms)
    }

    /// Exit timeout.
    pub fn exit(&self) -> Duration {
        Duration::from_millis(self.exit_ms)
    }

    /// Batch timeout.
    pub fn batch(&self) -> Duration {
        Duration::from_millis(self.batch_ms)
    }
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            ready_ms: 30_000,
            exit_ms: 10_000,
            batch_ms: 60_000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
