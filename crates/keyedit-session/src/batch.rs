//! Batch key listings through `gpg --with-colons`.

use tracing::{debug, info, warn};

use keyedit_core::protocol::CHILD_ENV;
use keyedit_core::{DriverConfig, Error, Key, Result};
use keyedit_parser::KeyAssembler;
use keyedit_process::ProcessSession;

/// Options for a single listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// List secret keys instead of public keys
    pub secret: bool,
    /// Verify signatures (`--with-sig-check`) rather than only list them
    pub check_signatures: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            secret: false,
            check_signatures: true,
        }
    }
}

/// Runs non-interactive key listings and assembles their colon output.
#[derive(Debug, Clone)]
pub struct KeyLister {
    config: DriverConfig,
}

impl KeyLister {
    /// Create a lister using `config`.
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    /// Full argument list for one listing. An empty pattern lists everything.
    pub fn command_args(&self, pattern: Option<&str>, options: ListOptions) -> Vec<String> {
        let mut args = self.config.base_args();
        args.extend(
            [
                "--with-colons",
                "--with-fingerprint",
                "--with-subkey-fingerprint",
                "--with-keygrip",
                if options.check_signatures {
                    "--with-sig-check"
                } else {
                    "--with-sig-list"
                },
                if options.secret {
                    "--list-secret-keys"
                } else {
                    "--list-public-keys"
                },
            ]
            .map(String::from),
        );
        if let Some(pattern) = pattern.filter(|p| !p.is_empty()) {
            args.push(pattern.to_string());
        }
        args
    }

    /// List keys matching `pattern`.
    ///
    /// A non-zero exit fails with [`Error::BatchFailed`] carrying stdout
    /// followed by stderr. Malformed records are skipped.
    pub async fn list_keys(&self, pattern: Option<&str>, options: ListOptions) -> Result<Vec<Key>> {
        let args = self.command_args(pattern, options);
        let mut session =
            ProcessSession::spawn_with_env(&self.config.gpg.program, &args, CHILD_ENV)?;

        let status = session.wait_exit(self.config.timeouts.batch()).await?;
        let stdout = session.output();

        if !status.success() {
            warn!("Key listing exited with {:?}", status.code());
            return Err(Error::BatchFailed {
                code: status.code(),
                output: format!("{}{}", stdout, session.stderr_output()),
            });
        }

        let mut assembler = KeyAssembler::new();
        for line in stdout.lines() {
            assembler.push_line(line);
        }
        if assembler.skipped() > 0 {
            debug!("Skipped {} malformed records", assembler.skipped());
        }

        let keys = assembler.finish();
        info!("Listed {} keys (secret={})", keys.len(), options.secret);
        Ok(keys)
    }
}
