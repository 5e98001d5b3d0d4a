//! Interactive `gpg --edit-key` driver.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

use keyedit_core::protocol::{command, CHILD_ENV, NO, READY_MARKER, SELECT_NONE, YES};
use keyedit_core::{
    DriverConfig, EditListing, Error, KeyListItem, PreferenceSet, Result, RevocationReason,
    SubkeySpec, UidListItem,
};
use keyedit_parser::{parse_help, parse_listing, parse_preferences, strip_acks};
use keyedit_process::ProcessSession;

/// Drives one `gpg --edit-key` conversation.
///
/// Every command is sent as a line, followed by its argument lines, and the
/// editor then waits for gpg's ready marker before returning the text gpg
/// produced in between. Methods take `&mut self`, so only one command is
/// ever in flight per editor.
///
/// The key/user id selection is tracked here rather than inferred from gpg:
/// `key N` and `uid N` toggle in gpg, so the editor always clears an
/// existing selection before making a new one.
///
/// # Example
/// ```no_run
/// # use keyedit_core::DriverConfig;
/// # use keyedit_session::KeyEditor;
/// # async fn example() -> keyedit_core::Result<()> {
/// let mut editor = KeyEditor::new("alice@example.com", DriverConfig::default());
/// editor.activate().await?;
/// let (keys, uids) = editor.list().await?;
/// println!("{} keys, {} user ids", keys.len(), uids.len());
/// editor.quit(false).await?;
/// # Ok(())
/// # }
/// ```
pub struct KeyEditor {
    target: String,
    config: DriverConfig,
    passphrase: Option<String>,
    session: Option<ProcessSession>,
    selected_key: Option<String>,
    selected_identity: Option<u32>,
    /// A command was sent without waiting; its prompt is still unread
    pending_prompt: bool,
}

impl fmt::Debug for KeyEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyEditor")
            .field("target", &self.target)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "***"))
            .field("session", &self.session.as_ref().map(|s| s.id()))
            .field("selected_key", &self.selected_key)
            .field("selected_identity", &self.selected_identity)
            .field("pending_prompt", &self.pending_prompt)
            .finish()
    }
}

impl KeyEditor {
    /// Create an inactive editor for `target` (fingerprint, key id or user id).
    pub fn new(target: impl Into<String>, config: DriverConfig) -> Self {
        Self {
            target: target.into(),
            config,
            passphrase: None,
            session: None,
            selected_key: None,
            selected_identity: None,
            pending_prompt: false,
        }
    }

    /// Supply the passphrase inline (loopback pinentry).
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into()).filter(|p| !p.is_empty());
        self
    }

    /// Key the editor was opened on.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Whether a live conversation exists.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Currently selected subkey, if any.
    pub fn selected_key(&self) -> Option<&str> {
        self.selected_key.as_deref()
    }

    /// Currently selected user id index, if any.
    pub fn selected_identity(&self) -> Option<u32> {
        self.selected_identity
    }

    /// Full argument list for the interactive invocation.
    pub fn command_args(&self) -> Vec<String> {
        let mut args = self.config.base_args();
        args.extend(
            [
                "--expert",
                "--batch",
                "--command-fd",
                "0",
                "--status-fd",
                "1",
                "--pinentry-mode",
                "loopback",
            ]
            .map(String::from),
        );
        if let Some(passphrase) = &self.passphrase {
            args.push("--passphrase".to_string());
            args.push(passphrase.clone());
        }
        args.push("--edit-key".to_string());
        args.push(self.target.clone());
        args
    }

    /// Start gpg and wait for its first prompt.
    ///
    /// On failure the process is killed and the editor stays inactive.
    pub async fn activate(&mut self) -> Result<()> {
        if self.is_active() {
            debug!("Editor for '{}' already active", self.target);
            return Ok(());
        }

        let args = self.command_args();
        let mut session =
            ProcessSession::spawn_with_env(&self.config.gpg.program, &args, CHILD_ENV)?;

        if let Err(e) = session.wait_for(READY_MARKER, self.config.timeouts.ready()).await {
            warn!("Editor for '{}' failed to start: {}", self.target, e);
            session.kill().await;
            return Err(e);
        }

        info!("Editor active: target='{}', session={}", self.target, session.id());
        self.session = Some(session);
        self.pending_prompt = false;
        self.clear_selection();
        Ok(())
    }

    /// Kill the conversation and forget the selection. Never fails.
    pub async fn deactivate(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.kill().await;
            info!("Editor deactivated: target='{}'", self.target);
        }
        self.pending_prompt = false;
        self.clear_selection();
    }

    /// Send `command` and its argument lines, then wait for the next prompt.
    ///
    /// `None` arguments are sent as empty lines. Returns the output between
    /// the previous prompt and this one, without acknowledgement lines.
    pub async fn execute(&mut self, command: &str, args: &[Option<&str>]) -> Result<String> {
        self.execute_with(command, args, true).await
    }

    /// Like [`execute`](Self::execute), optionally without waiting.
    ///
    /// Without waiting, the prompt that follows the command is read and
    /// discarded before the next command goes out, so later output still
    /// lines up with its own command. Any failure while talking to gpg
    /// deactivates the editor.
    pub async fn execute_with(
        &mut self,
        command: &str,
        args: &[Option<&str>],
        wait: bool,
    ) -> Result<String> {
        let timeout = self.config.timeouts.ready();
        let session = self.session.as_mut().ok_or(Error::EditorInactive)?;
        let catch_up = std::mem::take(&mut self.pending_prompt);

        debug!(
            "Executing '{}' with {} argument lines: session={}",
            command,
            args.len(),
            session.id()
        );

        match Self::converse(session, command, args, catch_up, wait, timeout).await {
            Ok(text) => {
                self.pending_prompt = !wait;
                Ok(text)
            }
            Err(e) => {
                warn!("Command '{}' failed, deactivating editor: {}", command, e);
                self.deactivate().await;
                Err(e)
            }
        }
    }

    async fn converse(
        session: &mut ProcessSession,
        command: &str,
        args: &[Option<&str>],
        catch_up: bool,
        wait: bool,
        timeout: Duration,
    ) -> Result<String> {
        if catch_up {
            let skipped = session.wait_for(READY_MARKER, timeout).await?;
            debug!("Discarded {} bytes from an unawaited command", skipped.len());
        }

        let lines = std::iter::once(command).chain(args.iter().map(|a| a.unwrap_or_default()));
        for line in lines {
            match session.send(line).await {
                Ok(()) => {}
                // gpg is gone; report what it said before leaving
                Err(Error::Write(e)) => {
                    debug!("Write to session={} failed: {}", session.id(), e);
                    return Err(session.closed_error(READY_MARKER).await);
                }
                Err(e) => return Err(e),
            }
        }
        if !wait {
            return Ok(String::new());
        }
        let window = session.wait_for(READY_MARKER, timeout).await?;
        Ok(strip_acks(&window))
    }

    /// Parsed output of `list`.
    pub async fn listing(&mut self) -> Result<EditListing> {
        let text = self.execute(command::LIST, &[]).await?;
        parse_listing(&text)
    }

    /// Keys and user ids, in the order gpg lists them.
    pub async fn list(&mut self) -> Result<(Vec<KeyListItem>, Vec<UidListItem>)> {
        Ok(self.listing().await?.into_parts())
    }

    /// Available editor commands and their descriptions.
    pub async fn help(&mut self) -> Result<BTreeMap<String, String>> {
        let text = self.execute(command::HELP, &[]).await?;
        Ok(parse_help(&text))
    }

    /// Select a subkey by index or id; `None` clears the selection.
    pub async fn select_key(&mut self, key: Option<&str>) -> Result<()> {
        self.ensure_active()?;
        let key = key.filter(|k| !k.is_empty() && *k != SELECT_NONE);
        if key.is_some() && key == self.selected_key.as_deref() {
            return Ok(());
        }

        if self.selected_key.is_some() || key.is_none() {
            self.execute(&format!("{} {}", command::KEY, SELECT_NONE), &[]).await?;
            self.selected_key = None;
        }
        if let Some(key) = key {
            self.execute(&format!("{} {}", command::KEY, key), &[]).await?;
            self.selected_key = Some(key.to_string());
        }
        Ok(())
    }

    /// Select a user id by 1-based index; `None` clears the selection.
    pub async fn select_identity(&mut self, index: Option<u32>) -> Result<()> {
        self.ensure_active()?;
        let index = index.filter(|i| *i > 0);
        if index.is_some() && index == self.selected_identity {
            return Ok(());
        }

        if self.selected_identity.is_some() || index.is_none() {
            self.execute(&format!("{} {}", command::UID, SELECT_NONE), &[]).await?;
            self.selected_identity = None;
        }
        if let Some(index) = index {
            self.execute(&format!("{} {}", command::UID, index), &[]).await?;
            self.selected_identity = Some(index);
        }
        Ok(())
    }

    /// Add a user id. Missing email or comment is sent as an empty answer.
    pub async fn add_identity(
        &mut self,
        name: &str,
        email: Option<&str>,
        comment: Option<&str>,
    ) -> Result<()> {
        self.execute(command::ADD_UID, &[Some(name), email, comment]).await?;
        info!("Added user id '{}' to '{}'", name, self.target);
        Ok(())
    }

    /// Delete the user id at `index`.
    pub async fn delete_identity(&mut self, index: u32) -> Result<()> {
        self.on_identity(index, command::DELETE_UID, &[Some(YES)]).await?;
        info!("Deleted user id {} of '{}'", index, self.target);
        Ok(())
    }

    /// Revoke the user id at `index`.
    pub async fn revoke_identity(
        &mut self,
        index: u32,
        reason: RevocationReason,
        description: Option<&str>,
    ) -> Result<()> {
        // The empty line ends the multi-line description.
        let args = [Some(YES), Some(reason.as_str()), description, None, Some(YES)];
        self.on_identity(index, command::REVOKE_UID, &args).await?;
        info!("Revoked user id {} of '{}' ({})", index, self.target, reason);
        Ok(())
    }

    /// Replace the preference list of the user id at `index`.
    pub async fn set_preferences(&mut self, index: u32, prefs: &PreferenceSet) -> Result<()> {
        let command = format!("{} {}", command::SET_PREF, prefs.to_command_arg());
        self.on_identity(index, &command, &[Some(YES)]).await?;
        Ok(())
    }

    /// Read back the preference list of the user id at `index`.
    pub async fn get_preferences(&mut self, index: u32) -> Result<PreferenceSet> {
        let text = self.on_identity(index, command::SHOW_PREF, &[]).await?;
        Ok(PreferenceSet::from_listing(&parse_preferences(&text)))
    }

    /// Add a subkey.
    ///
    /// Rejects a spec whose size does not match its algorithm before
    /// anything is sent.
    pub async fn add_subkey(&mut self, spec: &SubkeySpec) -> Result<()> {
        self.ensure_active()?;
        spec.validate()?;
        let [key_type, size, expires] = spec.answers();
        self.execute(
            command::ADD_KEY,
            &[Some(key_type.as_str()), Some(size.as_str()), Some(expires.as_str())],
        )
        .await?;
        info!("Added subkey to '{}': {:?}", self.target, spec);
        Ok(())
    }

    /// End the conversation, saving or discarding changes.
    ///
    /// The process is always terminated afterwards.
    pub async fn quit(&mut self, save: bool) -> Result<()> {
        let mut session = self.session.take().ok_or(Error::EditorInactive)?;
        self.pending_prompt = false;
        self.clear_selection();

        let timeout = self.config.timeouts.exit();
        let result = if save {
            Self::save(&mut session, timeout).await
        } else {
            Self::discard(&mut session, timeout).await
        };

        session.kill().await;
        info!("Editor closed: target='{}', save={}", self.target, save);
        result
    }

    async fn save(session: &mut ProcessSession, timeout: Duration) -> Result<()> {
        session.send(command::SAVE).await?;
        let status = session.wait_exit(timeout).await?;
        if status.success() {
            return Ok(());
        }
        Err(Error::BatchFailed {
            code: status.code(),
            output: format!("{}{}", session.pending_output(), session.stderr_output()),
        })
    }

    async fn discard(session: &mut ProcessSession, timeout: Duration) -> Result<()> {
        // gpg may exit right after `quit` when nothing changed.
        for line in [command::QUIT, NO, YES] {
            if let Err(e) = session.send(line).await {
                debug!("Discard answer '{}' not delivered: {}", line, e);
            }
        }
        session.wait_exit(timeout).await.map(drop)
    }

    /// Run `command` with the user id at `index` selected, then clear the
    /// selection whatever the outcome.
    async fn on_identity(
        &mut self,
        index: u32,
        command: &str,
        args: &[Option<&str>],
    ) -> Result<String> {
        if index == 0 {
            return Err(Error::InvalidToken("user id indexes start at 1".to_string()));
        }

        let result = match self.select_identity(Some(index)).await {
            Ok(()) => self.execute(command, args).await,
            Err(e) => Err(e),
        };

        if self.is_active() {
            if let Err(e) = self.select_identity(None).await {
                warn!("Failed to clear user id selection: {}", e);
            }
        }
        self.selected_identity = None;

        result
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(Error::EditorInactive)
        }
    }

    fn clear_selection(&mut self) {
        self.selected_key = None;
        self.selected_identity = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DriverConfig {
        DriverConfig::default()
    }

    #[test]
    fn test_command_args_without_passphrase() {
        let editor = KeyEditor::new("ABCDEF", config());
        assert_eq!(
            editor.command_args(),
            vec![
                "--expert",
                "--batch",
                "--command-fd",
                "0",
                "--status-fd",
                "1",
                "--pinentry-mode",
                "loopback",
                "--edit-key",
                "ABCDEF",
            ]
        );
    }

    #[test]
    fn test_command_args_with_passphrase_and_homedir() {
        let mut config = config();
        config.gpg.homedir = Some("/tmp/keyring".into());
        let editor = KeyEditor::new("ABCDEF", config).with_passphrase("secret");
        let args = editor.command_args();

        assert_eq!(&args[..2], ["--homedir", "/tmp/keyring"]);
        let pos = args.iter().position(|a| a == "--passphrase").unwrap();
        assert_eq!(args[pos + 1], "secret");
        assert_eq!(args[args.len() - 2..], ["--edit-key", "ABCDEF"]);
    }

    #[test]
    fn test_empty_passphrase_is_omitted() {
        let editor = KeyEditor::new("ABCDEF", config()).with_passphrase("");
        assert!(!editor.command_args().contains(&"--passphrase".to_string()));
    }

    #[test]
    fn test_debug_hides_passphrase() {
        let editor = KeyEditor::new("ABCDEF", config()).with_passphrase("secret");
        let debug = format!("{editor:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("***"));
    }

    #[tokio::test]
    async fn test_inactive_editor_rejects_commands() {
        let mut editor = KeyEditor::new("ABCDEF", config());
        assert!(!editor.is_active());
        assert!(matches!(
            editor.execute("list", &[]).await,
            Err(Error::EditorInactive)
        ));
        assert!(matches!(
            editor.select_identity(Some(1)).await,
            Err(Error::EditorInactive)
        ));
        assert!(matches!(editor.quit(true).await, Err(Error::EditorInactive)));
    }

    #[tokio::test]
    async fn test_deactivate_twice_is_noop() {
        let mut editor = KeyEditor::new("ABCDEF", config());
        editor.deactivate().await;
        editor.deactivate().await;
        assert!(!editor.is_active());
        assert_eq!(editor.selected_identity(), None);
    }

    #[tokio::test]
    async fn test_activate_with_missing_program() {
        let mut config = config();
        config.gpg.program = "/nonexistent/keyedit-gpg".to_string();
        let mut editor = KeyEditor::new("ABCDEF", config);
        assert!(matches!(
            editor.activate().await,
            Err(Error::Spawn { .. })
        ));
        assert!(!editor.is_active());
    }
}
