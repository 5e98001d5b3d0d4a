//! Command execution.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::{info, warn};

use keyedit_core::{DriverConfig, RevocationReason, SubkeySpec};
use keyedit_session::{KeyEditor, KeyLister, ListOptions};

use crate::cli::{Cli, Command, EditAction};

/// Load the configuration file (or defaults) and apply command-line overrides.
pub fn load_config(cli: &Cli) -> Result<DriverConfig> {
    let mut config = match &cli.config {
        Some(path) => DriverConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => DriverConfig::default(),
    };

    if let Some(homedir) = &cli.homedir {
        config.gpg.homedir = Some(homedir.clone());
    }

    config.validate()?;
    Ok(config)
}

/// Run the selected command and return its JSON result.
pub async fn run(cli: &Cli, config: DriverConfig) -> Result<Value> {
    match &cli.command {
        Command::ListKeys {
            secret,
            no_sig_check,
            pattern,
        } => {
            let options = ListOptions {
                secret: *secret,
                check_signatures: !no_sig_check,
            };
            let keys = KeyLister::new(config)
                .list_keys(pattern.as_deref(), options)
                .await
                .context("key listing failed")?;
            Ok(serde_json::to_value(keys)?)
        }
        Command::Edit { target, action } => {
            edit(target, action, cli.passphrase.as_deref(), config).await
        }
    }
}

/// Open an editor, run one action, then save on success or discard.
async fn edit(
    target: &str,
    action: &EditAction,
    passphrase: Option<&str>,
    config: DriverConfig,
) -> Result<Value> {
    let mut editor = KeyEditor::new(target, config);
    if let Some(passphrase) = passphrase {
        editor = editor.with_passphrase(passphrase);
    }

    editor
        .activate()
        .await
        .with_context(|| format!("failed to open key editor for '{target}'"))?;

    let result = apply(&mut editor, action).await;
    let save = result.is_ok() && action.is_mutating();

    // a failed command may already have torn the session down
    let closed = if editor.is_active() {
        editor.quit(save).await
    } else {
        Ok(())
    };

    let value = result.with_context(|| format!("{} failed on '{target}'", action.name()))?;
    if let Err(e) = closed {
        if save {
            return Err(e).context("failed to save changes");
        }
        warn!("Editor did not close cleanly: {}", e);
    }

    info!("{} on '{}' finished (saved={})", action.name(), target, save);
    Ok(value)
}

async fn apply(editor: &mut KeyEditor, action: &EditAction) -> keyedit_core::Result<Value> {
    let value = match action {
        EditAction::List => serde_json::to_value(editor.listing().await?)?,
        EditAction::Help => serde_json::to_value(editor.help().await?)?,
        EditAction::AddUid {
            name,
            email,
            comment,
        } => {
            editor.add_identity(name, email.as_deref(), comment.as_deref()).await?;
            json!({ "added": { "name": name, "email": email, "comment": comment } })
        }
        EditAction::DeleteUid { index } => {
            editor.delete_identity(*index).await?;
            json!({ "deleted": index })
        }
        EditAction::RevokeUid {
            index,
            reason,
            description,
        } => {
            let reason: RevocationReason = (*reason).into();
            editor.revoke_identity(*index, reason, description.as_deref()).await?;
            json!({ "revoked": index, "reason": reason })
        }
        EditAction::SetPref { index, preferences } => {
            editor.set_preferences(*index, preferences).await?;
            json!({ "index": index, "preferences": preferences })
        }
        EditAction::ShowPref { index } => {
            serde_json::to_value(editor.get_preferences(*index).await?)?
        }
        EditAction::AddKey {
            key_type,
            curve,
            bits,
            expires,
        } => {
            let spec = SubkeySpec::new((*key_type).into(), (*curve).into(), *bits, *expires);
            editor.add_subkey(&spec).await?;
            json!({ "added_subkey": spec })
        }
    };
    Ok(value)
}
