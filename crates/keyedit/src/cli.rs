//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use keyedit_core::{
    AddKeyType, CurveType, Expiration, PreferenceSet, RevocationReason, SubkeySpec,
};

/// Drive gpg's key editor and key listings, printing results as JSON.
#[derive(Debug, Parser)]
#[command(name = "keyedit", version, about)]
pub struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// GnuPG home directory (overrides the configuration file)
    #[arg(long, global = true)]
    pub homedir: Option<PathBuf>,

    /// Passphrase supplied through loopback pinentry
    #[arg(long, global = true)]
    pub passphrase: Option<String>,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List keys from the keyring
    ListKeys {
        /// List secret keys instead of public keys
        #[arg(long)]
        secret: bool,

        /// List signatures without verifying them
        #[arg(long)]
        no_sig_check: bool,

        /// Only keys matching this user id, key id or fingerprint
        pattern: Option<String>,
    },

    /// Run one action in the interactive key editor
    #[command(disable_help_subcommand = true)]
    Edit {
        /// Fingerprint, key id or user id of the key to edit
        target: String,

        /// Action to perform
        #[command(subcommand)]
        action: EditAction,
    },
}

/// Actions run inside one editor session.
#[derive(Debug, Subcommand)]
pub enum EditAction {
    /// Show keys and user ids
    List,

    /// Show the editor's command list
    Help,

    /// Add a user id
    AddUid {
        /// Real name
        #[arg(long)]
        name: String,

        /// Email address
        #[arg(long)]
        email: Option<String>,

        /// Comment
        #[arg(long)]
        comment: Option<String>,
    },

    /// Delete a user id
    DeleteUid {
        /// 1-based user id index as shown by `list`
        index: u32,
    },

    /// Revoke a user id
    RevokeUid {
        /// 1-based user id index as shown by `list`
        index: u32,

        /// Revocation reason
        #[arg(long, value_enum, default_value_t = ReasonArg::InvalidUid)]
        reason: ReasonArg,

        /// Free-text description
        #[arg(long)]
        description: Option<String>,
    },

    /// Replace the preference list of a user id
    SetPref {
        /// 1-based user id index as shown by `list`
        index: u32,

        /// Preference string, e.g. "S9 S8 S7 H10 H8 Z2 Z1 mdc"
        #[arg(value_parser = parse_preferences)]
        preferences: PreferenceSet,
    },

    /// Show the preference list of a user id
    ShowPref {
        /// 1-based user id index as shown by `list`
        index: u32,
    },

    /// Add a subkey
    AddKey {
        /// Algorithm
        #[arg(long = "type", value_enum)]
        key_type: KeyTypeArg,

        /// Curve, for ECC algorithms
        #[arg(long, value_enum, default_value_t = CurveArg::Curve25519)]
        curve: CurveArg,

        /// Key length in bits, for non-ECC algorithms
        #[arg(long, default_value_t = SubkeySpec::DEFAULT_BITS)]
        bits: u32,

        /// Validity period: 0, Nd, Nw, Nm or Ny
        #[arg(long, default_value = "0", value_parser = parse_expiration)]
        expires: Expiration,
    },
}

impl EditAction {
    /// Whether the action changes the key and must be saved.
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            EditAction::List | EditAction::Help | EditAction::ShowPref { .. }
        )
    }

    /// Name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            EditAction::List => "list",
            EditAction::Help => "help",
            EditAction::AddUid { .. } => "add-uid",
            EditAction::DeleteUid { .. } => "delete-uid",
            EditAction::RevokeUid { .. } => "revoke-uid",
            EditAction::SetPref { .. } => "set-pref",
            EditAction::ShowPref { .. } => "show-pref",
            EditAction::AddKey { .. } => "add-key",
        }
    }
}

/// `addkey` algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyTypeArg {
    /// DSA (sign only)
    Dsa,
    /// RSA (sign only)
    RsaSign,
    /// Elgamal (encrypt only)
    Elgamal,
    /// RSA (encrypt only)
    RsaEncrypt,
    /// ECC (sign only)
    EccSign,
    /// ECC (encrypt only)
    EccEncrypt,
}

impl From<KeyTypeArg> for AddKeyType {
    fn from(arg: KeyTypeArg) -> Self {
        match arg {
            KeyTypeArg::Dsa => AddKeyType::Dsa,
            KeyTypeArg::RsaSign => AddKeyType::RsaSign,
            KeyTypeArg::Elgamal => AddKeyType::Elgamal,
            KeyTypeArg::RsaEncrypt => AddKeyType::RsaEncrypt,
            KeyTypeArg::EccSign => AddKeyType::EccSign,
            KeyTypeArg::EccEncrypt => AddKeyType::EccEncrypt,
        }
    }
}

/// `addkey` curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CurveArg {
    /// Curve 25519
    Curve25519,
    /// NIST P-384
    NistP384,
    /// Brainpool P-256
    BrainpoolP256,
}

impl From<CurveArg> for CurveType {
    fn from(arg: CurveArg) -> Self {
        match arg {
            CurveArg::Curve25519 => CurveType::Curve25519,
            CurveArg::NistP384 => CurveType::NistP384,
            CurveArg::BrainpoolP256 => CurveType::BrainpoolP256,
        }
    }
}

/// `revuid` reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReasonArg {
    /// No reason specified
    NoReason,
    /// User ID is no longer valid
    InvalidUid,
}

impl From<ReasonArg> for RevocationReason {
    fn from(arg: ReasonArg) -> Self {
        match arg {
            ReasonArg::NoReason => RevocationReason::NoReason,
            ReasonArg::InvalidUid => RevocationReason::InvalidUid,
        }
    }
}

fn parse_preferences(value: &str) -> Result<PreferenceSet, String> {
    PreferenceSet::from_command_arg(value).map_err(|e| e.to_string())
}

fn parse_expiration(value: &str) -> Result<Expiration, String> {
    value.parse::<Expiration>().map_err(|e| e.to_string())
}
