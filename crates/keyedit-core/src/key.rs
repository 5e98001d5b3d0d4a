//! Keys assembled from colon-format listings.
//!
//! These are plain data holders; the parser crate builds them and callers
//! consume them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validity or trust letter used in colon records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validity {
    /// `o`: not yet computed
    New,
    /// `i`: invalid
    Invalid,
    /// `d`: disabled
    Disabled,
    /// `r`: revoked
    Revoked,
    /// `e`: expired
    Expired,
    /// `-` or `q`: unknown / undefined
    Unknown,
    /// `n`: never trusted
    Never,
    /// `m`: marginal
    Marginal,
    /// `f`: full
    Full,
    /// `u`: ultimate
    Ultimate,
    /// `w`: well-known private part
    WellKnown,
    /// `s`: special
    Special,
    /// Any letter not listed above
    Other(char),
}

impl Validity {
    /// Parse a colon-record field. Empty fields yield `None`.
    pub fn from_field(field: &str) -> Option<Self> {
        let c = field.chars().next()?;
        Some(match c {
            'o' => Validity::New,
            'i' => Validity::Invalid,
            'd' => Validity::Disabled,
            'r' => Validity::Revoked,
            'e' => Validity::Expired,
            '-' | 'q' => Validity::Unknown,
            'n' => Validity::Never,
            'm' => Validity::Marginal,
            'f' => Validity::Full,
            'u' => Validity::Ultimate,
            'w' => Validity::WellKnown,
            's' => Validity::Special,
            other => Validity::Other(other),
        })
    }
}

/// Fields shared by primary keys and subkeys.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyFields {
    /// Computed validity
    pub validity: Option<Validity>,
    /// Key length in bits
    pub length: u32,
    /// OpenPGP public key algorithm number
    pub algorithm: u32,
    /// 16 hex digit key id
    pub key_id: String,
    /// Creation time
    pub created: Option<DateTime<Utc>>,
    /// Expiration time
    pub expires: Option<DateTime<Utc>>,
    /// Owner trust (primary keys only)
    pub owner_trust: Option<Validity>,
    /// Capability letters, e.g. `scESC`
    pub capabilities: String,
    /// Curve name for ECC keys
    pub curve: Option<String>,
    /// Full fingerprint from the following `fpr` record
    pub fingerprint: Option<String>,
    /// Keygrip from the following `grp` record
    pub keygrip: Option<String>,
}

/// Kind of signature record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureKind {
    /// `sig`
    Signature,
    /// `rev`
    Revocation,
}

/// Signature or revocation attached to a key, subkey or user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Signature or revocation
    pub kind: SignatureKind,
    /// Check result: `!` good, `-` bad, `?` no key, `%` error
    pub check: Option<char>,
    /// OpenPGP public key algorithm number
    pub algorithm: u32,
    /// Issuer key id
    pub issuer: String,
    /// Creation time
    pub created: Option<DateTime<Utc>>,
    /// Expiration time
    pub expires: Option<DateTime<Utc>>,
    /// Signer's user id as known to the keyring
    pub signer_uid: String,
    /// Signature class, e.g. `13x`
    pub class: String,
}

/// User id or user attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserId {
    /// Computed validity
    pub validity: Option<Validity>,
    /// Creation time of the self-signature
    pub created: Option<DateTime<Utc>>,
    /// Expiration time
    pub expires: Option<DateTime<Utc>>,
    /// Hash identifying this uid
    pub uid_hash: String,
    /// Identity text (escaped as gpg prints it)
    pub text: String,
    /// Whether this is a `uat` (photo id) record
    pub is_attribute: bool,
    /// Certifications on this uid
    pub signatures: Vec<Signature>,
}

/// Subkey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subkey {
    /// Whether the secret part is listed (`ssb`)
    pub secret: bool,
    /// Key fields
    pub fields: KeyFields,
    /// Binding and revocation signatures
    pub signatures: Vec<Signature>,
}

/// Primary key with everything listed beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// Whether this came from a secret listing (`sec`)
    pub secret: bool,
    /// Primary key fields
    pub primary: KeyFields,
    /// User ids in listing order
    pub user_ids: Vec<UserId>,
    /// Subkeys in listing order
    pub subkeys: Vec<Subkey>,
    /// Direct-key signatures
    pub signatures: Vec<Signature>,
}

impl Key {
    /// Primary fingerprint, if it was listed.
    pub fn fingerprint(&self) -> Option<&str> {
        self.primary.fingerprint.as_deref()
    }

    /// First user id text, if any.
    pub fn primary_uid(&self) -> Option<&str> {
        self.user_ids
            .iter()
            .find(|uid| !uid.is_attribute)
            .map(|uid| uid.text.as_str())
    }
}
