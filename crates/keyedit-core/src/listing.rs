//! Records produced by the editor's `list` command.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One key block of an edit-key listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyListItem {
    /// Record kind: `pub`, `sub`, `sec` or `ssb`
    pub kind: String,
    /// Whether the key is currently selected (`ssb*`)
    pub selected: bool,
    /// Algorithm token, e.g. `rsa3072` or `ed25519`
    pub algorithm: String,
    /// Key id as printed after the slash
    pub id_hash: String,
    /// Full `algorithm/id` token
    pub id: String,
    /// Creation date
    pub created: Option<NaiveDate>,
    /// Expiration date
    pub expires: Option<NaiveDate>,
    /// Usage flags, e.g. `SC`
    pub usage: Option<String>,
    /// Owner trust
    pub trust: Option<String>,
    /// Computed validity
    pub validity: Option<String>,
}

impl KeyListItem {
    /// Whether this is a primary key record.
    pub fn is_primary(&self) -> bool {
        matches!(self.kind.as_str(), "pub" | "sec")
    }
}

/// One user id line of an edit-key listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UidListItem {
    /// Validity tag from the brackets, e.g. `ultimate` or `revoked`
    pub status: String,
    /// 1-based index used by `uid N`
    pub index: u32,
    /// Identity text, e.g. `Alice <alice@example.com>`
    pub user_id: String,
    /// Whether the identity is currently selected
    pub selected: bool,
}

/// Result of `list`: keys and identities in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditListing {
    /// Primary key first, then subkeys
    pub keys: Vec<KeyListItem>,
    /// User ids
    pub user_ids: Vec<UidListItem>,
}

impl EditListing {
    /// Split into the `(keys, identities)` pair.
    pub fn into_parts(self) -> (Vec<KeyListItem>, Vec<UidListItem>) {
        (self.keys, self.user_ids)
    }

    /// Identity currently selected, if any.
    pub fn selected_user_id(&self) -> Option<&UidListItem> {
        self.user_ids.iter().find(|uid| uid.selected)
    }
}
