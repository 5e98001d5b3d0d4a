//! # keyedit-core
//!
//! Core types for keyedit.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other keyedit crates. It provides:
//!
//! - Error types
//! - Driver configuration
//! - Status-protocol constants and edit-key command words
//! - Closed token sets (preferences, key types, curves, revocation reasons)
//! - Listing records and colon-listing key models
//! - Session identifiers and status
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other keyedit crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod tokens;

pub mod config;
pub mod error;
pub mod key;
pub mod key_params;
pub mod listing;
pub mod prefs;
pub mod protocol;
pub mod session;

// Re-export commonly used types
pub use config::{DriverConfig, GpgSettings, LoggingSettings, TimeoutSettings};
pub use error::{Error, Result};
pub use key::{Key, KeyFields, Signature, SignatureKind, Subkey, UserId, Validity};
pub use key_params::{AddKeyType, CurveType, Expiration, RevocationReason, SubkeySize, SubkeySpec};
pub use listing::{EditListing, KeyListItem, UidListItem};
pub use prefs::{PrefCipher, PrefCompression, PrefDigest, PreferenceSet};
pub use session::{SessionId, SessionStatus};
