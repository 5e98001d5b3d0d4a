//! Parameters for subkey creation and user id revocation.

use serde::{Deserialize, Serialize};

use crate::tokens::protocol_tokens;

protocol_tokens! {
    /// Algorithm menu entry of `addkey` (expert mode numbering).
    AddKeyType {
        /// DSA (sign only)
        Dsa => "3",
        /// RSA (sign only)
        RsaSign => "4",
        /// Elgamal (encrypt only)
        Elgamal => "5",
        /// RSA (encrypt only)
        RsaEncrypt => "6",
        /// ECC (sign only)
        EccSign => "10",
        /// ECC (encrypt only)
        EccEncrypt => "12",
    }
}

impl AddKeyType {
    /// Whether the follow-up prompt asks for a curve instead of a bit length.
    pub fn uses_curve(&self) -> bool {
        matches!(self, AddKeyType::EccSign | AddKeyType::EccEncrypt)
    }
}

protocol_tokens! {
    /// Curve menu entry of `addkey`.
    CurveType {
        /// Curve 25519
        Curve25519 => "1",
        /// NIST P-384
        NistP384 => "4",
        /// Brainpool P-256
        BrainpoolP256 => "6",
    }
}

protocol_tokens! {
    /// Reason code for `revuid`.
    RevocationReason {
        /// No reason specified
        NoReason => "0",
        /// User ID is no longer valid
        InvalidUid => "4",
    }
}

impl Default for RevocationReason {
    fn default() -> Self {
        RevocationReason::InvalidUid
    }
}

/// Validity period answer for gpg's expiration prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expiration {
    /// Key does not expire
    #[default]
    Never,
    /// Expires after n days
    Days(u32),
    /// Expires after n weeks
    Weeks(u32),
    /// Expires after n months
    Months(u32),
    /// Expires after n years
    Years(u32),
}

impl std::fmt::Display for Expiration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expiration::Never => write!(f, "0"),
            Expiration::Days(n) => write!(f, "{n}d"),
            Expiration::Weeks(n) => write!(f, "{n}w"),
            Expiration::Months(n) => write!(f, "{n}m"),
            Expiration::Years(n) => write!(f, "{n}y"),
        }
    }
}

impl std::str::FromStr for Expiration {
    type Err = crate::Error;

    /// Parse `0`, `never`, or `<n>[d|w|m|y]` (a bare number means days).
    fn from_str(s: &str) -> crate::Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        if s == "0" || s == "never" {
            return Ok(Expiration::Never);
        }

        let invalid = || crate::Error::InvalidToken(format!("invalid expiration: {s}"));
        let (digits, unit) = match s.char_indices().last() {
            Some((idx, c)) if c.is_ascii_alphabetic() => (&s[..idx], Some(c)),
            Some(_) => (s.as_str(), None),
            None => return Err(invalid()),
        };
        let n: u32 = digits.parse().map_err(|_| invalid())?;

        match unit {
            None | Some('d') => Ok(Expiration::Days(n)),
            Some('w') => Ok(Expiration::Weeks(n)),
            Some('m') => Ok(Expiration::Months(n)),
            Some('y') => Ok(Expiration::Years(n)),
            Some(_) => Err(invalid()),
        }
    }
}

/// Shape of the second `addkey` answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubkeySize {
    /// Elliptic curve choice
    Curve(CurveType),
    /// Key length in bits
    Bits(u32),
}

/// Complete answer set for `addkey`.
///
/// Built through [`SubkeySpec::new`]; a deserialized value is checked by
/// [`SubkeySpec::validate`] before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubkeySpec {
    key_type: AddKeyType,
    size: SubkeySize,
    expires: Expiration,
}

impl SubkeySpec {
    /// Default bit length for size-based algorithms.
    pub const DEFAULT_BITS: u32 = 3072;

    /// Build a spec, choosing the curve or the length by key type.
    pub fn new(key_type: AddKeyType, curve: CurveType, bits: u32, expires: Expiration) -> Self {
        let size = if key_type.uses_curve() {
            SubkeySize::Curve(curve)
        } else {
            SubkeySize::Bits(bits)
        };
        Self {
            key_type,
            size,
            expires,
        }
    }

    /// Algorithm menu entry.
    pub fn key_type(&self) -> AddKeyType {
        self.key_type
    }

    /// Curve or length answer.
    pub fn size(&self) -> SubkeySize {
        self.size
    }

    /// Validity period.
    pub fn expires(&self) -> Expiration {
        self.expires
    }

    /// Check that the size answer has the shape the algorithm asks for.
    pub fn validate(&self) -> crate::Result<()> {
        match (self.key_type.uses_curve(), self.size) {
            (true, SubkeySize::Curve(_)) => Ok(()),
            (false, SubkeySize::Bits(bits)) if bits > 0 => Ok(()),
            _ => Err(crate::Error::InvalidToken(format!(
                "{:?} cannot be combined with {:?}",
                self.key_type, self.size
            ))),
        }
    }

    /// Argument lines sent after the `addkey` command.
    pub fn answers(&self) -> [String; 3] {
        let size = match self.size {
            SubkeySize::Curve(curve) => curve.as_str().to_string(),
            SubkeySize::Bits(bits) => bits.to_string(),
        };
        [
            self.key_type.as_str().to_string(),
            size,
            self.expires.to_string(),
        ]
    }
}
