//! Algorithm preference tokens and preference sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::tokens::protocol_tokens;

protocol_tokens! {
    /// Symmetric cipher preference.
    PrefCipher {
        /// No encryption
        Plaintext => "S0",
        /// IDEA
        Idea => "S1",
        /// Triple DES
        TripleDes => "S2",
        /// CAST5
        Cast5 => "S3",
        /// Blowfish
        Blowfish => "S4",
        /// AES-128
        Aes128 => "S7",
        /// AES-192
        Aes192 => "S8",
        /// AES-256
        Aes256 => "S9",
        /// Twofish
        Twofish => "S10",
    }
}

protocol_tokens! {
    /// Digest preference.
    PrefDigest {
        /// MD5
        Md5 => "H1",
        /// SHA-1
        Sha1 => "H2",
        /// RIPEMD-160
        RipeMd160 => "H3",
        /// SHA-256
        Sha256 => "H8",
        /// SHA-384
        Sha384 => "H9",
        /// SHA-512
        Sha512 => "H10",
        /// SHA-224
        Sha224 => "H11",
    }
}

protocol_tokens! {
    /// Compression preference.
    PrefCompression {
        /// No compression
        Uncompressed => "Z0",
        /// ZIP
        Zip => "Z1",
        /// ZLIB
        Zlib => "Z2",
        /// BZIP2
        Bzip2 => "Z3",
    }
}

impl PrefCipher {
    /// Name gpg prints in `showpref` output.
    pub fn display_name(&self) -> &'static str {
        match self {
            PrefCipher::Plaintext => "Plaintext",
            PrefCipher::Idea => "IDEA",
            PrefCipher::TripleDes => "3DES",
            PrefCipher::Cast5 => "CAST5",
            PrefCipher::Blowfish => "BLOWFISH",
            PrefCipher::Aes128 => "AES",
            PrefCipher::Aes192 => "AES192",
            PrefCipher::Aes256 => "AES256",
            PrefCipher::Twofish => "TWOFISH",
        }
    }

    /// Accept either the protocol code or the display name.
    pub fn from_listing(token: &str) -> Option<Self> {
        Self::from_code(token).or_else(|| {
            Self::ALL
                .iter()
                .copied()
                .find(|c| c.display_name().eq_ignore_ascii_case(token.trim()))
        })
    }
}

impl PrefDigest {
    /// Name gpg prints in `showpref` output.
    pub fn display_name(&self) -> &'static str {
        match self {
            PrefDigest::Md5 => "MD5",
            PrefDigest::Sha1 => "SHA1",
            PrefDigest::RipeMd160 => "RIPEMD160",
            PrefDigest::Sha256 => "SHA256",
            PrefDigest::Sha384 => "SHA384",
            PrefDigest::Sha512 => "SHA512",
            PrefDigest::Sha224 => "SHA224",
        }
    }

    /// Accept either the protocol code or the display name.
    pub fn from_listing(token: &str) -> Option<Self> {
        Self::from_code(token).or_else(|| {
            Self::ALL
                .iter()
                .copied()
                .find(|d| d.display_name().eq_ignore_ascii_case(token.trim()))
        })
    }
}

impl PrefCompression {
    /// Name gpg prints in `showpref` output.
    pub fn display_name(&self) -> &'static str {
        match self {
            PrefCompression::Uncompressed => "Uncompressed",
            PrefCompression::Zip => "ZIP",
            PrefCompression::Zlib => "ZLIB",
            PrefCompression::Bzip2 => "BZIP2",
        }
    }

    /// Accept either the protocol code or the display name.
    pub fn from_listing(token: &str) -> Option<Self> {
        Self::from_code(token).or_else(|| {
            Self::ALL
                .iter()
                .copied()
                .find(|z| z.display_name().eq_ignore_ascii_case(token.trim()))
        })
    }
}

/// Maps `showpref` feature names to `setpref` keywords.
const FEATURE_KEYWORDS: &[(&str, &str)] = &[
    ("MDC", "mdc"),
    ("AEAD", "aead"),
    ("Keyserver no-modify", "no-ks-modify"),
];

fn is_algorithm_code(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some('S' | 'H' | 'Z' | 's' | 'h' | 'z'))
        && chars.as_str().parse::<u32>().is_ok()
}

/// Ordered algorithm preferences for one user id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PreferenceSet {
    /// Cipher preferences, most preferred first
    pub ciphers: Vec<PrefCipher>,
    /// Digest preferences, most preferred first
    pub digests: Vec<PrefDigest>,
    /// Compression preferences, most preferred first
    pub compressions: Vec<PrefCompression>,
    /// Feature keywords such as `mdc` or `no-ks-modify`
    pub features: Vec<String>,
}

impl PreferenceSet {
    /// Empty preference set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append cipher preferences.
    pub fn with_ciphers(mut self, ciphers: impl IntoIterator<Item = PrefCipher>) -> Self {
        self.ciphers.extend(ciphers);
        self
    }

    /// Append digest preferences.
    pub fn with_digests(mut self, digests: impl IntoIterator<Item = PrefDigest>) -> Self {
        self.digests.extend(digests);
        self
    }

    /// Append compression preferences.
    pub fn with_compressions(
        mut self,
        compressions: impl IntoIterator<Item = PrefCompression>,
    ) -> Self {
        self.compressions.extend(compressions);
        self
    }

    /// Append feature keywords.
    pub fn with_features<S: Into<String>>(mut self, features: impl IntoIterator<Item = S>) -> Self {
        self.features.extend(features.into_iter().map(Into::into));
        self
    }

    /// Render as the single space-joined `setpref` argument.
    pub fn to_command_arg(&self) -> String {
        self.ciphers
            .iter()
            .map(|c| c.as_str().to_string())
            .chain(self.digests.iter().map(|d| d.as_str().to_string()))
            .chain(self.compressions.iter().map(|z| z.as_str().to_string()))
            .chain(self.features.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parse a `setpref`-style string such as `S9 S7 H10 Z2 mdc`.
    ///
    /// Tokens shaped like an algorithm code must be known codes; anything
    /// else is kept as a feature keyword.
    pub fn from_command_arg(arg: &str) -> crate::Result<Self> {
        let mut prefs = Self::new();
        for token in arg.split_whitespace() {
            if let Some(cipher) = PrefCipher::from_code(token) {
                prefs.ciphers.push(cipher);
            } else if let Some(digest) = PrefDigest::from_code(token) {
                prefs.digests.push(digest);
            } else if let Some(compression) = PrefCompression::from_code(token) {
                prefs.compressions.push(compression);
            } else if is_algorithm_code(token) {
                return Err(crate::Error::InvalidToken(format!(
                    "'{token}' is not a known preference code"
                )));
            } else {
                prefs.features.push(token.to_lowercase());
            }
        }
        Ok(prefs)
    }

    /// Build from a `showpref` mapping of lowercase line name to values.
    ///
    /// Unrecognised values are dropped rather than failing the whole set.
    pub fn from_listing(fields: &BTreeMap<String, Vec<String>>) -> Self {
        let values = |name: &str| fields.get(name).map(Vec::as_slice).unwrap_or_default();

        Self {
            ciphers: values("cipher")
                .iter()
                .filter_map(|v| PrefCipher::from_listing(v))
                .collect(),
            digests: values("digest")
                .iter()
                .filter_map(|v| PrefDigest::from_listing(v))
                .collect(),
            compressions: values("compression")
                .iter()
                .filter_map(|v| PrefCompression::from_listing(v))
                .collect(),
            features: values("features")
                .iter()
                .map(|v| {
                    FEATURE_KEYWORDS
                        .iter()
                        .find(|(name, _)| name.eq_ignore_ascii_case(v))
                        .map(|(_, keyword)| keyword.to_string())
                        .unwrap_or_else(|| v.to_lowercase())
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_exact() {
        assert_eq!(PrefCipher::Aes256.as_str(), "S9");
        assert_eq!(PrefCipher::Twofish.to_string(), "S10");
        assert_eq!(PrefDigest::Sha224.as_str(), "H11");
        assert_eq!(PrefCompression::Bzip2.as_str(), "Z3");
    }

    #[test]
    fn test_from_str_rejects_unknown_code() {
        assert_eq!("s9".parse::<PrefCipher>().unwrap(), PrefCipher::Aes256);
        assert!(matches!(
            "S5".parse::<PrefCipher>(),
            Err(crate::Error::InvalidToken(_))
        ));
    }

    #[test]
    fn test_from_listing_accepts_display_names() {
        assert_eq!(PrefCipher::from_listing("AES256"), Some(PrefCipher::Aes256));
        assert_eq!(PrefCipher::from_listing("3des"), Some(PrefCipher::TripleDes));
        assert_eq!(PrefDigest::from_listing("SHA512"), Some(PrefDigest::Sha512));
        assert_eq!(
            PrefCompression::from_listing("Uncompressed"),
            Some(PrefCompression::Uncompressed)
        );
        assert_eq!(PrefDigest::from_listing("H8"), Some(PrefDigest::Sha256));
        assert_eq!(PrefDigest::from_listing("WHIRLPOOL"), None);
    }

    #[test]
    fn test_command_arg_order() {
        let prefs = PreferenceSet::new()
            .with_ciphers([PrefCipher::Aes256, PrefCipher::Aes128])
            .with_digests([PrefDigest::Sha512])
            .with_compressions([PrefCompression::Zlib, PrefCompression::Uncompressed])
            .with_features(["mdc"]);
        assert_eq!(prefs.to_command_arg(), "S9 S7 H10 Z2 Z0 mdc");
    }

    #[test]
    fn test_from_command_arg() {
        let prefs = PreferenceSet::from_command_arg("S9 s7 H10 Z2 Z0 MDC").unwrap();
        assert_eq!(prefs.to_command_arg(), "S9 S7 H10 Z2 Z0 mdc");
        assert!(matches!(
            PreferenceSet::from_command_arg("S9 S5"),
            Err(crate::Error::InvalidToken(_))
        ));
    }

    #[test]
    fn test_empty_set_renders_empty() {
        assert_eq!(PreferenceSet::new().to_command_arg(), "");
    }

    #[test]
    fn test_from_listing_map() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "cipher".to_string(),
            vec!["AES256".to_string(), "AES".to_string(), "3DES".to_string()],
        );
        fields.insert("digest".to_string(), vec!["SHA512".to_string()]);
        fields.insert("compression".to_string(), vec!["ZLIB".to_string()]);
        fields.insert(
            "features".to_string(),
            vec!["MDC".to_string(), "Keyserver no-modify".to_string()],
        );
        fields.insert("aead".to_string(), vec!["OCB".to_string()]);

        let prefs = PreferenceSet::from_listing(&fields);
        assert_eq!(
            prefs.ciphers,
            vec![PrefCipher::Aes256, PrefCipher::Aes128, PrefCipher::TripleDes]
        );
        assert_eq!(prefs.digests, vec![PrefDigest::Sha512]);
        assert_eq!(prefs.compressions, vec![PrefCompression::Zlib]);
        assert_eq!(prefs.features, vec!["mdc", "no-ks-modify"]);
    }
}
