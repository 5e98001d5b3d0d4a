//! Colon-delimited record parsing (`gpg --with-colons`).

use chrono::{DateTime, NaiveDateTime, Utc};

use keyedit_core::{Error, KeyFields, Result, Signature, SignatureKind, UserId, Validity};

/// Record types this parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    /// `pub`
    PublicKey,
    /// `sub`
    Subkey,
    /// `sec`
    SecretKey,
    /// `ssb`
    SecretSubkey,
    /// `uid`
    UserId,
    /// `uat`
    UserAttribute,
    /// `fpr`
    Fingerprint,
    /// `grp`
    Keygrip,
    /// `sig`
    Signature,
    /// `rev`
    Revocation,
}

impl RecordType {
    /// Map the first field to a record type.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "pub" => RecordType::PublicKey,
            "sub" => RecordType::Subkey,
            "sec" => RecordType::SecretKey,
            "ssb" => RecordType::SecretSubkey,
            "uid" => RecordType::UserId,
            "uat" => RecordType::UserAttribute,
            "fpr" => RecordType::Fingerprint,
            "grp" => RecordType::Keygrip,
            "sig" => RecordType::Signature,
            "rev" => RecordType::Revocation,
            _ => return None,
        })
    }

    /// Fewest fields a well-formed record of this type carries.
    pub fn min_fields(&self) -> usize {
        match self {
            RecordType::PublicKey
            | RecordType::Subkey
            | RecordType::SecretKey
            | RecordType::SecretSubkey => 12,
            RecordType::UserId | RecordType::UserAttribute => 10,
            RecordType::Fingerprint | RecordType::Keygrip => 10,
            RecordType::Signature | RecordType::Revocation => 11,
        }
    }

    /// Whether the record opens a new key.
    pub fn is_primary(&self) -> bool {
        matches!(self, RecordType::PublicKey | RecordType::SecretKey)
    }
}

/// One parsed colon record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColonRecord {
    /// `pub`/`sub`/`sec`/`ssb`
    Key {
        /// Which of the four key records
        record_type: RecordType,
        /// Parsed key fields (fingerprint and keygrip come later)
        fields: KeyFields,
    },
    /// `uid`/`uat`
    UserId(UserId),
    /// `fpr`
    Fingerprint(String),
    /// `grp`
    Keygrip(String),
    /// `sig`/`rev`
    Signature(Signature),
}

/// Parse a colon-format timestamp: epoch seconds or `YYYYMMDDTHHMMSS`.
pub fn parse_timestamp(field: &str) -> Option<DateTime<Utc>> {
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    if field.bytes().all(|b| b.is_ascii_digit()) {
        let secs = field.parse::<i64>().ok()?;
        return DateTime::<Utc>::from_timestamp(secs, 0);
    }
    NaiveDateTime::parse_from_str(field, "%Y%m%dT%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn parse_number(field: &str) -> u32 {
    field.trim().parse().unwrap_or(0)
}

fn optional(field: Option<&&str>) -> Option<String> {
    field.filter(|f| !f.is_empty()).map(|f| f.to_string())
}

impl ColonRecord {
    /// Parse one line.
    ///
    /// Returns `Ok(None)` for record types this parser does not handle and
    /// `Err` when a known record has fewer fields than it must or does not
    /// end with the `:` field terminator gpg writes after the last field.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim_end_matches(['\r', '\n']);
        let fields: Vec<&str> = line.split(':').collect();

        let Some(record_type) = fields.first().and_then(|tag| RecordType::from_tag(tag)) else {
            return Ok(None);
        };

        if fields.len() < record_type.min_fields() {
            return Err(Error::ParseError(format!(
                "{} record has {} fields, expected at least {}: {line}",
                fields[0],
                fields.len(),
                record_type.min_fields()
            )));
        }
        if fields.last() != Some(&"") {
            return Err(Error::ParseError(format!(
                "{} record is missing its field terminator: {line}",
                fields[0]
            )));
        }

        let record = match record_type {
            RecordType::PublicKey
            | RecordType::Subkey
            | RecordType::SecretKey
            | RecordType::SecretSubkey => ColonRecord::Key {
                record_type,
                fields: KeyFields {
                    validity: Validity::from_field(fields[1]),
                    length: parse_number(fields[2]),
                    algorithm: parse_number(fields[3]),
                    key_id: fields[4].to_string(),
                    created: parse_timestamp(fields[5]),
                    expires: parse_timestamp(fields[6]),
                    owner_trust: Validity::from_field(fields[8]),
                    capabilities: fields[11].to_string(),
                    curve: optional(fields.get(16)),
                    fingerprint: None,
                    keygrip: None,
                },
            },
            RecordType::UserId | RecordType::UserAttribute => ColonRecord::UserId(UserId {
                validity: Validity::from_field(fields[1]),
                created: parse_timestamp(fields[5]),
                expires: parse_timestamp(fields[6]),
                uid_hash: fields[7].to_string(),
                text: fields[9].to_string(),
                is_attribute: record_type == RecordType::UserAttribute,
                signatures: vec![],
            }),
            RecordType::Fingerprint => ColonRecord::Fingerprint(fields[9].to_string()),
            RecordType::Keygrip => ColonRecord::Keygrip(fields[9].to_string()),
            RecordType::Signature | RecordType::Revocation => ColonRecord::Signature(Signature {
                kind: if record_type == RecordType::Signature {
                    SignatureKind::Signature
                } else {
                    SignatureKind::Revocation
                },
                check: fields[1].chars().next(),
                algorithm: parse_number(fields[3]),
                issuer: fields[4].to_string(),
                created: parse_timestamp(fields[5]),
                expires: parse_timestamp(fields[6]),
                signer_uid: fields[9].to_string(),
                class: fields[10].to_string(),
            }),
        };

        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUB: &str = "pub:u:3072:1:ABCDEF0123456789:1577836800:1893456000::u:::scESC:::+::::23::0:";

    #[test]
    fn test_parse_pub_record() {
        let record = ColonRecord::parse(PUB).unwrap().unwrap();
        let ColonRecord::Key { record_type, fields } = record else {
            panic!("expected key record");
        };
        assert_eq!(record_type, RecordType::PublicKey);
        assert_eq!(fields.validity, Some(Validity::Ultimate));
        assert_eq!(fields.length, 3072);
        assert_eq!(fields.algorithm, 1);
        assert_eq!(fields.key_id, "ABCDEF0123456789");
        assert_eq!(fields.created.map(|d| d.timestamp()), Some(1_577_836_800));
        assert_eq!(fields.expires.map(|d| d.timestamp()), Some(1_893_456_000));
        assert_eq!(fields.owner_trust, Some(Validity::Ultimate));
        assert_eq!(fields.capabilities, "scESC");
        assert_eq!(fields.curve, None);
    }

    #[test]
    fn test_parse_ecc_subkey_curve() {
        let line = "sub:u:255:18:0011223344556677:1700000000::::::e:::::cv25519::";
        let Some(ColonRecord::Key { fields, .. }) = ColonRecord::parse(line).unwrap() else {
            panic!("expected key record");
        };
        assert_eq!(fields.curve.as_deref(), Some("cv25519"));
        assert_eq!(fields.expires, None);
    }

    #[test]
    fn test_parse_uid_record() {
        let line = "uid:u::::1577836800::0123ABCD::Alice <alice@example.com>::::::::::0:";
        let Some(ColonRecord::UserId(uid)) = ColonRecord::parse(line).unwrap() else {
            panic!("expected uid record");
        };
        assert_eq!(uid.text, "Alice <alice@example.com>");
        assert_eq!(uid.uid_hash, "0123ABCD");
        assert!(!uid.is_attribute);
    }

    #[test]
    fn test_parse_fpr_and_grp() {
        assert_eq!(
            ColonRecord::parse("fpr:::::::::AAAABBBBCCCCDDDD:").unwrap(),
            Some(ColonRecord::Fingerprint("AAAABBBBCCCCDDDD".to_string()))
        );
        assert_eq!(
            ColonRecord::parse("grp:::::::::1234567890:").unwrap(),
            Some(ColonRecord::Keygrip("1234567890".to_string()))
        );
    }

    #[test]
    fn test_parse_sig_record() {
        let line = "sig:!::1:ABCDEF0123456789:1577836800::::Alice <alice@example.com>:13x::ABCDEF:::10:";
        let Some(ColonRecord::Signature(sig)) = ColonRecord::parse(line).unwrap() else {
            panic!("expected signature record");
        };
        assert_eq!(sig.kind, SignatureKind::Signature);
        assert_eq!(sig.check, Some('!'));
        assert_eq!(sig.issuer, "ABCDEF0123456789");
        assert_eq!(sig.class, "13x");
    }

    #[test]
    fn test_unknown_record_is_skipped() {
        assert_eq!(ColonRecord::parse("tru::1:1700000000:0:3:1:5").unwrap(), None);
        assert_eq!(ColonRecord::parse("").unwrap(), None);
    }

    #[test]
    fn test_truncated_record_is_error() {
        assert!(ColonRecord::parse("pub:u:3072:1:ABCDEF0123456789:1577836800").is_err());
        assert!(ColonRecord::parse("fpr:::::").is_err());
    }

    #[test]
    fn test_record_without_terminator_is_error() {
        let truncated = PUB.strip_suffix(':').unwrap();
        assert!(matches!(ColonRecord::parse(truncated), Err(Error::ParseError(_))));
        assert!(ColonRecord::parse("fpr:::::::::AAAABBBBCCCCDDDD").is_err());
        assert!(ColonRecord::parse(PUB).unwrap().is_some());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("0").map(|d| d.timestamp()), Some(0));
        assert_eq!(
            parse_timestamp("20200101T000000").map(|d| d.timestamp()),
            Some(1_577_836_800)
        );
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("garbage"), None);
    }
}
