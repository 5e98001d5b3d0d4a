//! Key assembler for colon listings.

use tracing::{debug, warn};

use keyedit_core::protocol::DIAGNOSTIC_PREFIX;
use keyedit_core::{Key, KeyFields, Signature, Subkey};

use crate::colons::{ColonRecord, RecordType};

/// Where the next `fpr`/`grp`/`sig` record attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Primary,
    UserId,
    Subkey,
}

/// Builds [`Key`] values from a stream of colon records.
///
/// Malformed records are skipped. A malformed primary key record also
/// discards everything listed beneath it, so its subkeys and user ids are
/// never attached to the previous key.
#[derive(Debug, Default)]
pub struct KeyAssembler {
    keys: Vec<Key>,
    current: Option<Key>,
    anchor: Option<Anchor>,
    skipped: usize,
}

impl KeyAssembler {
    /// Create a new assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whole listing in one go.
    pub fn assemble(output: &str) -> Vec<Key> {
        let mut assembler = Self::new();
        for line in output.lines() {
            assembler.push_line(line);
        }
        assembler.finish()
    }

    /// Number of lines dropped as malformed so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Feed one line of output.
    pub fn push_line(&mut self, line: &str) {
        if line.starts_with(DIAGNOSTIC_PREFIX) || line.trim().is_empty() {
            return;
        }

        match ColonRecord::parse(line) {
            Ok(Some(record)) => self.push(record),
            Ok(None) => {}
            Err(e) => {
                warn!("Skipping malformed colon record: {}", e);
                self.skipped += 1;
                let opens_key = line
                    .split(':')
                    .next()
                    .and_then(RecordType::from_tag)
                    .is_some_and(|t| t.is_primary());
                if opens_key {
                    self.flush();
                    self.anchor = None;
                }
            }
        }
    }

    /// Feed one parsed record.
    pub fn push(&mut self, record: ColonRecord) {
        match record {
            ColonRecord::Key {
                record_type,
                fields,
            } if record_type.is_primary() => {
                self.flush();
                self.current = Some(Key {
                    secret: record_type == RecordType::SecretKey,
                    primary: fields,
                    user_ids: vec![],
                    subkeys: vec![],
                    signatures: vec![],
                });
                self.anchor = Some(Anchor::Primary);
            }
            ColonRecord::Key {
                record_type,
                fields,
            } => {
                let Some(key) = self.current.as_mut() else {
                    debug!("Dropping orphan subkey record");
                    return;
                };
                key.subkeys.push(Subkey {
                    secret: record_type == RecordType::SecretSubkey,
                    fields,
                    signatures: vec![],
                });
                self.anchor = Some(Anchor::Subkey);
            }
            ColonRecord::UserId(uid) => {
                let Some(key) = self.current.as_mut() else {
                    debug!("Dropping orphan user id record");
                    return;
                };
                key.user_ids.push(uid);
                self.anchor = Some(Anchor::UserId);
            }
            ColonRecord::Fingerprint(fpr) => {
                if let Some(fields) = self.anchored_fields() {
                    fields.fingerprint.get_or_insert(fpr);
                }
            }
            ColonRecord::Keygrip(grp) => {
                if let Some(fields) = self.anchored_fields() {
                    fields.keygrip.get_or_insert(grp);
                }
            }
            ColonRecord::Signature(sig) => self.attach_signature(sig),
        }
    }

    /// Finish and return every assembled key.
    pub fn finish(mut self) -> Vec<Key> {
        self.flush();
        self.keys
    }

    fn flush(&mut self) {
        if let Some(key) = self.current.take() {
            self.keys.push(key);
        }
    }

    fn anchored_fields(&mut self) -> Option<&mut KeyFields> {
        let key = self.current.as_mut()?;
        match self.anchor? {
            Anchor::Primary => Some(&mut key.primary),
            Anchor::Subkey => key.subkeys.last_mut().map(|s| &mut s.fields),
            // fpr after a uid only appears for designated revokers; ignore
            Anchor::UserId => None,
        }
    }

    fn attach_signature(&mut self, sig: Signature) {
        let Some(key) = self.current.as_mut() else {
            return;
        };
        match self.anchor {
            Some(Anchor::UserId) => {
                if let Some(uid) = key.user_ids.last_mut() {
                    uid.signatures.push(sig);
                }
            }
            Some(Anchor::Subkey) => {
                if let Some(sub) = key.subkeys.last_mut() {
                    sub.signatures.push(sig);
                }
            }
            Some(Anchor::Primary) | None => key.signatures.push(sig),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
tru::1:1700000000:0:3:1:5
pub:u:3072:1:ABCDEF0123456789:1577836800:::u:::scESC:::::::23::0:
fpr:::::::::0000111122223333444455556666ABCDEF0123456789:
grp:::::::::AAAA0000:
uid:u::::1577836800::HASH1::Alice <alice@example.com>::::::::::0:
sig:!::1:ABCDEF0123456789:1577836800::::Alice <alice@example.com>:13x:::::10:
sub:u:3072:1:1111222233334444:1577836800::::::e::::::23:
fpr:::::::::9999888877776666555544441111222233334444:
grp:::::::::BBBB1111:
sig:!::1:ABCDEF0123456789:1577836800::::Alice <alice@example.com>:18x:::::10:
pub:f:255:22:5555666677778888:1600000000:::-:::scSC:::::ed25519:::0:
fpr:::::::::FFFF5555666677778888:
uid:f::::1600000000::HASH2::Bob <bob@example.org>::::::::::0:
";

    #[test]
    fn test_assemble_two_keys() {
        let keys = KeyAssembler::assemble(LISTING);
        assert_eq!(keys.len(), 2);

        let alice = &keys[0];
        assert!(!alice.secret);
        assert_eq!(
            alice.fingerprint(),
            Some("0000111122223333444455556666ABCDEF0123456789")
        );
        assert_eq!(alice.primary.keygrip.as_deref(), Some("AAAA0000"));
        assert_eq!(alice.primary_uid(), Some("Alice <alice@example.com>"));
        assert_eq!(alice.user_ids[0].signatures.len(), 1);
        assert_eq!(alice.subkeys.len(), 1);
        assert_eq!(
            alice.subkeys[0].fields.fingerprint.as_deref(),
            Some("9999888877776666555544441111222233334444")
        );
        assert_eq!(alice.subkeys[0].fields.keygrip.as_deref(), Some("BBBB1111"));
        assert_eq!(alice.subkeys[0].signatures[0].class, "18x");

        let bob = &keys[1];
        assert_eq!(bob.primary.curve.as_deref(), Some("ed25519"));
        assert_eq!(bob.primary_uid(), Some("Bob <bob@example.org>"));
        assert!(bob.subkeys.is_empty());
    }

    #[test]
    fn test_one_good_one_truncated() {
        let output = "\
pub:u:3072:1:ABCDEF0123456789:1577836800:::u:::scESC:::::::23::0:
pub:u:3072:1:1234567812345678:1577836800:::u::
";
        let mut assembler = KeyAssembler::new();
        for line in output.lines() {
            assembler.push_line(line);
        }
        assert_eq!(assembler.skipped(), 1);
        let keys = assembler.finish();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].primary.key_id, "ABCDEF0123456789");
    }

    #[test]
    fn test_record_missing_trailing_field_is_skipped() {
        let good = "pub:u:3072:1:ABCDEF0123456789:1577836800:::u:::scESC:::::::23::0:";
        let short = good.strip_suffix(':').unwrap().replace("ABCDEF01", "12345678");
        let output = format!("{good}\n{short}\n");

        let mut assembler = KeyAssembler::new();
        for line in output.lines() {
            assembler.push_line(line);
        }
        assert_eq!(assembler.skipped(), 1);
        let keys = assembler.finish();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].primary.key_id, "ABCDEF0123456789");
    }

    #[test]
    fn test_malformed_primary_poisons_children() {
        let output = "\
pub:u:3072:1:AAAAAAAAAAAAAAAA:1577836800:::u:::scESC:::::::23::0:
uid:u::::1577836800::H1::Alice::::::::::0:
pub:u:3072:1
uid:u::::1577836800::H2::Mallory::::::::::0:
sub:u:3072:1:BBBBBBBBBBBBBBBB:1577836800::::::e::::::23:
";
        let keys = KeyAssembler::assemble(output);
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].user_ids.len(), 1);
        assert_eq!(keys[0].user_ids[0].text, "Alice");
        assert!(keys[0].subkeys.is_empty());
    }

    #[test]
    fn test_diagnostics_are_dropped() {
        let output = "gpg: checking the trustdb\npub:u:3072:1:AAAAAAAAAAAAAAAA:1577836800:::u:::scESC:::::::23::0:\n";
        assert_eq!(KeyAssembler::assemble(output).len(), 1);
    }

    #[test]
    fn test_empty_output() {
        assert!(KeyAssembler::assemble("").is_empty());
    }
}
