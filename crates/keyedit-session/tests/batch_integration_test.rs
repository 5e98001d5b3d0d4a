//! Integration tests for batch listings against a scripted gpg.

mod common;

use common::FakeGpg;
use keyedit_core::{Error, Validity};
use keyedit_session::{KeyLister, ListOptions};

const COLON_SCRIPT: &str = r#"
DIR=$(dirname "$0")
printf '%s\n' "$@" > "$DIR/args.log"
echo "gpg: checking the trustdb"
cat <<'EOF'
tru::1:1700000000:0:3:1:5
pub:u:3072:1:ABCDEF0123456789:1577836800:::u:::scESC:::::::23::0:
fpr:::::::::0000111122223333444455556666ABCDEF0123456789:
grp:::::::::AAAA0000:
uid:u::::1577836800::HASH1::Alice <alice@example.com>::::::::::0:
sig:!::1:ABCDEF0123456789:1577836800::::Alice <alice@example.com>:13x:::::10:
sub:u:3072:1:1111222233334444:1577836800::::::e::::::23:
fpr:::::::::9999888877776666555544441111222233334444:
pub:u:3072:1:DEADBEEF00000000:1577836800:::u::
uid:u::::1577836800::HASH2::Mallory <mallory@example.com>::::::::::0:
EOF
"#;

#[tokio::test]
async fn test_list_keys_skips_malformed_records() {
    let fake = FakeGpg::with_script(COLON_SCRIPT);
    let lister = KeyLister::new(fake.config());

    let keys = lister.list_keys(Some("alice"), ListOptions::default()).await.unwrap();

    assert_eq!(keys.len(), 1);
    let alice = &keys[0];
    assert_eq!(alice.primary.key_id, "ABCDEF0123456789");
    assert_eq!(alice.primary.validity, Some(Validity::Ultimate));
    assert_eq!(alice.primary_uid(), Some("Alice <alice@example.com>"));
    assert_eq!(alice.user_ids[0].signatures.len(), 1);
    assert_eq!(alice.subkeys.len(), 1);
    assert_eq!(
        alice.subkeys[0].fields.fingerprint.as_deref(),
        Some("9999888877776666555544441111222233334444")
    );

    let args = fake.args();
    assert!(args.contains(&"--with-colons".to_string()));
    assert!(args.contains(&"--with-sig-check".to_string()));
    assert_eq!(args.last().map(String::as_str), Some("alice"));
}

#[tokio::test]
async fn test_record_missing_trailing_field_is_skipped() {
    let script = "cat <<'EOF'
pub:u:3072:1:ABCDEF0123456789:1577836800:::u:::scESC:::::::23::0:
fpr:::::::::0000111122223333444455556666ABCDEF0123456789:
pub:u:3072:1:1234567812345678:1577836800:::u:::scESC:::::::23::0
EOF
";
    let fake = FakeGpg::with_script(script);
    let lister = KeyLister::new(fake.config());

    let keys = lister.list_keys(None, ListOptions::default()).await.unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].primary.key_id, "ABCDEF0123456789");
    assert_eq!(
        keys[0].fingerprint(),
        Some("0000111122223333444455556666ABCDEF0123456789")
    );
}

#[tokio::test]
async fn test_secret_listing_flags() {
    let fake = FakeGpg::with_script(COLON_SCRIPT);
    let lister = KeyLister::new(fake.config());
    let options = ListOptions {
        secret: true,
        check_signatures: false,
    };

    lister.list_keys(None, options).await.unwrap();

    let args = fake.args();
    assert!(args.contains(&"--with-sig-list".to_string()));
    assert_eq!(args.last().map(String::as_str), Some("--list-secret-keys"));
}

#[tokio::test]
async fn test_non_zero_exit_carries_diagnostics() {
    let fake = FakeGpg::with_script("echo 'gpg: keyblock resource: No such file' >&2; exit 2\n");
    let lister = KeyLister::new(fake.config());

    let err = lister.list_keys(None, ListOptions::default()).await.unwrap_err();
    assert!(matches!(err, Error::BatchFailed { code: Some(2), .. }));
    assert!(err.output().unwrap_or_default().contains("No such file"));
    assert!(err.to_string().contains("No such file"));
}

#[tokio::test]
async fn test_listing_timeout() {
    let fake = FakeGpg::with_script("sleep 30\n");
    let mut config = fake.config();
    config.timeouts.batch_ms = 300;
    let lister = KeyLister::new(config);

    let err = lister.list_keys(None, ListOptions::default()).await.unwrap_err();
    assert!(matches!(err, Error::WaitTimeout { .. }));
}
