//! A scripted stand-in for gpg used by the integration tests.
//!
//! The script is run as `sh <script> <args...>` so tests never execute a
//! freshly written file directly. It logs its arguments to `args.log` and
//! every input line to `input.log` next to itself.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use keyedit_core::DriverConfig;
use tempfile::TempDir;

/// Emulates the `--edit-key` status protocol.
pub const EDITOR_SCRIPT: &str = r#"
DIR=$(dirname "$0")
printf '%s\n' "$@" > "$DIR/args.log"
: > "$DIR/input.log"

ack() { echo "[GNUPG:] GOT_IT"; }
prompt() { echo "[GNUPG:] GET_LINE keyedit.prompt"; }
take() {
    n=$1
    while [ "$n" -gt 0 ]; do
        IFS= read -r answer || exit 0
        printf '%s\n' "$answer" >> "$DIR/input.log"
        ack
        n=$((n - 1))
    done
}
store_prefs() {
    c=""; d=""; z=""; f=""
    for t in $1; do
        case "$t" in
            S*) c="${c:+$c, }$t" ;;
            H*) d="${d:+$d, }$t" ;;
            Z*) z="${z:+$z, }$t" ;;
            *) f="${f:+$f, }$t" ;;
        esac
    done
    printf '     Cipher: %s\n     Digest: %s\n     Compression: %s\n     Features: %s\n' \
        "$c" "$d" "$z" "$f" > "$DIR/prefs.txt"
}

selected=""
echo "Secret key is available."
prompt
while IFS= read -r line; do
    printf '%s\n' "$line" >> "$DIR/input.log"
    ack
    case "$line" in
        list) cat "$DIR/listing.txt" ;;
        help) cat "$DIR/help.txt" ;;
        "uid 9") echo "gpg: No user ID with index 9" >&2; exit 2 ;;
        "uid "*) selected=${line#uid } ;;
        "key "*) ;;
        adduid|addkey) take 3 ;;
        deluid)
            take 1
            if [ "$selected" = "3" ]; then
                echo "gpg: cannot delete the last user ID" >&2
                exit 2
            fi
            ;;
        revuid) take 5 ;;
        "setpref "*) take 1; store_prefs "${line#setpref }" ;;
        showpref)
            echo "[ultimate] (1). Alice <alice@example.com>"
            cat "$DIR/prefs.txt"
            ;;
        save) exit 0 ;;
        quit) take 2; exit 0 ;;
        hang) sleep 30 ;;
        crash) echo "gpg: signal 11 caught ... exiting" >&2; exit 2 ;;
        *) echo "Invalid command  (try \"help\")" ;;
    esac
    prompt
done
"#;

const LISTING: &str = "\
sec  rsa3072/ABCDEF0123456789
     created: 2020-01-01  expires: never       usage: SC
     trust: ultimate      validity: ultimate
ssb  rsa3072/1111222233334444
     created: 2020-01-01  expires: 2030-01-01  usage: E
[ultimate] (1). Alice <alice@example.com>
[ultimate] (2)  Alice Work <alice@work.example>
";

const HELP: &str = "\
quit        quit this menu
save        save and quit
help        show this help
list        list key and user IDs
uid         select user ID N
key         select subkey N
adduid      add a user ID
deluid      delete selected user IDs
* The 'sign' command may be prefixed with an 'l' for local signatures (lsign),
  a 't' for trust signatures (tsign), an 'nr' for non-revocable signatures
";

const PREFS: &str = "\
     Cipher: AES256, AES192, AES, 3DES
     Digest: SHA512, SHA384, SHA256, SHA224, SHA1
     Compression: ZLIB, BZIP2, ZIP, Uncompressed
     Features: MDC, Keyserver no-modify
";

/// Temporary directory holding a fake gpg script and its logs.
pub struct FakeGpg {
    dir: TempDir,
}

impl FakeGpg {
    /// Fake interactive editor.
    pub fn editor() -> Self {
        Self::with_script(EDITOR_SCRIPT)
    }

    /// Fake running an arbitrary shell script body.
    pub fn with_script(body: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(dir.path().join("fake-gpg.sh"), body).expect("write script");
        fs::write(dir.path().join("listing.txt"), LISTING).expect("write listing");
        fs::write(dir.path().join("help.txt"), HELP).expect("write help");
        fs::write(dir.path().join("prefs.txt"), PREFS).expect("write prefs");
        Self { dir }
    }

    /// Directory holding the script and logs.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the script.
    pub fn script(&self) -> PathBuf {
        self.dir.path().join("fake-gpg.sh")
    }

    /// Driver configuration that runs the script instead of gpg.
    pub fn config(&self) -> DriverConfig {
        let mut config = DriverConfig::default();
        config.gpg.program = "sh".to_string();
        config.gpg.extra_args = vec![self.script().display().to_string()];
        config.timeouts.ready_ms = 5_000;
        config.timeouts.exit_ms = 5_000;
        config.timeouts.batch_ms = 5_000;
        config
    }

    /// Lines the script received on stdin, in order.
    pub fn input(&self) -> Vec<String> {
        Self::read_lines(&self.dir.path().join("input.log"))
    }

    /// Arguments the script was started with.
    pub fn args(&self) -> Vec<String> {
        Self::read_lines(&self.dir.path().join("args.log"))
    }

    fn read_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}
