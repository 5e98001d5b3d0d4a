//! Status-protocol constants and edit-key command words.

/// Prefix of every line gpg writes to its status channel.
pub const STATUS_PREFIX: &str = "[GNUPG:]";

/// Line emitted whenever the editor is blocked waiting for the next command.
pub const READY_MARKER: &str = "[GNUPG:] GET_LINE keyedit.prompt";

/// Line emitted after gpg consumed one input line.
pub const ACK_MARKER: &str = "[GNUPG:] GOT_IT";

/// Prefix of gpg's human-readable diagnostics.
pub const DIAGNOSTIC_PREFIX: &str = "gpg: ";

/// Token that clears a `key`/`uid` selection.
pub const SELECT_NONE: &str = "0";

/// Affirmative answer to a confirmation prompt.
pub const YES: &str = "y";

/// Negative answer to a confirmation prompt.
pub const NO: &str = "n";

/// Environment for every gpg invocation; listings are parsed in the C locale.
pub const CHILD_ENV: &[(&str, &str)] = &[("LC_ALL", "C")];

/// Command words understood by `gpg --edit-key`.
pub mod command {
    /// List keys and user ids.
    pub const LIST: &str = "list";
    /// Toggle subkey selection.
    pub const KEY: &str = "key";
    /// Toggle user id selection.
    pub const UID: &str = "uid";
    /// Add a user id.
    pub const ADD_UID: &str = "adduid";
    /// Delete the selected user ids.
    pub const DELETE_UID: &str = "deluid";
    /// Revoke the selected user ids.
    pub const REVOKE_UID: &str = "revuid";
    /// Set the preference list.
    pub const SET_PREF: &str = "setpref";
    /// Show preferences in verbose form.
    pub const SHOW_PREF: &str = "showpref";
    /// Add a subkey.
    pub const ADD_KEY: &str = "addkey";
    /// Save and quit.
    pub const SAVE: &str = "save";
    /// Quit, optionally discarding changes.
    pub const QUIT: &str = "quit";
    /// List available commands.
    pub const HELP: &str = "help";
}
