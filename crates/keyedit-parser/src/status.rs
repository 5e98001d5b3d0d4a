//! Status-protocol line parsing.
//!
//! With `--status-fd` gpg interleaves lines of the form
//! `[GNUPG:] KEYWORD arg...` with its regular output.

use keyedit_core::protocol::STATUS_PREFIX;

/// Keyword of a status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusKeyword {
    /// Waiting for a line of input
    GetLine,
    /// Waiting for a yes/no answer
    GetBool,
    /// Waiting for hidden input (passphrase)
    GetHidden,
    /// Input line consumed
    GotIt,
    /// Any other keyword
    Other(String),
}

impl StatusKeyword {
    fn parse(word: &str) -> Self {
        match word {
            "GET_LINE" => StatusKeyword::GetLine,
            "GET_BOOL" => StatusKeyword::GetBool,
            "GET_HIDDEN" => StatusKeyword::GetHidden,
            "GOT_IT" => StatusKeyword::GotIt,
            other => StatusKeyword::Other(other.to_string()),
        }
    }
}

/// One parsed status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// Keyword
    pub keyword: StatusKeyword,
    /// Whitespace-separated arguments
    pub args: Vec<String>,
}

impl StatusLine {
    /// Parse a status line. Returns `None` for regular output.
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim_end_matches(['\r', '\n']).strip_prefix(STATUS_PREFIX)?;
        let mut words = rest.split_whitespace();
        let keyword = StatusKeyword::parse(words.next()?);
        Some(Self {
            keyword,
            args: words.map(str::to_string).collect(),
        })
    }

    /// Whether gpg is waiting for input, and on which prompt.
    pub fn prompt(&self) -> Option<&str> {
        match self.keyword {
            StatusKeyword::GetLine | StatusKeyword::GetBool | StatusKeyword::GetHidden => {
                self.args.first().map(String::as_str)
            }
            _ => None,
        }
    }

    /// The edit-key ready marker.
    pub fn is_ready(&self) -> bool {
        self.keyword == StatusKeyword::GetLine && self.prompt() == Some("keyedit.prompt")
    }

    /// An input acknowledgement.
    pub fn is_ack(&self) -> bool {
        self.keyword == StatusKeyword::GotIt
    }
}

/// Drop acknowledgement lines and trim the remaining text.
pub fn strip_acks(text: &str) -> String {
    text.lines()
        .filter(|line| !StatusLine::parse(line).is_some_and(|s| s.is_ack()))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Every status line contained in a block of output.
pub fn status_lines(text: &str) -> Vec<StatusLine> {
    text.lines().filter_map(StatusLine::parse).collect()
}
