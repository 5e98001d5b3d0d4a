//! Parsers for the human-readable output of `gpg --edit-key`.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use keyedit_core::{EditListing, Error, KeyListItem, Result, UidListItem};

use crate::status::StatusLine;

lazy_static! {
    /// `[status] (index)[.*] identity`
    static ref UID_LINE: Regex = Regex::new(
        r"^\[\s*(?P<status>[^\]]*?)\s*\]\s*\((?P<index>\d+)\)(?P<marks>[.*]*)\s*(?P<uid>.*)$"
    )
    .unwrap();

    /// Colon followed by padding, as in `created: 2020-01-01`.
    static ref ANNOTATION_GAP: Regex = Regex::new(r":\s+").unwrap();
}

/// Record kinds that open a key block.
const KEY_KINDS: &[&str] = &["pub", "sub", "sec", "ssb"];

/// Suffixes gpg appends to the kind token (`*` selected, `#` offline, `>` card).
const KIND_MARKS: &[char] = &['*', '#', '>'];

fn split_kind(token: &str) -> (&str, bool) {
    let kind = token.trim_end_matches(KIND_MARKS);
    (kind, token[kind.len()..].contains('*'))
}

/// Whether a line opens a key block.
pub fn is_key_header(line: &str) -> bool {
    if line.starts_with(char::is_whitespace) {
        return false;
    }
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(kind), Some(algo_and_id)) => {
            KEY_KINDS.contains(&split_kind(kind).0) && algo_and_id.contains('/')
        }
        _ => false,
    }
}

/// Whether a line is a user id line.
pub fn is_uid_line(line: &str) -> bool {
    StatusLine::parse(line).is_none() && UID_LINE.is_match(line)
}

/// Parse `name:value` annotations into a map.
///
/// Tokens without a colon are ignored, so stray prose does not break the
/// record.
pub fn parse_annotations(text: &str) -> HashMap<String, String> {
    ANNOTATION_GAP
        .replace_all(text, ":")
        .split_whitespace()
        .filter_map(|token| token.split_once(':'))
        .map(|(name, value)| (name.to_lowercase(), value.to_string()))
        .collect()
}

fn parse_date(value: Option<&String>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

/// Parse one key block: header line plus continuation lines.
///
/// # Example
///
/// ```
/// use keyedit_parser::parse_key_item;
///
/// let item = parse_key_item(
///     "pub   rsa3072/ABCD1234\n     created: 2020-01-01 expires: 2030-01-01 usage: SC",
/// )
/// .unwrap();
/// assert_eq!(item.algorithm, "rsa3072");
/// assert_eq!(item.usage.as_deref(), Some("SC"));
/// ```
pub fn parse_key_item(block: &str) -> Result<KeyListItem> {
    let block = block.trim_start_matches(['\r', '\n']);
    let (header, info) = block.split_once('\n').unwrap_or((block, ""));

    let mut tokens = header.split_whitespace();
    let kind_token = tokens
        .next()
        .ok_or_else(|| Error::ParseError("empty key header".to_string()))?;
    let (kind, selected) = split_kind(kind_token);
    if !KEY_KINDS.contains(&kind) {
        return Err(Error::ParseError(format!("unknown key kind: {kind_token}")));
    }

    let algo_and_id = tokens
        .next()
        .ok_or_else(|| Error::ParseError(format!("missing algorithm/id in: {header}")))?;
    let (algorithm, id_hash) = algo_and_id
        .split_once('/')
        .filter(|(algo, id)| !algo.is_empty() && !id.is_empty() && !id.contains('/'))
        .ok_or_else(|| Error::ParseError(format!("malformed algorithm/id: {algo_and_id}")))?;

    // Anything after the id on the header line is annotation text as well.
    let trailing = tokens.collect::<Vec<_>>().join(" ");
    let options = parse_annotations(&format!("{trailing} {info}"));

    Ok(KeyListItem {
        kind: kind.to_string(),
        selected,
        algorithm: algorithm.to_string(),
        id_hash: id_hash.to_string(),
        id: algo_and_id.to_string(),
        created: parse_date(options.get("created")),
        expires: parse_date(options.get("expires").or_else(|| options.get("expired"))),
        usage: non_empty(options.get("usage")),
        trust: non_empty(options.get("trust")),
        validity: non_empty(options.get("validity")),
    })
}

/// Parse one user id line.
///
/// # Example
///
/// ```
/// use keyedit_parser::parse_uid_item;
///
/// let uid = parse_uid_item("[ultimate] (1)*. Alice <alice@example.com>").unwrap();
/// assert_eq!(uid.index, 1);
/// assert!(uid.selected);
/// ```
pub fn parse_uid_item(line: &str) -> Result<UidListItem> {
    let line = line.trim_end();
    let caps = UID_LINE
        .captures(line)
        .ok_or_else(|| Error::ParseError(format!("not a user id line: {line}")))?;

    let index = caps["index"]
        .parse::<u32>()
        .map_err(|e| Error::ParseError(format!("bad user id index in '{line}': {e}")))?;

    Ok(UidListItem {
        status: caps["status"].to_string(),
        index,
        user_id: caps["uid"].trim().to_string(),
        selected: caps["marks"].contains('*'),
    })
}

enum Group<'a> {
    Key(Vec<&'a str>),
    Uid(&'a str),
}

/// Split a `list` response into key and user id records.
///
/// A key header opens a key group, a bracketed line opens a user id group,
/// and any other line continues the current key group. Status lines and
/// blank lines are ignored; text before the first group is dropped.
pub fn parse_listing(text: &str) -> Result<EditListing> {
    let mut groups: Vec<Group<'_>> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() || StatusLine::parse(line).is_some() {
            continue;
        }

        if is_uid_line(line) {
            groups.push(Group::Uid(line));
        } else if is_key_header(line) {
            groups.push(Group::Key(vec![line]));
        } else if let Some(Group::Key(lines)) = groups.last_mut() {
            lines.push(line);
        }
    }

    let mut listing = EditListing::default();
    for group in groups {
        match group {
            Group::Key(lines) => listing.keys.push(parse_key_item(&lines.join("\n"))?),
            Group::Uid(line) => listing.user_ids.push(parse_uid_item(line)?),
        }
    }

    Ok(listing)
}

/// Parse `showpref` output into lowercase line names and their values.
pub fn parse_preferences(text: &str) -> BTreeMap<String, Vec<String>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('['))
        .filter_map(|line| line.split_once(':'))
        .map(|(name, values)| {
            let values = values
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect();
            (name.trim().to_lowercase(), values)
        })
        .collect()
}

/// Parse `help` output into command name and description.
///
/// Indented and `*` lines are footnotes and are skipped.
pub fn parse_help(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.starts_with([' ', '\t', '*']))
        .filter(|line| StatusLine::parse(line).is_none())
        .filter_map(|line| {
            let (command, description) = line.split_once(char::is_whitespace)?;
            Some((command.to_string(), description.trim().to_string()))
        })
        .collect()
}
