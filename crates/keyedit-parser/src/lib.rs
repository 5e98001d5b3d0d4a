//! # keyedit-parser
//!
//! Stateless parsers for the text gpg produces.
//!
//! This crate provides:
//! - Status-protocol line parsing (`[GNUPG:] KEYWORD args`)
//! - Edit-key listing parsing (key blocks, user id lines, grouping)
//! - `showpref` and `help` output parsing
//! - Colon record parsing and assembly into keys
//!
//! All parsers are total over well-formed input and degrade optional fields
//! to `None` on partially well-formed input. Only mandatory tokens raise
//! errors, and only for the offending record.
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on keyedit-core only.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assembler;
pub mod colons;
pub mod edit_listing;
pub mod status;

// Re-export commonly used types
pub use assembler::KeyAssembler;
pub use colons::{parse_timestamp, ColonRecord, RecordType};
pub use edit_listing::{
    is_key_header, is_uid_line, parse_annotations, parse_help, parse_key_item, parse_listing,
    parse_preferences, parse_uid_item,
};
pub use status::{status_lines, strip_acks, StatusKeyword, StatusLine};
