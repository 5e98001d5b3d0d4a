//! # keyedit-session
//!
//! gpg conversations for keyedit.
//!
//! This crate provides:
//! - [`KeyEditor`], the interactive `--edit-key` driver with explicit
//!   selection state
//! - [`KeyLister`], batch `--with-colons` listings assembled into keys
//!
//! ## Architecture
//!
//! This is Layer 3 in the architecture - it depends on keyedit-core,
//! keyedit-parser and keyedit-process, and is the only layer that knows
//! gpg's command line and command words.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod editor;

// Re-export commonly used types
pub use batch::{KeyLister, ListOptions};
pub use editor::KeyEditor;
