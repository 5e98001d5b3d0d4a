//! # keyedit
//!
//! Command-line front end for the keyedit crates.
//!
//! This crate provides:
//! - Argument parsing ([`cli`])
//! - Configuration loading and command execution ([`commands`])
//!
//! ## Architecture
//!
//! This is Layer 4 in the architecture - the binary that ties together:
//! - keyedit-core: Types, errors and configuration
//! - keyedit-session: Editor and batch listings
//!
//! The binary itself is in main.rs.

pub mod cli;
pub mod commands;

// Re-export commonly used types
pub use cli::{Cli, Command, EditAction};
