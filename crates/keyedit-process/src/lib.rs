//! # keyedit-process
//!
//! Subprocess sessions for keyedit.
//!
//! This crate provides:
//! - Spawning a program with piped standard streams
//! - Background draining of stdout and stderr into output buffers
//! - Writing newline-terminated input lines
//! - Waiting for an exact marker line with a deadline
//! - Waiting for exit and idempotent termination
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on keyedit-core for
//! errors and session identifiers, and knows nothing about gpg itself.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod output;
pub mod session;
pub mod wait;

// Re-export commonly used types
pub use output::OutputBuffer;
pub use session::ProcessSession;
