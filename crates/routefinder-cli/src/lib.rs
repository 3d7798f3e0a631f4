//! Routefinder CLI library.
//!
//! Subcommand handlers and output formatting for the `routefinder` binary,
//! kept in a library so integration tests and the binary share them.

pub mod commands;
pub mod output;
pub mod terminal;
