//! CLI support for the `vault` binary.

pub mod args;
pub mod commands;
pub mod context;
pub mod logging;
pub mod output;
