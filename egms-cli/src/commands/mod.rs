//! CLI subcommands.

pub mod common;
pub mod config;
pub mod grid;
pub mod orbit;
