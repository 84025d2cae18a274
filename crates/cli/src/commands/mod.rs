//! CLI subcommands.

pub mod lookup;
pub mod migrate;
