//! CLI subcommand implementations

pub mod predict;
pub mod status;
