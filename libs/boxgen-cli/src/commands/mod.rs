//! Subcommand implementations.

pub mod defaults;
pub mod generate;
pub mod inspect;
