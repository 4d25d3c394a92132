pub mod commands;
pub mod exec;
pub mod scan;

pub use commands::{Cli, Commands};
