pub mod bootstrap;
pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::{Cli, Command};
