//! Command-line front end.

mod cli;
mod format;

pub use cli::{as_cli, print_usage};
