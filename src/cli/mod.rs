//! Command-line interface module.

mod args;
pub mod init;

pub use args::{Cli, Task};
