mod args;
mod commands;
mod handlers;
mod logging;
mod output;
pub mod types;

pub use args::{Cli, Commands};
pub use commands::run;
