mod cli;
mod completer;
mod config;
mod helper;
mod parsing;
#[allow(clippy::module_inception)]
mod repl;

pub use cli::Cli;
pub use repl::Repl;
