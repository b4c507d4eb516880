pub mod config;
pub mod error;
pub mod gateway;
pub mod repl;
pub mod session;
pub mod sync;
pub mod wallet;
