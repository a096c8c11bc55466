pub mod cli;
pub mod clipboard;
pub mod load_config;
pub mod markdown;
pub mod notion;

pub use cli::{run, Cli, Commands};
