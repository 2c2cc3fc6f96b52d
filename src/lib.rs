pub mod cli;
pub mod inspect;
pub mod load_config;

pub use cli::{execute, run, Cli, Commands};
