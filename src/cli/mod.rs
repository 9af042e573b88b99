mod args;
mod commands;
mod config_cmd;
mod issues;
mod setup;
mod util;

pub use args::Cli;
