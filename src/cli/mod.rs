mod args;
mod chat;
mod commands;
mod plan;

pub use args::Cli;
