use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::Config;

use super::commands;

/// Entry point for the `shanshi` command-line interface.
#[derive(Debug, Parser)]
#[command(
    name = "shanshi",
    about = "AI-powered daily meal planner and nutrition chat for seniors",
    version,
    long_about = None
)]
pub struct Cli {
    /// Optional subcommand; defaults to fetching today's plan.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch today's meal plan and render it, backfilling images.
    Plan,
    /// Ask the nutritionist. Without a question, starts an interactive chat.
    Chat(ChatArgs),
}

#[derive(Debug, Args)]
pub struct ChatArgs {
    /// Question for the nutritionist; omit to chat interactively.
    #[arg(trailing_var_arg = true)]
    pub question: Vec<String>,
}

impl Cli {
    pub async fn run(self, config: Config) -> Result<()> {
        commands::run(self, config).await
    }
}
