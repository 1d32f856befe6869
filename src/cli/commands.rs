use anyhow::Result;

use crate::config::Config;

use super::args::{Cli, Command};
use super::chat;
use super::plan;

pub(crate) async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Some(Command::Chat(args)) => chat::handle_chat(args, &config).await,
        Some(Command::Plan) | None => plan::handle_plan(&config).await,
    }
}
