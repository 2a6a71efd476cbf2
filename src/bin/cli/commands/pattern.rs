use clap::Subcommand;

use super::Client;
use crate::output::{self, OutputConfig};

/// Pattern commands
#[derive(Subcommand, Debug)]
pub enum PatternCommands {
    /// List all patterns
    List,
}

/// Executes a pattern command
pub async fn execute(client: &Client, cmd: PatternCommands, config: &OutputConfig) -> anyhow::Result<()> {
    match cmd {
        PatternCommands::List => {
            let patterns = client.refresh_patterns().await?;
            output::print_patterns(&patterns, config);
        }
    }
    Ok(())
}
