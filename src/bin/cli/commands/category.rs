use clap::Subcommand;

use super::Client;
use crate::output::{self, OutputConfig};

/// Category commands
#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// List all categories
    List,
}

/// Executes a category command
pub async fn execute(client: &Client, cmd: CategoryCommands, config: &OutputConfig) -> anyhow::Result<()> {
    match cmd {
        CategoryCommands::List => {
            let categories = client.refresh_categories().await?;
            output::print_categories(&categories, config);
        }
    }
    Ok(())
}
