use clap::Subcommand;

use super::Client;
use crate::output::{self, OutputConfig};

/// Box commands
#[derive(Subcommand, Debug)]
pub enum BoxCommands {
    /// List the boxes of a category
    List {
        /// The category ID
        #[clap(long)]
        category: String,
    },
}

/// Executes a box command
pub async fn execute(client: &Client, cmd: BoxCommands, config: &OutputConfig) -> anyhow::Result<()> {
    match cmd {
        BoxCommands::List { category } => {
            let boxes = client.refresh_boxes(&category).await?;
            output::print_boxes(&boxes, config);
        }
    }
    Ok(())
}
