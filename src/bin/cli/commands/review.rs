use chrono::NaiveDate;
use clap::Subcommand;
use revisit::scheduling::OverduePolicy;

use super::{load, Client, LocationArgs};
use crate::output::{self, OutputConfig};

/// Review date commands
#[derive(Subcommand, Debug)]
pub enum ReviewCommands {
    /// Mark a review date as done
    Complete {
        /// The item ID
        item_id: String,
        /// The review date ID
        review_date_id: String,
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Mark a review date as not done
    Incomplete {
        /// The item ID
        item_id: String,
        /// The review date ID
        review_date_id: String,
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Move a review date back and shift the later ones
    Reschedule {
        /// The item ID
        item_id: String,
        /// The review date ID
        review_date_id: String,
        /// The new date, between the original date and yesterday
        #[clap(long)]
        date: NaiveDate,
        /// What to do with later dates that fall due: compress or pin
        #[clap(long, default_value = "compress")]
        policy: OverduePolicy,
        #[command(flatten)]
        location: LocationArgs,
    },
}

/// Executes a review command
pub async fn execute(client: &Client, cmd: ReviewCommands, config: &OutputConfig) -> anyhow::Result<()> {
    let item = match cmd {
        ReviewCommands::Complete {
            item_id,
            review_date_id,
            location,
        } => {
            load(client, &location).await?;
            client.complete_review_date(&item_id, &review_date_id).await?
        }
        ReviewCommands::Incomplete {
            item_id,
            review_date_id,
            location,
        } => {
            load(client, &location).await?;
            client.incomplete_review_date(&item_id, &review_date_id).await?
        }
        ReviewCommands::Reschedule {
            item_id,
            review_date_id,
            date,
            policy,
            location,
        } => {
            client.refresh_patterns().await?;
            load(client, &location).await?;
            client
                .reschedule_review_date(&item_id, &review_date_id, date, policy)
                .await?
        }
    };
    output::print_item(&item, config);
    Ok(())
}
