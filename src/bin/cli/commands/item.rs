use anyhow::bail;
use chrono::NaiveDate;
use clap::Subcommand;
use revisit::dto::{ItemDraft, ItemPatch, UnfinishRequest};

use super::{load, Client, LocationArgs};
use crate::output::{self, OutputConfig};

/// Item management commands
#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// List the active items at a location
    List {
        #[command(flatten)]
        location: LocationArgs,
        /// Fetch from the server even if cached
        #[clap(long)]
        refresh: bool,
    },
    /// Create a new item
    Create {
        /// The item name
        name: String,
        /// Free-form notes
        #[clap(long)]
        detail: Option<String>,
        /// Put the item in this box (its pattern wins)
        #[clap(long = "box")]
        box_id: Option<String>,
        /// File the item under this category
        #[clap(long = "category")]
        category_id: Option<String>,
        /// Schedule with this pattern
        #[clap(long = "pattern")]
        pattern_id: Option<String>,
        /// Day the item was learned (default: today)
        #[clap(long)]
        learned: Option<NaiveDate>,
    },
    /// Move an item to another box or out of its box
    Move {
        /// The item ID
        id: String,
        #[command(flatten)]
        from: LocationArgs,
        /// Target box
        #[clap(long, conflicts_with = "unboxed")]
        to_box: Option<String>,
        /// Target category
        #[clap(long)]
        to_category: Option<String>,
        /// Take the item out of its box
        #[clap(long)]
        unboxed: bool,
    },
    /// Mark an item finished
    Finish {
        /// The item ID
        id: String,
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Put a finished item back on a schedule
    Unfinish {
        /// The item ID
        id: String,
        /// Schedule with this pattern (a box pattern still wins)
        #[clap(long = "pattern")]
        pattern_id: Option<String>,
        /// New learned date (default: today)
        #[clap(long)]
        learned: Option<NaiveDate>,
    },
    /// Delete an item
    Delete {
        /// The item ID
        id: String,
    },
}

/// Executes an item command
pub async fn execute(client: &Client, cmd: ItemCommands, config: &OutputConfig) -> anyhow::Result<()> {
    match cmd {
        ItemCommands::List { location, refresh } => {
            let key = location.query_key();
            let items = if refresh {
                client.reload(key).await?
            } else {
                client.items_at(key).await?
            };
            output::print_items(&items, config);
        }
        ItemCommands::Create {
            name,
            detail,
            box_id,
            category_id,
            pattern_id,
            learned,
        } => {
            if let Some(category_id) = &category_id {
                client.refresh_boxes(category_id).await?;
            }
            let mut draft = ItemDraft::new(name, learned.unwrap_or_else(|| client.today()));
            draft.detail = detail;
            draft.box_id = box_id;
            draft.category_id = category_id;
            draft.pattern_id = pattern_id;

            let item = client.create_item(draft).await?;
            output::print_item(&item, config);
        }
        ItemCommands::Move {
            id,
            from,
            to_box,
            to_category,
            unboxed,
        } => {
            let patch = ItemPatch {
                box_id: match (to_box, unboxed) {
                    (Some(box_id), _) => Some(Some(box_id)),
                    (None, true) => Some(None),
                    (None, false) => None,
                },
                category_id: to_category.map(Some),
                ..Default::default()
            };
            if patch.is_empty() {
                bail!("Nothing to do: pass --to-box, --to-category or --unboxed");
            }

            client.refresh_catalog().await?;
            load(client, &from).await?;
            let item = client.update_item(&id, patch).await?;
            output::print_item(&item, config);
        }
        ItemCommands::Finish { id, location } => {
            load(client, &location).await?;
            client.mark_finished(&id).await?;
            output::print_success(&format!("Finished item {}", id), config);
        }
        ItemCommands::Unfinish { id, pattern_id, learned } => {
            let request = UnfinishRequest {
                pattern_id,
                learned_date: learned.unwrap_or_else(|| client.today()),
            };
            let item = client.mark_unfinished(&id, request).await?;
            output::print_item(&item, config);
        }
        ItemCommands::Delete { id } => {
            client.delete_item(&id).await?;
            output::print_success(&format!("Deleted item {}", id), config);
        }
    }
    Ok(())
}
