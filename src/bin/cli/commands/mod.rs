pub mod boxes;
pub mod category;
pub mod item;
pub mod pattern;
pub mod review;
pub mod today;

use clap::Args;
use revisit::Synchronizer;
use revisit::service::HttpItemService;
use revisit::store::QueryKey;

/// The synchronizer every command runs against
pub type Client = Synchronizer<HttpItemService>;

/// Where an item currently lives
///
/// Mutations work on cached items, so commands load this location first.
/// Leave both out for items with neither box nor category.
#[derive(Args, Debug, Clone, Default)]
pub struct LocationArgs {
    /// The box the item is in
    #[clap(long = "box")]
    pub box_id: Option<String>,
    /// The category the item is in
    #[clap(long = "category")]
    pub category_id: Option<String>,
}

impl LocationArgs {
    pub fn query_key(&self) -> QueryKey {
        QueryKey::new(self.box_id.clone(), self.category_id.clone())
    }
}

/// Loads an item's location into the caches
pub async fn load(client: &Client, location: &LocationArgs) -> anyhow::Result<()> {
    client.items_at(location.query_key()).await?;
    Ok(())
}
