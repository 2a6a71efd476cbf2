use clap::Args;
use revisit::dto::TodaysReviewFilters;

use super::Client;
use crate::output::{self, OutputConfig};

/// Filters for today's reviews
#[derive(Args, Debug)]
pub struct TodayArgs {
    /// Only this category
    #[clap(long = "category")]
    pub category_id: Option<String>,
    /// Only this box
    #[clap(long = "box")]
    pub box_id: Option<String>,
    /// Leave out reviews whose date has passed
    #[clap(long)]
    pub no_overdue: bool,
}

/// Shows today's due reviews
pub async fn execute(client: &Client, args: TodayArgs, config: &OutputConfig) -> anyhow::Result<()> {
    let filters = TodaysReviewFilters {
        category_id: args.category_id,
        box_id: args.box_id,
        include_overdue: !args.no_overdue,
    };
    let reviews = client.todays_reviews(filters).await?;
    output::print_todays_reviews(&reviews, config);
    Ok(())
}
