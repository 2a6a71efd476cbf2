/// Service Contract
///
/// The authoritative item backend the synchronizer talks to. Two
/// implementations ship with the crate: an HTTP client for a remote server
/// and an in-memory service that applies the scheduling rules itself.
///
/// Mutations return a possibly partial [`ItemResponse`]; callers merge it onto
/// the item they already hold.

use std::future::Future;

use crate::dto::{
    ItemDraft, ItemPatch, ItemResponse, ReviewDateUpdate, TodaysReviewFilters, TodaysReviews,
    UnfinishRequest,
};
use crate::errors::Result;
use crate::models::{Category, Item, Pattern, ReviewBox};

pub mod http;
pub mod memory;

pub use http::HttpItemService;
pub use memory::MemoryItemService;

pub trait ItemService: Send + Sync {
    /// Creates an item and returns it with its generated schedule
    fn create_item(&self, draft: ItemDraft) -> impl Future<Output = Result<Item>> + Send;

    fn update_item(
        &self,
        item_id: &str,
        patch: ItemPatch,
    ) -> impl Future<Output = Result<ItemResponse>> + Send;

    fn delete_item(&self, item_id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Finishing destroys the schedule and removes the item from the active set
    fn mark_item_finished(&self, item_id: &str) -> impl Future<Output = Result<ItemResponse>> + Send;

    /// Returns a finished item to the schedule from a new learned date
    fn mark_item_unfinished(
        &self,
        item_id: &str,
        request: UnfinishRequest,
    ) -> impl Future<Output = Result<ItemResponse>> + Send;

    fn complete_review_date(
        &self,
        item_id: &str,
        review_date_id: &str,
    ) -> impl Future<Output = Result<ItemResponse>> + Send;

    fn incomplete_review_date(
        &self,
        item_id: &str,
        review_date_id: &str,
    ) -> impl Future<Output = Result<ItemResponse>> + Send;

    /// Applies a manual date edit, including the cascade over later steps
    fn update_review_date(
        &self,
        item_id: &str,
        review_date_id: &str,
        update: ReviewDateUpdate,
    ) -> impl Future<Output = Result<ItemResponse>> + Send;

    fn fetch_items_by_box(&self, box_id: &str) -> impl Future<Output = Result<Vec<Item>>> + Send;

    /// Items with neither box nor category
    fn fetch_unclassified_items(&self) -> impl Future<Output = Result<Vec<Item>>> + Send;

    /// Items in a category but in no box
    fn fetch_unclassified_items_by_category(
        &self,
        category_id: &str,
    ) -> impl Future<Output = Result<Vec<Item>>> + Send;

    fn fetch_todays_reviews(
        &self,
        filters: TodaysReviewFilters,
    ) -> impl Future<Output = Result<TodaysReviews>> + Send;

    fn fetch_patterns(&self) -> impl Future<Output = Result<Vec<Pattern>>> + Send;

    fn fetch_boxes(&self, category_id: &str) -> impl Future<Output = Result<Vec<ReviewBox>>> + Send;

    fn fetch_categories(&self) -> impl Future<Output = Result<Vec<Category>>> + Send;
}
