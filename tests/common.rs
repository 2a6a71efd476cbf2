//! Common test utilities for revisit integration tests
//!
//! Provides a seeded in-memory backend and two service wrappers that make
//! the backend misbehave the way a real server can: answering mutations
//! with partial items, or failing outright.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::NaiveDate;
use revisit::clock::{Clock, FixedClock};
use revisit::dto::{
    ItemDraft, ItemPatch, ItemResponse, ReviewDateUpdate, TodaysReviewFilters, TodaysReviews,
    UnfinishRequest,
};
use revisit::models::{Category, Item, Pattern, ReviewBox, TargetWeight};
use revisit::scheduling::{OffsetBasis, ScheduleGenerator};
use revisit::service::{ItemService, MemoryItemService};
use revisit::{Result, RevisitError, Synchronizer};

/// A day in June 2024
pub fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, n).unwrap()
}

/// The date every test treats as today
pub fn today() -> NaiveDate {
    day(20)
}

pub fn clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(today()))
}

pub fn generator() -> ScheduleGenerator {
    ScheduleGenerator::new(OffsetBasis::Cumulative)
}

/// Catalog seeded into every backend
///
/// `standard` and `twin` share the intervals `[1, 3, 7]`; `stretched` is
/// `[1, 3, 8]`. Each has its own box in the one category, and `loose` is a
/// box without a pattern.
#[derive(Debug, Clone)]
pub struct World {
    pub standard: Pattern,
    pub twin: Pattern,
    pub stretched: Pattern,
    pub category: Category,
    pub standard_box: ReviewBox,
    pub twin_box: ReviewBox,
    pub stretched_box: ReviewBox,
    pub loose_box: ReviewBox,
}

impl World {
    pub fn new() -> Self {
        let standard = Pattern::new("Standard".to_string(), TargetWeight::Normal, &[1, 3, 7]);
        let twin = Pattern::new("Standard copy".to_string(), TargetWeight::Heavy, &[1, 3, 7]);
        let stretched = Pattern::new("Stretched".to_string(), TargetWeight::Light, &[1, 3, 8]);
        let category = Category::new("Chemistry".to_string());
        let standard_box = ReviewBox::new("Acids".to_string(), category.id.clone(), Some(standard.id.clone()));
        let twin_box = ReviewBox::new("Bases".to_string(), category.id.clone(), Some(twin.id.clone()));
        let stretched_box = ReviewBox::new("Salts".to_string(), category.id.clone(), Some(stretched.id.clone()));
        let loose_box = ReviewBox::new("Scratch".to_string(), category.id.clone(), None);

        Self {
            standard,
            twin,
            stretched,
            category,
            standard_box,
            twin_box,
            stretched_box,
            loose_box,
        }
    }

    /// Seeds the catalog into a fresh in-memory backend
    pub fn service(&self) -> MemoryItemService {
        let service = MemoryItemService::new(generator(), clock());
        for pattern in [&self.standard, &self.twin, &self.stretched] {
            service.insert_pattern(pattern.clone()).unwrap();
        }
        service.insert_category(self.category.clone()).unwrap();
        for review_box in [&self.standard_box, &self.twin_box, &self.stretched_box, &self.loose_box] {
            service.insert_box(review_box.clone()).unwrap();
        }
        service
    }

    pub fn draft_in(&self, review_box: &ReviewBox, name: &str, learned: NaiveDate) -> ItemDraft {
        let mut draft = ItemDraft::new(name.to_string(), learned);
        draft.box_id = Some(review_box.id.clone());
        draft
    }
}

/// Builds a synchronizer over `service` with the catalog loaded
pub async fn synchronizer<S: ItemService>(service: S) -> Synchronizer<S> {
    let sync = Synchronizer::new(service, generator(), clock());
    sync.refresh_catalog().await.unwrap();
    sync
}

/// Answers mutations with only the item id and the fields it was asked about
///
/// The schedule is never echoed back; the client has to keep what it had.
pub struct PartialService<S> {
    pub inner: S,
}

impl<S> PartialService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

fn strip(response: ItemResponse) -> ItemResponse {
    ItemResponse {
        id: response.id,
        ..Default::default()
    }
}

impl<S: ItemService> ItemService for PartialService<S> {
    async fn create_item(&self, draft: ItemDraft) -> Result<Item> {
        self.inner.create_item(draft).await
    }

    async fn update_item(&self, item_id: &str, patch: ItemPatch) -> Result<ItemResponse> {
        tokio::task::yield_now().await;
        let full = self.inner.update_item(item_id, patch.clone()).await?;
        Ok(ItemResponse {
            id: full.id,
            name: patch.name.and(full.name),
            box_id: patch.box_id.and(full.box_id),
            ..Default::default()
        })
    }

    async fn delete_item(&self, item_id: &str) -> Result<()> {
        self.inner.delete_item(item_id).await
    }

    async fn mark_item_finished(&self, item_id: &str) -> Result<ItemResponse> {
        tokio::task::yield_now().await;
        let full = self.inner.mark_item_finished(item_id).await?;
        Ok(ItemResponse {
            id: full.id,
            is_finished: full.is_finished,
            ..Default::default()
        })
    }

    async fn mark_item_unfinished(&self, item_id: &str, request: UnfinishRequest) -> Result<ItemResponse> {
        self.inner.mark_item_unfinished(item_id, request).await
    }

    async fn complete_review_date(&self, item_id: &str, review_date_id: &str) -> Result<ItemResponse> {
        tokio::task::yield_now().await;
        let full = self.inner.complete_review_date(item_id, review_date_id).await?;
        Ok(strip(full))
    }

    async fn incomplete_review_date(&self, item_id: &str, review_date_id: &str) -> Result<ItemResponse> {
        tokio::task::yield_now().await;
        let full = self.inner.incomplete_review_date(item_id, review_date_id).await?;
        Ok(strip(full))
    }

    async fn update_review_date(
        &self,
        item_id: &str,
        review_date_id: &str,
        update: ReviewDateUpdate,
    ) -> Result<ItemResponse> {
        let full = self.inner.update_review_date(item_id, review_date_id, update).await?;
        Ok(strip(full))
    }

    async fn fetch_items_by_box(&self, box_id: &str) -> Result<Vec<Item>> {
        self.inner.fetch_items_by_box(box_id).await
    }

    async fn fetch_unclassified_items(&self) -> Result<Vec<Item>> {
        self.inner.fetch_unclassified_items().await
    }

    async fn fetch_unclassified_items_by_category(&self, category_id: &str) -> Result<Vec<Item>> {
        self.inner.fetch_unclassified_items_by_category(category_id).await
    }

    async fn fetch_todays_reviews(&self, filters: TodaysReviewFilters) -> Result<TodaysReviews> {
        self.inner.fetch_todays_reviews(filters).await
    }

    async fn fetch_patterns(&self) -> Result<Vec<Pattern>> {
        self.inner.fetch_patterns().await
    }

    async fn fetch_boxes(&self, category_id: &str) -> Result<Vec<ReviewBox>> {
        self.inner.fetch_boxes(category_id).await
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>> {
        self.inner.fetch_categories().await
    }
}

/// Passes reads through and fails every mutation while switched off
///
/// Counts the mutation calls that reach it, so tests can tell a local
/// rejection from a remote one.
pub struct FlakyService<S> {
    pub inner: S,
    down: AtomicBool,
    mutations: AtomicUsize,
}

impl<S> FlakyService<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            down: AtomicBool::new(false),
            mutations: AtomicUsize::new(0),
        }
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn mutation_calls(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn gate(&self) -> Result<()> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(RevisitError::Transport("connection reset by peer".to_string()));
        }
        Ok(())
    }
}

impl<S: ItemService> ItemService for FlakyService<S> {
    async fn create_item(&self, draft: ItemDraft) -> Result<Item> {
        self.gate()?;
        self.inner.create_item(draft).await
    }

    async fn update_item(&self, item_id: &str, patch: ItemPatch) -> Result<ItemResponse> {
        self.gate()?;
        self.inner.update_item(item_id, patch).await
    }

    async fn delete_item(&self, item_id: &str) -> Result<()> {
        self.gate()?;
        self.inner.delete_item(item_id).await
    }

    async fn mark_item_finished(&self, item_id: &str) -> Result<ItemResponse> {
        self.gate()?;
        self.inner.mark_item_finished(item_id).await
    }

    async fn mark_item_unfinished(&self, item_id: &str, request: UnfinishRequest) -> Result<ItemResponse> {
        self.gate()?;
        self.inner.mark_item_unfinished(item_id, request).await
    }

    async fn complete_review_date(&self, item_id: &str, review_date_id: &str) -> Result<ItemResponse> {
        self.gate()?;
        self.inner.complete_review_date(item_id, review_date_id).await
    }

    async fn incomplete_review_date(&self, item_id: &str, review_date_id: &str) -> Result<ItemResponse> {
        self.gate()?;
        self.inner.incomplete_review_date(item_id, review_date_id).await
    }

    async fn update_review_date(
        &self,
        item_id: &str,
        review_date_id: &str,
        update: ReviewDateUpdate,
    ) -> Result<ItemResponse> {
        self.gate()?;
        self.inner.update_review_date(item_id, review_date_id, update).await
    }

    async fn fetch_items_by_box(&self, box_id: &str) -> Result<Vec<Item>> {
        self.inner.fetch_items_by_box(box_id).await
    }

    async fn fetch_unclassified_items(&self) -> Result<Vec<Item>> {
        self.inner.fetch_unclassified_items().await
    }

    async fn fetch_unclassified_items_by_category(&self, category_id: &str) -> Result<Vec<Item>> {
        self.inner.fetch_unclassified_items_by_category(category_id).await
    }

    async fn fetch_todays_reviews(&self, filters: TodaysReviewFilters) -> Result<TodaysReviews> {
        self.inner.fetch_todays_reviews(filters).await
    }

    async fn fetch_patterns(&self) -> Result<Vec<Pattern>> {
        self.inner.fetch_patterns().await
    }

    async fn fetch_boxes(&self, category_id: &str) -> Result<Vec<ReviewBox>> {
        self.inner.fetch_boxes(category_id).await
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>> {
        self.inner.fetch_categories().await
    }
}
