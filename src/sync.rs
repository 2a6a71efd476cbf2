use std::sync::{Arc, Mutex, RwLock};

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::catalog::Catalog;
use crate::clock::Clock;
use crate::dto::{
    ItemDraft, ItemPatch, ReviewDateUpdate, TodaysReviewFilters, TodaysReviews, UnfinishRequest,
};
use crate::errors::{Result, RevisitError};
use crate::models::{Category, Item, Pattern, ReviewBox};
use crate::scheduling::{
    apply_placement, check_placement, OverduePolicy, PlacementDecision, PlacementTarget, RescheduleOperator,
    ScheduleGenerator,
};
use crate::service::ItemService;
use crate::store::{merge_item, ItemStore, LocationKey, MutationLocks, QueryKey};

/// Client-side façade over an [`ItemService`]
///
/// Owns the item caches, the catalog and the per-item mutation locks. Every
/// mutation goes through here so that:
///
/// - local checks (validation, placement, reschedule bounds) run before the
///   service is called;
/// - mutations of one item are serialized, mutations of different items are not;
/// - the service response is merged onto the provisional item and applied to
///   the location store and the query cache together.
///
/// A failed service call leaves the caches untouched and is never retried.
pub struct Synchronizer<S> {
    service: S,
    store: Mutex<ItemStore>,
    catalog: RwLock<Catalog>,
    locks: MutationLocks,
    generator: ScheduleGenerator,
    clock: Arc<dyn Clock>,
}

impl<S: ItemService> Synchronizer<S> {
    /// Creates a synchronizer with empty caches
    ///
    /// ### Arguments
    ///
    /// * `service` - The authoritative backend
    /// * `generator` - Offset rules shared with the backend
    /// * `clock` - Source of "today" for validation and reschedule bounds
    pub fn new(service: S, generator: ScheduleGenerator, clock: Arc<dyn Clock>) -> Self {
        Self {
            service,
            store: Mutex::new(ItemStore::new()),
            catalog: RwLock::new(Catalog::new()),
            locks: MutationLocks::new(),
            generator,
            clock,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn with_store<R>(&self, f: impl FnOnce(&mut ItemStore) -> R) -> R {
        let mut store = match self.store.lock() {
            Ok(store) => store,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut store)
    }

    fn with_catalog<R>(&self, f: impl FnOnce(&Catalog) -> R) -> R {
        let catalog = match self.catalog.read() {
            Ok(catalog) => catalog,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&catalog)
    }

    fn with_catalog_mut<R>(&self, f: impl FnOnce(&mut Catalog) -> R) -> R {
        let mut catalog = match self.catalog.write() {
            Ok(catalog) => catalog,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut catalog)
    }

    /// A copy of both cache layers
    pub fn snapshot(&self) -> ItemStore {
        self.with_store(|store| store.clone())
    }

    /// A copy of the catalog
    pub fn catalog(&self) -> Catalog {
        self.with_catalog(Catalog::clone)
    }

    /// Items cached for a query, without fetching
    pub fn cached(&self, key: &QueryKey) -> Option<Vec<Item>> {
        self.with_store(|store| store.query(key).map(<[Item]>::to_vec))
    }

    /// Items cached at a location, without fetching
    pub fn at_location(&self, key: &LocationKey) -> Option<Vec<Item>> {
        self.with_store(|store| store.location(key).map(<[Item]>::to_vec))
    }

    /// Last known state of an item
    pub fn find_item(&self, item_id: &str) -> Option<Item> {
        self.with_store(|store| store.find(item_id).cloned())
    }

    fn require_item(&self, item_id: &str) -> Result<Item> {
        self.find_item(item_id)
            .ok_or_else(|| RevisitError::NotFound(format!("item {}", item_id)))
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn refresh_patterns(&self) -> Result<Vec<Pattern>> {
        let patterns = self.service.fetch_patterns().await?;
        debug!("Loaded {} patterns", patterns.len());
        self.with_catalog_mut(|catalog| catalog.set_patterns(patterns.clone()));
        Ok(patterns)
    }

    #[instrument(skip(self))]
    pub async fn refresh_categories(&self) -> Result<Vec<Category>> {
        let categories = self.service.fetch_categories().await?;
        self.with_catalog_mut(|catalog| catalog.set_categories(categories.clone()));
        Ok(categories)
    }

    #[instrument(skip(self))]
    pub async fn refresh_boxes(&self, category_id: &str) -> Result<Vec<ReviewBox>> {
        let boxes = self.service.fetch_boxes(category_id).await?;
        self.with_catalog_mut(|catalog| catalog.set_boxes(category_id, boxes.clone()));
        Ok(boxes)
    }

    /// Loads patterns, categories and the boxes of every category
    pub async fn refresh_catalog(&self) -> Result<()> {
        self.refresh_patterns().await?;
        for category in self.refresh_categories().await? {
            self.refresh_boxes(&category.id).await?;
        }
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    async fn fetch_query(&self, key: &QueryKey) -> Result<Vec<Item>> {
        match key.location() {
            LocationKey::Box(box_id) => self.service.fetch_items_by_box(&box_id).await,
            LocationKey::UnclassifiedCategory(category_id) => {
                self.service.fetch_unclassified_items_by_category(&category_id).await
            }
            LocationKey::Unclassified => self.service.fetch_unclassified_items().await,
        }
    }

    /// Items for a query, served from the cache when present
    #[instrument(skip(self), fields(query = %key))]
    pub async fn items_at(&self, key: QueryKey) -> Result<Vec<Item>> {
        if let Some(items) = self.cached(&key) {
            debug!("Cache hit with {} items", items.len());
            return Ok(items);
        }
        self.reload(key).await
    }

    /// Fetches a query from the service and replaces its cache entries
    #[instrument(skip(self), fields(query = %key))]
    pub async fn reload(&self, key: QueryKey) -> Result<Vec<Item>> {
        let items = self.fetch_query(&key).await?;
        debug!("Fetched {} items", items.len());
        self.with_store(|store| store.set_query(key, items.clone()));
        Ok(items.into_iter().filter(|item| !item.is_finished).collect())
    }

    /// Forgets a cached query so the next read goes to the service
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        self.with_store(|store| store.invalidate_query(key))
    }

    /// Today's due reviews; never cached
    #[instrument(skip(self, filters), fields(filters = %filters))]
    pub async fn todays_reviews(&self, filters: TodaysReviewFilters) -> Result<TodaysReviews> {
        self.service.fetch_todays_reviews(filters).await
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Sorts and sanity-checks a schedule the service generated
    fn accept_schedule(&self, mut item: Item) -> Item {
        let Some(pattern_id) = item.pattern_id.clone() else {
            return item;
        };
        if item.review_dates.is_empty() {
            return item;
        }
        let accepted = self.with_catalog(|catalog| {
            catalog
                .pattern(&pattern_id)
                .and_then(|pattern| self.generator.accept(pattern, item.review_dates.clone()))
        });
        match accepted {
            Ok(review_dates) => item.review_dates = review_dates,
            Err(RevisitError::NotFound(_)) => {}
            Err(e) => warn!("Keeping schedule of item {} as sent: {}", item.id, e),
        }
        item
    }

    /// Creates an item and inserts it at its location
    ///
    /// If the catalog knows the target box and it binds a pattern, the draft
    /// is sent with that pattern.
    ///
    /// ### Errors
    ///
    /// Returns `Validation` for a malformed draft before calling the service,
    /// or whatever the service returns.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_item(&self, mut draft: ItemDraft) -> Result<Item> {
        draft.validate(self.today())?;

        if let Some(box_id) = draft.box_id.as_deref() {
            if let Ok(review_box) = self.with_catalog(|catalog| catalog.review_box(box_id).cloned()) {
                draft.category_id = Some(review_box.category_id);
                if review_box.pattern_id.is_some() {
                    draft.pattern_id = review_box.pattern_id;
                }
            }
        }

        let item = self.service.create_item(draft).await?;
        let item = self.accept_schedule(item);

        info!("Created item {} at {}", item.id, item.location());
        self.with_store(|store| store.apply(None, &item));
        Ok(item)
    }

    /// The item as the service should return it after `patch`
    ///
    /// Placement is applied first. A schedule without completed reviews is
    /// regenerated locally when the pattern or the learned date changes, so a
    /// response that leaves out the schedule never keeps stale dates.
    fn provisional_update(
        &self,
        previous: &Item,
        patch: &ItemPatch,
        placement: Option<&(PlacementTarget, PlacementDecision)>,
    ) -> Result<Item> {
        let placed = match placement {
            Some((target, decision)) => self.with_catalog(|catalog| {
                apply_placement(previous, target, decision, catalog, &self.generator)
            })?,
            None => previous.clone(),
        };
        let mut provisional = patch.apply_to(&placed);

        let moved_in_time = provisional.learned_date != placed.learned_date;
        let repatterned = provisional.pattern_id != placed.pattern_id;
        if !(moved_in_time || repatterned) || provisional.has_completed_reviews() {
            return Ok(provisional);
        }
        let Some(pattern_id) = provisional.pattern_id.clone() else {
            return Ok(provisional);
        };

        let learned_date = provisional.learned_date;
        let generated = self.with_catalog(|catalog| {
            catalog
                .pattern(&pattern_id)
                .and_then(|pattern| self.generator.generate(pattern, learned_date))
        });
        match generated {
            Ok(review_dates) => provisional.review_dates = review_dates,
            Err(RevisitError::NotFound(_)) => {
                warn!("Pattern {} is not loaded, schedule of item {} left to the service", pattern_id, previous.id);
            }
            Err(e) => return Err(e),
        }
        Ok(provisional)
    }

    /// Updates an item, gating box moves on pattern compatibility
    ///
    /// The item must already be cached (its location loaded).
    ///
    /// ### Errors
    ///
    /// Returns an error if:
    /// - The item is not cached (`NotFound`)
    /// - The patch is malformed (`Validation`)
    /// - The target box binds an incompatible pattern (`IncompatiblePattern`)
    /// - The service call fails
    #[instrument(skip(self, patch))]
    pub async fn update_item(&self, item_id: &str, mut patch: ItemPatch) -> Result<Item> {
        let _guard = self.locks.acquire(item_id).await;
        let previous = self.require_item(item_id)?;
        patch.validate(self.today())?;

        let mut placement = None;
        if let Some(target) = patch.placement_target(&previous) {
            let decision = self.with_catalog(|catalog| check_placement(&previous, &target, catalog))?;
            debug!("Placement {:?} -> {:?}", target, decision);

            if let PlacementTarget::Box(box_id) = &target {
                if patch.category_id.is_none() {
                    let category_id =
                        self.with_catalog(|catalog| catalog.review_box(box_id).map(|b| b.category_id.clone()))?;
                    patch.category_id = Some(Some(category_id));
                }
            }
            match &decision {
                PlacementDecision::Keep => {}
                PlacementDecision::AdoptPattern { pattern_id }
                | PlacementDecision::Regenerate { pattern_id } => {
                    patch.pattern_id = Some(Some(pattern_id.clone()));
                }
            }
            placement = Some((target, decision));
        }

        let provisional = self.provisional_update(&previous, &patch, placement.as_ref())?;
        let response = self.service.update_item(item_id, patch).await?;
        let merged = self.accept_schedule(merge_item(&provisional, response));

        self.with_store(|store| store.apply(Some(&previous), &merged));
        Ok(merged)
    }

    /// Deletes an item and drops it from every cache
    #[instrument(skip(self))]
    pub async fn delete_item(&self, item_id: &str) -> Result<()> {
        let _guard = self.locks.acquire(item_id).await;
        self.service.delete_item(item_id).await?;
        let removed = self.with_store(|store| store.remove(item_id));
        info!("Deleted item {} (cached: {})", item_id, removed.is_some());
        Ok(())
    }

    /// Marks an item finished; it leaves every active list
    #[instrument(skip(self))]
    pub async fn mark_finished(&self, item_id: &str) -> Result<Item> {
        let _guard = self.locks.acquire(item_id).await;
        let previous = self.require_item(item_id)?;

        let response = self.service.mark_item_finished(item_id).await?;

        let mut provisional = previous.clone();
        provisional.is_finished = true;
        provisional.review_dates.clear();
        let merged = merge_item(&provisional, response);

        self.with_store(|store| store.apply(Some(&previous), &merged));
        Ok(merged)
    }

    /// Returns a finished item to the schedule
    ///
    /// Finished items are usually not cached, so the response must be
    /// complete enough to build the item when nothing is held locally.
    #[instrument(skip(self, request), fields(learned_date = %request.learned_date))]
    pub async fn mark_unfinished(&self, item_id: &str, request: UnfinishRequest) -> Result<Item> {
        let _guard = self.locks.acquire(item_id).await;
        if request.learned_date > self.today() {
            return Err(RevisitError::validation(
                "learned_date",
                format!("{} is in the future", request.learned_date),
            ));
        }
        let previous = self.find_item(item_id);
        let learned_date = request.learned_date;

        let response = self.service.mark_item_unfinished(item_id, request).await?;

        let merged = match &previous {
            Some(previous) => {
                let mut provisional = previous.clone();
                provisional.is_finished = false;
                provisional.learned_date = learned_date;
                merge_item(&provisional, response)
            }
            None => response.into_item()?,
        };
        let merged = self.accept_schedule(merged);

        self.with_store(|store| store.apply(previous.as_ref(), &merged));
        Ok(merged)
    }

    async fn set_completion(&self, item_id: &str, review_date_id: &str, completed: bool) -> Result<Item> {
        let _guard = self.locks.acquire(item_id).await;
        let previous = self.require_item(item_id)?;

        let mut provisional = previous.clone();
        let review_date = provisional
            .review_dates
            .iter_mut()
            .find(|rd| rd.id == review_date_id)
            .ok_or_else(|| RevisitError::NotFound(format!("review date {}", review_date_id)))?;
        review_date.is_completed = completed;

        let response = if completed {
            self.service.complete_review_date(item_id, review_date_id).await?
        } else {
            self.service.incomplete_review_date(item_id, review_date_id).await?
        };
        let merged = merge_item(&provisional, response);

        self.with_store(|store| store.apply(Some(&previous), &merged));
        Ok(merged)
    }

    #[instrument(skip(self))]
    pub async fn complete_review_date(&self, item_id: &str, review_date_id: &str) -> Result<Item> {
        self.set_completion(item_id, review_date_id, true).await
    }

    #[instrument(skip(self))]
    pub async fn incomplete_review_date(&self, item_id: &str, review_date_id: &str) -> Result<Item> {
        self.set_completion(item_id, review_date_id, false).await
    }

    /// Moves a review date back in time and cascades later steps
    ///
    /// The new schedule is computed locally first, so an out-of-range date
    /// or a broken pattern never reaches the service. The service gets
    /// everything it needs to redo the cascade; its answer is merged onto
    /// the locally computed schedule.
    ///
    /// ### Arguments
    ///
    /// * `item_id` - The cached item
    /// * `review_date_id` - The review date to move
    /// * `new_date` - Must be within `[initial_scheduled_date, yesterday]`
    /// * `policy` - How cascaded dates that fall due are resolved
    ///
    /// ### Errors
    ///
    /// Returns an error if:
    /// - The item, its pattern or the review date is unknown (`NotFound`)
    /// - The item has no pattern (`Validation`)
    /// - The date is out of range (`OutOfRangeDate`)
    /// - The service call fails
    #[instrument(skip(self))]
    pub async fn reschedule_review_date(
        &self,
        item_id: &str,
        review_date_id: &str,
        new_date: NaiveDate,
        policy: OverduePolicy,
    ) -> Result<Item> {
        let _guard = self.locks.acquire(item_id).await;
        let previous = self.require_item(item_id)?;

        let pattern_id = previous
            .pattern_id
            .clone()
            .ok_or_else(|| RevisitError::validation("pattern_id", "item has no pattern"))?;
        let pattern = self.with_catalog(|catalog| catalog.pattern(&pattern_id).cloned())?;
        let edited = previous
            .review_date(review_date_id)
            .cloned()
            .ok_or_else(|| RevisitError::NotFound(format!("review date {}", review_date_id)))?;

        let operator = RescheduleOperator::new(&pattern.steps, self.generator.basis(), self.today())?;
        let schedule = operator.reschedule_by_id(&previous.review_dates, review_date_id, new_date, policy)?;

        let update = ReviewDateUpdate {
            request_scheduled_date: new_date,
            overdue_policy: policy,
            pattern_id: Some(pattern_id),
            pattern_steps: pattern.sorted_steps(),
            learned_date: previous.learned_date,
            initial_scheduled_date: edited.initial_scheduled_date,
            step_number: edited.step_number,
        };
        let response = self
            .service
            .update_review_date(item_id, review_date_id, update)
            .await?;

        let mut provisional = previous.clone();
        provisional.review_dates = schedule;
        let merged = merge_item(&provisional, response);

        self.with_store(|store| store.apply(Some(&previous), &merged));
        Ok(merged)
    }
}
