use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use super::ItemService;
use crate::catalog::Catalog;
use crate::clock::Clock;
use crate::dto::{
    DueReview, ItemDraft, ItemPatch, ItemResponse, ReviewDateUpdate, ReviewGroup,
    TodaysReviewFilters, TodaysReviews, UnfinishRequest,
};
use crate::errors::{Result, RevisitError};
use crate::models::{Category, Item, Pattern, ReviewBox, ReviewDate};
use crate::scheduling::{
    apply_placement, check_placement, compatible, RescheduleOperator, ScheduleGenerator,
};

#[derive(Debug, Default)]
struct MemoryState {
    items: Vec<Item>,
    catalog: Catalog,
}

impl MemoryState {
    fn item(&self, item_id: &str) -> Result<&Item> {
        self.items
            .iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| RevisitError::NotFound(format!("item {}", item_id)))
    }

    fn item_mut(&mut self, item_id: &str) -> Result<&mut Item> {
        self.items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| RevisitError::NotFound(format!("item {}", item_id)))
    }

    /// The pattern a box forces on its items, if any
    fn box_pattern(&self, box_id: Option<&str>) -> Result<Option<String>> {
        match box_id {
            Some(box_id) => Ok(self.catalog.review_box(box_id)?.pattern_id.clone()),
            None => Ok(None),
        }
    }

    fn active_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| !item.is_finished)
    }
}

/// In-process authoritative item service
///
/// Applies the same generation, placement and reschedule rules a server
/// would, against plain in-memory collections. Patterns, boxes and
/// categories are seeded up front; items are created through the
/// [`ItemService`] operations (or seeded directly with [`insert_item`]).
///
/// Every mutation answers with a full echo of the item.
///
/// [`insert_item`]: MemoryItemService::insert_item
pub struct MemoryItemService {
    state: Mutex<MemoryState>,
    generator: ScheduleGenerator,
    clock: Arc<dyn Clock>,
}

impl MemoryItemService {
    /// Creates an empty service
    ///
    /// ### Arguments
    ///
    /// * `generator` - Generates schedules for new and re-patterned items
    /// * `clock` - Source of "today" for validation and due reviews
    pub fn new(generator: ScheduleGenerator, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            generator,
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| RevisitError::Transport("memory service state is poisoned".to_string()))
    }

    /// Seeds a pattern
    ///
    /// ### Errors
    ///
    /// Returns `InvalidPattern` if the pattern's steps are malformed.
    pub fn insert_pattern(&self, pattern: Pattern) -> Result<()> {
        pattern.validate()?;
        self.generator.offsets(&pattern)?;
        self.lock()?.catalog.insert_pattern(pattern);
        Ok(())
    }

    /// Seeds a box; its category and pattern must already exist
    pub fn insert_box(&self, review_box: ReviewBox) -> Result<()> {
        let mut state = self.lock()?;
        state.catalog.category(&review_box.category_id)?;
        if let Some(pattern_id) = &review_box.pattern_id {
            state.catalog.pattern(pattern_id)?;
        }
        state.catalog.insert_box(review_box);
        Ok(())
    }

    pub fn insert_category(&self, category: Category) -> Result<()> {
        self.lock()?.catalog.insert_category(category);
        Ok(())
    }

    /// Seeds an item exactly as given, schedule included
    pub fn insert_item(&self, item: Item) -> Result<()> {
        let mut state = self.lock()?;
        state.items.retain(|existing| existing.id != item.id);
        state.items.push(item);
        Ok(())
    }

    /// Current authoritative state of an item
    pub fn item(&self, item_id: &str) -> Result<Item> {
        self.lock()?.item(item_id).cloned()
    }

    fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn schedule_for(&self, catalog: &Catalog, pattern_id: &str, learned_date: NaiveDate) -> Result<Vec<ReviewDate>> {
        let pattern = catalog.pattern(pattern_id)?;
        self.generator.generate(pattern, learned_date)
    }

    /// Applies an explicit pattern change from a patch
    ///
    /// The box pattern always wins; an item with completed reviews can only
    /// switch to a compatible pattern, which keeps its schedule.
    fn repattern(&self, state: &MemoryState, item: &mut Item, pattern_id: Option<String>) -> Result<()> {
        if pattern_id == item.pattern_id {
            return Ok(());
        }

        if let Some(box_pattern) = state.box_pattern(item.box_id.as_deref())? {
            return Err(RevisitError::validation(
                "pattern_id",
                format!("the item's box binds pattern {}", box_pattern),
            ));
        }

        let Some(pattern_id) = pattern_id else {
            item.pattern_id = None;
            item.review_dates.clear();
            return Ok(());
        };

        let pattern = state.catalog.pattern(&pattern_id)?;
        if item.has_completed_reviews() {
            let current = item
                .pattern_id
                .as_deref()
                .map(|id| state.catalog.pattern(id))
                .transpose()?;
            match current {
                Some(current) if compatible(current, pattern) => {}
                _ => {
                    return Err(RevisitError::IncompatiblePattern {
                        item_pattern: item.pattern_id.clone().unwrap_or_else(|| "none".to_string()),
                        box_pattern: pattern_id,
                    });
                }
            }
        } else {
            item.review_dates = self.generator.generate(pattern, item.learned_date)?;
        }
        item.pattern_id = Some(pattern_id);
        Ok(())
    }
}

impl ItemService for MemoryItemService {
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    async fn create_item(&self, draft: ItemDraft) -> Result<Item> {
        draft.validate(self.today())?;
        let mut state = self.lock()?;

        let mut item = Item::new(draft.name.trim().to_string(), draft.learned_date);
        item.detail = draft.detail;
        item.category_id = draft.category_id;

        if let Some(category_id) = &item.category_id {
            state.catalog.category(category_id)?;
        }
        if let Some(box_id) = &draft.box_id {
            let review_box = state.catalog.review_box(box_id)?;
            if item.category_id.as_deref().is_some_and(|c| c != review_box.category_id) {
                return Err(RevisitError::validation(
                    "box_id",
                    format!("box {} is not in category {:?}", box_id, item.category_id),
                ));
            }
            item.category_id = Some(review_box.category_id.clone());
            item.box_id = Some(review_box.id.clone());
        }

        item.pattern_id = state.box_pattern(item.box_id.as_deref())?.or(draft.pattern_id);
        if let Some(pattern_id) = &item.pattern_id {
            item.review_dates = self.schedule_for(&state.catalog, pattern_id, item.learned_date)?;
        }

        info!("Created item {} at {}", item.id, item.location());
        state.items.push(item.clone());
        Ok(item)
    }

    #[instrument(skip(self, patch))]
    async fn update_item(&self, item_id: &str, patch: ItemPatch) -> Result<ItemResponse> {
        patch.validate(self.today())?;
        let mut state = self.lock()?;
        let mut item = state.item(item_id)?.clone();

        if let Some(target) = patch.placement_target(&item) {
            let decision = check_placement(&item, &target, &state.catalog)?;
            debug!("Placement {:?} -> {:?}", target, decision);
            item = apply_placement(&item, &target, &decision, &state.catalog, &self.generator)?;
        }

        if let Some(name) = patch.name {
            item.name = name.trim().to_string();
        }
        if let Some(detail) = patch.detail {
            item.detail = detail;
        }
        if let Some(learned_date) = patch.learned_date.filter(|d| *d != item.learned_date) {
            item.learned_date = learned_date;
            if let Some(pattern_id) = &item.pattern_id {
                if item.has_completed_reviews() {
                    return Err(RevisitError::validation(
                        "learned_date",
                        "cannot change once a review has been completed",
                    ));
                }
                item.review_dates = self.schedule_for(&state.catalog, pattern_id, learned_date)?;
            }
        }
        if let Some(pattern_id) = patch.pattern_id {
            self.repattern(&state, &mut item, pattern_id)?;
        }

        *state.item_mut(item_id)? = item.clone();
        Ok(ItemResponse::from(item))
    }

    #[instrument(skip(self))]
    async fn delete_item(&self, item_id: &str) -> Result<()> {
        let mut state = self.lock()?;
        state.item(item_id)?;
        state.items.retain(|item| item.id != item_id);
        info!("Deleted item {}", item_id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_item_finished(&self, item_id: &str) -> Result<ItemResponse> {
        let mut state = self.lock()?;
        let item = state.item_mut(item_id)?;
        item.is_finished = true;
        item.review_dates.clear();
        Ok(ItemResponse::from(item.clone()))
    }

    #[instrument(skip(self, request))]
    async fn mark_item_unfinished(&self, item_id: &str, request: UnfinishRequest) -> Result<ItemResponse> {
        let today = self.today();
        if request.learned_date > today {
            return Err(RevisitError::validation(
                "learned_date",
                format!("{} is in the future", request.learned_date),
            ));
        }

        let mut state = self.lock()?;
        let mut item = state.item(item_id)?.clone();
        if !item.is_finished {
            return Err(RevisitError::validation("is_finished", "item is not finished"));
        }

        let pattern_id = state
            .box_pattern(item.box_id.as_deref())?
            .or(request.pattern_id)
            .or_else(|| item.pattern_id.clone());

        item.is_finished = false;
        item.learned_date = request.learned_date;
        item.review_dates = match &pattern_id {
            Some(pattern_id) => self.schedule_for(&state.catalog, pattern_id, request.learned_date)?,
            None => Vec::new(),
        };
        item.pattern_id = pattern_id;

        *state.item_mut(item_id)? = item.clone();
        Ok(ItemResponse::from(item))
    }

    #[instrument(skip(self))]
    async fn complete_review_date(&self, item_id: &str, review_date_id: &str) -> Result<ItemResponse> {
        set_completion(&mut *self.lock()?, item_id, review_date_id, true)
    }

    #[instrument(skip(self))]
    async fn incomplete_review_date(&self, item_id: &str, review_date_id: &str) -> Result<ItemResponse> {
        set_completion(&mut *self.lock()?, item_id, review_date_id, false)
    }

    #[instrument(skip(self, update), fields(requested = %update.request_scheduled_date))]
    async fn update_review_date(
        &self,
        item_id: &str,
        review_date_id: &str,
        update: ReviewDateUpdate,
    ) -> Result<ItemResponse> {
        let mut state = self.lock()?;
        let item = state.item_mut(item_id)?;

        let review_date = item
            .review_date(review_date_id)
            .ok_or_else(|| RevisitError::NotFound(format!("review date {}", review_date_id)))?;
        if review_date.step_number != update.step_number {
            return Err(RevisitError::validation(
                "step_number",
                format!("review date is step {}, not {}", review_date.step_number, update.step_number),
            ));
        }

        let operator = RescheduleOperator::new(&update.pattern_steps, self.generator.basis(), self.clock.today())?;
        item.review_dates = operator.reschedule_by_id(
            &item.review_dates,
            review_date_id,
            update.request_scheduled_date,
            update.overdue_policy,
        )?;

        Ok(ItemResponse::from(item.clone()))
    }

    #[instrument(skip(self))]
    async fn fetch_items_by_box(&self, box_id: &str) -> Result<Vec<Item>> {
        let state = self.lock()?;
        state.catalog.review_box(box_id)?;
        Ok(state
            .active_items()
            .filter(|item| item.box_id.as_deref() == Some(box_id))
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn fetch_unclassified_items(&self) -> Result<Vec<Item>> {
        let state = self.lock()?;
        Ok(state
            .active_items()
            .filter(|item| item.box_id.is_none() && item.category_id.is_none())
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn fetch_unclassified_items_by_category(&self, category_id: &str) -> Result<Vec<Item>> {
        let state = self.lock()?;
        state.catalog.category(category_id)?;
        Ok(state
            .active_items()
            .filter(|item| item.box_id.is_none() && item.category_id.as_deref() == Some(category_id))
            .cloned()
            .collect())
    }

    #[instrument(skip(self, filters), fields(filters = %filters))]
    async fn fetch_todays_reviews(&self, filters: TodaysReviewFilters) -> Result<TodaysReviews> {
        let today = self.today();
        let state = self.lock()?;

        let mut groups: Vec<ReviewGroup> = Vec::new();
        let matching = state.active_items().filter(|item| {
            filters.category_id.as_ref().is_none_or(|c| item.category_id.as_ref() == Some(c))
                && filters.box_id.as_ref().is_none_or(|b| item.box_id.as_ref() == Some(b))
        });

        for item in matching {
            let due = item.review_dates.iter().filter(|rd| {
                !rd.is_completed
                    && (rd.scheduled_date == today || (filters.include_overdue && rd.scheduled_date < today))
            });

            for review_date in due {
                let review = DueReview {
                    item_id: item.id.clone(),
                    item_name: item.name.clone(),
                    review_date: review_date.clone(),
                };
                match groups
                    .iter_mut()
                    .find(|g| g.box_id == item.box_id && g.category_id == item.category_id)
                {
                    Some(group) => group.reviews.push(review),
                    None => groups.push(ReviewGroup {
                        category_id: item.category_id.clone(),
                        box_id: item.box_id.clone(),
                        reviews: vec![review],
                    }),
                }
            }
        }

        groups.sort_by_key(|g| g.location());
        for group in &mut groups {
            group.reviews.sort_by(|a, b| {
                (a.review_date.scheduled_date, &a.item_name).cmp(&(b.review_date.scheduled_date, &b.item_name))
            });
        }

        let reviews = TodaysReviews { groups };
        debug!("{} reviews due on {}", reviews.total(), today);
        Ok(reviews)
    }

    async fn fetch_patterns(&self) -> Result<Vec<Pattern>> {
        Ok(self.lock()?.catalog.patterns().into_iter().cloned().collect())
    }

    async fn fetch_boxes(&self, category_id: &str) -> Result<Vec<ReviewBox>> {
        let state = self.lock()?;
        state.catalog.category(category_id)?;
        Ok(state.catalog.boxes_in(category_id).into_iter().cloned().collect())
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>> {
        Ok(self.lock()?.catalog.categories().into_iter().cloned().collect())
    }
}

fn set_completion(state: &mut MemoryState, item_id: &str, review_date_id: &str, completed: bool) -> Result<ItemResponse> {
    let item = state.item_mut(item_id)?;
    if item.is_finished {
        return Err(RevisitError::validation("is_finished", "item is finished"));
    }
    let review_date = item
        .review_dates
        .iter_mut()
        .find(|rd| rd.id == review_date_id)
        .ok_or_else(|| RevisitError::NotFound(format!("review date {}", review_date_id)))?;
    review_date.is_completed = completed;
    Ok(ItemResponse::from(item.clone()))
}
