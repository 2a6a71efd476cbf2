use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ReviewDate;
use crate::store::{resolve_location, LocationKey};

/// Represents a study item tracked on a review schedule
///
/// An item belongs to the category/box hierarchy through optional ids, but
/// is independently addressable. Its review dates are generated as a batch
/// when it is assigned a pattern and mutated one at a time afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier for the item (UUID v4 as string)
    pub id: String,

    /// The name of the item
    pub name: String,

    /// Free-form notes
    #[serde(default)]
    pub detail: Option<String>,

    /// The category this item is grouped under, if any
    #[serde(default)]
    pub category_id: Option<String>,

    /// The box this item is placed in, if any
    #[serde(default)]
    pub box_id: Option<String>,

    /// The pattern the schedule was generated from, if any
    #[serde(default)]
    pub pattern_id: Option<String>,

    /// The day the item was first learned
    pub learned_date: NaiveDate,

    /// Finished items leave the active scheduling set
    #[serde(default)]
    pub is_finished: bool,

    /// The review schedule, ordered by step number
    #[serde(default)]
    pub review_dates: Vec<ReviewDate>,
}

impl Item {
    /// Creates a new unclassified item with no schedule
    ///
    /// ### Arguments
    ///
    /// * `name` - The name of the item
    /// * `learned_date` - The day the item was learned
    ///
    /// ### Returns
    ///
    /// A new `Item` with a freshly generated id
    pub fn new(name: String, learned_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            detail: None,
            category_id: None,
            box_id: None,
            pattern_id: None,
            learned_date,
            is_finished: false,
            review_dates: Vec::new(),
        }
    }

    /// Resolves the location store key this item belongs under
    pub fn location(&self) -> LocationKey {
        resolve_location(self.box_id.as_deref(), self.category_id.as_deref())
    }

    /// Number of completed review dates
    pub fn completed_count(&self) -> usize {
        self.review_dates.iter().filter(|rd| rd.is_completed).count()
    }

    /// Returns true if at least one review date has been completed
    pub fn has_completed_reviews(&self) -> bool {
        self.review_dates.iter().any(|rd| rd.is_completed)
    }

    /// Finds a review date by id
    pub fn review_date(&self, review_date_id: &str) -> Option<&ReviewDate> {
        self.review_dates.iter().find(|rd| rd.id == review_date_id)
    }

    /// Returns the schedule ordered by step number
    pub fn sorted_review_dates(&self) -> Vec<ReviewDate> {
        let mut review_dates = self.review_dates.clone();
        review_dates.sort_by_key(|rd| rd.step_number);
        review_dates
    }

    /// Returns the position of a review date within the step-ordered schedule
    pub fn step_index_of(&self, review_date_id: &str) -> Option<usize> {
        self.sorted_review_dates()
            .iter()
            .position(|rd| rd.id == review_date_id)
    }

    /// Returns the earliest pending review date, if any
    pub fn next_review(&self) -> Option<&ReviewDate> {
        self.review_dates
            .iter()
            .filter(|rd| !rd.is_completed)
            .min_by_key(|rd| (rd.scheduled_date, rd.step_number))
    }
}
