use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, RevisitError};
use crate::models::{Item, ReviewDate, Step};
use crate::scheduling::{OverduePolicy, PlacementTarget};
use crate::store::{resolve_location, LocationKey};

/// Longest accepted item name
pub const MAX_NAME_LEN: usize = 200;

/// Serde helper telling an absent field apart from an explicit `null`
///
/// Used with `#[serde(default)]`: a missing field stays `None`, `null`
/// becomes `Some(None)` and a value becomes `Some(Some(value))`.
pub(crate) mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(RevisitError::validation("name", "must not be blank"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(RevisitError::validation(
            "name",
            format!("must be at most {} characters", MAX_NAME_LEN),
        ));
    }
    Ok(())
}

fn check_learned_date(learned_date: NaiveDate, today: NaiveDate) -> Result<()> {
    if learned_date > today {
        return Err(RevisitError::validation(
            "learned_date",
            format!("{} is in the future", learned_date),
        ));
    }
    Ok(())
}

fn check_id(field: &str, id: Option<&str>) -> Result<()> {
    match id {
        Some(id) if id.trim().is_empty() => Err(RevisitError::validation(field, "must not be blank")),
        _ => Ok(()),
    }
}

/// Data transfer object for creating a new item
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    /// The name of the item
    pub name: String,

    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// The category to file the item under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,

    /// The box to place the item in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_id: Option<String>,

    /// The pattern to schedule with; overridden by the box's pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_id: Option<String>,

    /// The day the item was learned
    pub learned_date: NaiveDate,
}

impl ItemDraft {
    pub fn new(name: String, learned_date: NaiveDate) -> Self {
        Self {
            name,
            detail: None,
            category_id: None,
            box_id: None,
            pattern_id: None,
            learned_date,
        }
    }

    /// Field-level checks run before the draft is sent anywhere
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        check_name(&self.name)?;
        check_learned_date(self.learned_date, today)?;
        check_id("category_id", self.category_id.as_deref())?;
        check_id("box_id", self.box_id.as_deref())?;
        check_id("pattern_id", self.pattern_id.as_deref())?;
        Ok(())
    }

    /// The location the created item will live under
    pub fn location(&self) -> LocationKey {
        resolve_location(self.box_id.as_deref(), self.category_id.as_deref())
    }
}

/// Data transfer object for updating an item
///
/// Absent fields are left alone. For nullable fields an explicit `null`
/// clears the value, e.g. `"box_id": null` moves the item out of its box.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub detail: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub category_id: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub box_id: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub pattern_id: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learned_date: Option<NaiveDate>,
}

impl ItemPatch {
    /// Returns true if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self == &ItemPatch::default()
    }

    /// Field-level checks run before the patch is sent anywhere
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        if let Some(learned_date) = self.learned_date {
            check_learned_date(learned_date, today)?;
        }
        check_id("category_id", self.category_id.clone().flatten().as_deref())?;
        check_id("box_id", self.box_id.clone().flatten().as_deref())?;
        check_id("pattern_id", self.pattern_id.clone().flatten().as_deref())?;
        Ok(())
    }

    /// The item as it would look with this patch applied
    ///
    /// Clearing the pattern clears the schedule; otherwise the schedule is
    /// left for the service to regenerate.
    pub fn apply_to(&self, item: &Item) -> Item {
        let mut patched = item.clone();
        if let Some(name) = &self.name {
            patched.name = name.trim().to_string();
        }
        if let Some(detail) = &self.detail {
            patched.detail = detail.clone();
        }
        if let Some(category_id) = &self.category_id {
            patched.category_id = category_id.clone();
        }
        if let Some(box_id) = &self.box_id {
            patched.box_id = box_id.clone();
        }
        if let Some(pattern_id) = &self.pattern_id {
            patched.pattern_id = pattern_id.clone();
            if pattern_id.is_none() {
                patched.review_dates.clear();
            }
        }
        if let Some(learned_date) = self.learned_date {
            patched.learned_date = learned_date;
        }
        patched
    }

    /// The placement this patch requests for `item`, if it moves it at all
    pub fn placement_target(&self, item: &Item) -> Option<PlacementTarget> {
        let box_id = self.box_id.clone().unwrap_or_else(|| item.box_id.clone());
        let category_id = self.category_id.clone().unwrap_or_else(|| item.category_id.clone());

        if box_id == item.box_id && category_id == item.category_id {
            return None;
        }

        Some(match box_id {
            Some(box_id) => PlacementTarget::Box(box_id),
            None => PlacementTarget::Unclassified { category_id },
        })
    }
}

/// Data transfer object for returning a finished item to the schedule
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UnfinishRequest {
    /// The pattern to regenerate the schedule from
    pub pattern_id: Option<String>,

    /// The new learned date the schedule counts from
    pub learned_date: NaiveDate,
}

/// Data transfer object for a manual review date edit
///
/// Carries everything the service needs to redo the cascade on its side.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReviewDateUpdate {
    pub request_scheduled_date: NaiveDate,
    pub overdue_policy: OverduePolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_id: Option<String>,
    pub pattern_steps: Vec<Step>,
    pub learned_date: NaiveDate,
    pub initial_scheduled_date: NaiveDate,
    pub step_number: u32,
}

/// Possibly partial echo of an item returned by a mutation
///
/// Some endpoints do not send back every field (an update may omit the
/// schedule). Absent fields are `None`; for nullable fields an explicit
/// `null` is `Some(None)`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemResponse {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub detail: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub category_id: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub box_id: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub pattern_id: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learned_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_finished: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_dates: Option<Vec<ReviewDate>>,
}

impl ItemResponse {
    /// Builds a full item when there is nothing to merge onto
    ///
    /// ### Errors
    ///
    /// Returns `Transport` if the response lacks the name or learned date.
    pub fn into_item(self) -> Result<Item> {
        let name = self
            .name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| RevisitError::Transport(format!("response for item {} has no name", self.id)))?;
        let learned_date = self.learned_date.ok_or_else(|| {
            RevisitError::Transport(format!("response for item {} has no learned date", self.id))
        })?;

        Ok(Item {
            id: self.id,
            name,
            detail: self.detail.flatten(),
            category_id: self.category_id.flatten(),
            box_id: self.box_id.flatten(),
            pattern_id: self.pattern_id.flatten(),
            learned_date,
            is_finished: self.is_finished.unwrap_or(false),
            review_dates: self.review_dates.unwrap_or_default(),
        })
    }
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: Some(item.name),
            detail: Some(item.detail),
            category_id: Some(item.category_id),
            box_id: Some(item.box_id),
            pattern_id: Some(item.pattern_id),
            learned_date: Some(item.learned_date),
            is_finished: Some(item.is_finished),
            review_dates: Some(item.review_dates),
        }
    }
}

/// Filters for today's review list
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TodaysReviewFilters {
    /// Only reviews of items in this category
    pub category_id: Option<String>,

    /// Only reviews of items in this box
    pub box_id: Option<String>,

    /// Include pending reviews whose date has already passed
    pub include_overdue: bool,
}

impl Default for TodaysReviewFilters {
    fn default() -> Self {
        Self {
            category_id: None,
            box_id: None,
            include_overdue: true,
        }
    }
}

impl fmt::Display for TodaysReviewFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TodaysReviewFilters {{ category_id: {:?}, box_id: {:?}, include_overdue: {} }}",
            self.category_id, self.box_id, self.include_overdue
        )
    }
}

/// A pending review of one item
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DueReview {
    pub item_id: String,
    pub item_name: String,
    pub review_date: ReviewDate,
}

/// Due reviews sharing a location
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReviewGroup {
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub box_id: Option<String>,
    pub reviews: Vec<DueReview>,
}

impl ReviewGroup {
    pub fn location(&self) -> LocationKey {
        resolve_location(self.box_id.as_deref(), self.category_id.as_deref())
    }
}

/// Today's due reviews grouped by box, category-level unclassified and
/// global unclassified
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TodaysReviews {
    pub groups: Vec<ReviewGroup>,
}

impl TodaysReviews {
    /// Total number of due reviews across groups
    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.reviews.len()).sum()
    }
}

#[cfg(test)]
mod tests;
