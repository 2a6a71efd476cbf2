use std::fmt;

use serde::{Deserialize, Serialize};

/// Resolved key of the location store
///
/// Every active item lives under exactly one location: its box if it has
/// one, otherwise the unclassified bucket of its category, otherwise the
/// global unclassified bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKey {
    Box(String),
    UnclassifiedCategory(String),
    Unclassified,
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationKey::Box(box_id) => write!(f, "{}", box_id),
            LocationKey::UnclassifiedCategory(category_id) => write!(f, "unclassified-{}", category_id),
            LocationKey::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// Maps flat `(box_id, category_id)` parameters to a location key
///
/// This is the single place that decides where an item is stored. Blank ids
/// count as absent.
pub fn resolve_location(box_id: Option<&str>, category_id: Option<&str>) -> LocationKey {
    let box_id = box_id.filter(|id| !id.trim().is_empty());
    let category_id = category_id.filter(|id| !id.trim().is_empty());

    match (box_id, category_id) {
        (Some(box_id), _) => LocationKey::Box(box_id.to_string()),
        (None, Some(category_id)) => LocationKey::UnclassifiedCategory(category_id.to_string()),
        (None, None) => LocationKey::Unclassified,
    }
}

/// Literal, unresolved parameters of a list query
///
/// The query cache is keyed by these so that two queries resolving to the
/// same location (e.g. a box fetched with and without its category) are
/// cached separately and both kept current.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey {
    pub box_id: Option<String>,
    pub category_id: Option<String>,
}

impl QueryKey {
    pub fn new(box_id: Option<String>, category_id: Option<String>) -> Self {
        Self { box_id, category_id }
    }

    /// Items of one box
    pub fn by_box(box_id: &str) -> Self {
        Self::new(Some(box_id.to_string()), None)
    }

    /// Items without a box inside one category
    pub fn unclassified_in(category_id: &str) -> Self {
        Self::new(None, Some(category_id.to_string()))
    }

    /// Items without box or category
    pub fn unclassified() -> Self {
        Self::default()
    }

    /// The location this query reads
    pub fn location(&self) -> LocationKey {
        resolve_location(self.box_id.as_deref(), self.category_id.as_deref())
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(box_id: {}, category_id: {})",
            self.box_id.as_deref().unwrap_or("None"),
            self.category_id.as_deref().unwrap_or("None")
        )
    }
}
