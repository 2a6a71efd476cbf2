use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A container for items inside a category
///
/// When `pattern_id` is set it is the canonical pattern for every item the
/// box holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewBox {
    /// Unique identifier for the box (UUID v4 as string)
    pub id: String,

    /// Display name
    pub name: String,

    /// The category the box lives in
    pub category_id: String,

    /// The pattern bound to the box, if any
    #[serde(default)]
    pub pattern_id: Option<String>,
}

impl ReviewBox {
    /// Creates a new box in a category
    pub fn new(name: String, category_id: String, pattern_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            category_id,
            pattern_id,
        }
    }
}
