use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pure grouping of boxes and items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier for the category (UUID v4 as string)
    pub id: String,

    /// Display name
    pub name: String,
}

impl Category {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
        }
    }
}
