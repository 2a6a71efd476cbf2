use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One scheduled review of an item, bound to a pattern step
///
/// `initial_scheduled_date` is the baseline set when the schedule was
/// generated and never changes. `scheduled_date` starts equal to it and is
/// only moved by a manual reschedule or its cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDate {
    /// Unique identifier for the review date (UUID v4 as string)
    pub id: String,

    /// The pattern step this review date was generated from
    pub step_number: u32,

    /// Baseline date from generation time
    pub initial_scheduled_date: NaiveDate,

    /// Current due date
    pub scheduled_date: NaiveDate,

    /// Whether the review has been done
    #[serde(default)]
    pub is_completed: bool,
}

impl ReviewDate {
    /// Creates a pending review date due on its baseline
    pub fn new(step_number: u32, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            step_number,
            initial_scheduled_date: date,
            scheduled_date: date,
            is_completed: false,
        }
    }

    /// Returns true if the review is pending and due on or before `today`
    pub fn is_due(&self, today: NaiveDate) -> bool {
        !self.is_completed && self.scheduled_date <= today
    }

    /// Returns true if the review is pending and due strictly before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed && self.scheduled_date < today
    }
}
