use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::generator::{shift_date, OffsetBasis, ScheduleGenerator};
use crate::errors::{Result, RevisitError};
use crate::models::{ReviewDate, Step};

/// What happens to later review dates that land in the past after a rewind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverduePolicy {
    /// Cascaded dates on or before today count as already reviewed
    CompressAsCompleted,
    /// Cascaded dates before today are moved to today and stay pending
    PinToToday,
}

impl fmt::Display for OverduePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverduePolicy::CompressAsCompleted => write!(f, "compress_as_completed"),
            OverduePolicy::PinToToday => write!(f, "pin_to_today"),
        }
    }
}

impl FromStr for OverduePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "compress_as_completed" | "compress" => Ok(OverduePolicy::CompressAsCompleted),
            "pin_to_today" | "pin" => Ok(OverduePolicy::PinToToday),
            other => Err(format!("unknown overdue policy: {}", other)),
        }
    }
}

/// Checks that a manual reschedule lands in `[initial, yesterday]`
///
/// A review date can only be rewound into the past. Moving it to today or
/// later would make it indistinguishable from a normal pending review.
pub fn check_request_date(initial: NaiveDate, requested: NaiveDate, today: NaiveDate) -> Result<()> {
    let yesterday = today.pred_opt().unwrap_or(NaiveDate::MIN);
    if requested < initial || requested > yesterday || yesterday < initial {
        return Err(RevisitError::OutOfRangeDate {
            requested,
            earliest: initial,
            latest: yesterday,
        });
    }
    Ok(())
}

/// Applies a manual edit to one review date of a schedule
///
/// Built for a fixed set of pattern steps, an offset basis and a "today".
/// The operator never touches anything but the schedule it is given.
#[derive(Debug, Clone)]
pub struct RescheduleOperator {
    offsets: Vec<i64>,
    today: NaiveDate,
}

impl RescheduleOperator {
    /// Creates an operator for a pattern's steps
    ///
    /// ### Errors
    ///
    /// Returns `InvalidPattern` if the steps cannot produce a schedule.
    pub fn new(steps: &[Step], basis: OffsetBasis, today: NaiveDate) -> Result<Self> {
        let offsets = ScheduleGenerator::new(basis).step_offsets(steps)?;
        Ok(Self { offsets, today })
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Rewinds the review date at `step_index` and cascades the change
    ///
    /// ### Arguments
    ///
    /// * `schedule` - The item's current review dates
    /// * `step_index` - Position of the edited date in step order
    /// * `new_date` - The requested date for the edited step
    /// * `policy` - How cascaded dates that fall due are resolved
    ///
    /// ### Returns
    ///
    /// The updated schedule ordered by step number. Steps before the edited
    /// one are returned untouched.
    ///
    /// ### Errors
    ///
    /// Returns an error if:
    /// - The schedule does not have one review date per step (`InvalidPattern`)
    /// - `step_index` is past the end of the schedule (`NotFound`)
    /// - `new_date` is outside `[initial_scheduled_date, yesterday]` (`OutOfRangeDate`)
    #[instrument(skip(self, schedule), fields(today = %self.today))]
    pub fn reschedule(
        &self,
        schedule: &[ReviewDate],
        step_index: usize,
        new_date: NaiveDate,
        policy: OverduePolicy,
    ) -> Result<Vec<ReviewDate>> {
        if schedule.len() != self.offsets.len() {
            return Err(RevisitError::InvalidPattern(format!(
                "schedule has {} review dates for a {}-step pattern",
                schedule.len(),
                self.offsets.len()
            )));
        }

        let mut updated = schedule.to_vec();
        updated.sort_by_key(|rd| rd.step_number);

        let edited = updated
            .get(step_index)
            .ok_or_else(|| RevisitError::NotFound(format!("review date at step index {}", step_index)))?;
        check_request_date(edited.initial_scheduled_date, new_date, self.today)?;

        updated[step_index].scheduled_date = new_date;

        let base_offset = self.offsets[step_index];
        for k in (step_index + 1)..updated.len() {
            let computed = shift_date(new_date, self.offsets[k] - base_offset)?;
            let review_date = &mut updated[k];
            match policy {
                OverduePolicy::CompressAsCompleted => {
                    review_date.scheduled_date = computed;
                    if computed <= self.today {
                        review_date.is_completed = true;
                    }
                }
                OverduePolicy::PinToToday => {
                    review_date.scheduled_date = computed.max(self.today);
                }
            }
        }

        debug!(
            "Rescheduled step {} to {} with {} cascaded dates",
            step_index + 1,
            new_date,
            updated.len() - step_index - 1
        );

        Ok(updated)
    }

    /// Same as [`RescheduleOperator::reschedule`], addressing the edited date by id
    pub fn reschedule_by_id(
        &self,
        schedule: &[ReviewDate],
        review_date_id: &str,
        new_date: NaiveDate,
        policy: OverduePolicy,
    ) -> Result<Vec<ReviewDate>> {
        let mut ordered = schedule.to_vec();
        ordered.sort_by_key(|rd| rd.step_number);
        let step_index = ordered
            .iter()
            .position(|rd| rd.id == review_date_id)
            .ok_or_else(|| RevisitError::NotFound(format!("review date {}", review_date_id)))?;
        self.reschedule(&ordered, step_index, new_date, policy)
    }
}
