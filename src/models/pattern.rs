use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{Result, RevisitError};

/// Scheduling priority hint attached to a pattern
///
/// The weight is carried through untouched; nothing in this crate derives
/// dates from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetWeight {
    Heavy,
    Normal,
    Light,
    #[default]
    Unset,
}

/// One element of a pattern: an ordinal and a day interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Step {
    /// Ordinal of the step, starting at 1
    pub step_number: u32,

    /// Interval in days for this step
    pub interval_days: u32,
}

impl Step {
    pub fn new(step_number: u32, interval_days: u32) -> Self {
        Self { step_number, interval_days }
    }
}

/// A named, reusable review cadence
///
/// Patterns are templates: once a schedule has been generated from one, later
/// edits to the pattern do not reach back into existing schedules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// Unique identifier for the pattern (UUID v4 as string)
    pub id: String,

    /// Display name
    pub name: String,

    /// Priority hint
    #[serde(default)]
    pub target_weight: TargetWeight,

    /// Steps of the pattern; stored as received, ordered on read
    pub steps: Vec<Step>,
}

impl Pattern {
    /// Creates a new pattern from a list of intervals
    ///
    /// Step numbers are assigned densely from 1 in the order the intervals
    /// are given.
    ///
    /// ### Arguments
    ///
    /// * `name` - The display name of the pattern
    /// * `target_weight` - The priority hint
    /// * `intervals` - Day intervals, one per step
    ///
    /// ### Returns
    ///
    /// A new `Pattern` with a freshly generated id
    pub fn new(name: String, target_weight: TargetWeight, intervals: &[u32]) -> Self {
        let steps = intervals
            .iter()
            .enumerate()
            .map(|(index, &interval_days)| Step::new(index as u32 + 1, interval_days))
            .collect();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            target_weight,
            steps,
        }
    }

    /// Creates a pattern with all fields specified
    pub fn new_with_fields(
        id: String,
        name: String,
        target_weight: TargetWeight,
        steps: Vec<Step>,
    ) -> Self {
        Self { id, name, target_weight, steps }
    }

    /// Returns the steps ordered by step number
    pub fn sorted_steps(&self) -> Vec<Step> {
        let mut steps = self.steps.clone();
        steps.sort_by_key(|step| step.step_number);
        steps
    }

    /// Returns the intervals ordered by step number
    pub fn intervals(&self) -> Vec<u32> {
        self.sorted_steps()
            .into_iter()
            .map(|step| step.interval_days)
            .collect()
    }

    /// Checks the step invariants
    ///
    /// ### Errors
    ///
    /// Returns `InvalidPattern` if:
    /// - The pattern has no steps
    /// - Step numbers are not exactly `1..=n`
    /// - Any interval is zero
    pub fn validate(&self) -> Result<()> {
        validate_steps(&self.steps)
    }
}

/// Checks that a step list is non-empty, dense from 1, and has positive intervals
pub fn validate_steps(steps: &[Step]) -> Result<()> {
    if steps.is_empty() {
        return Err(RevisitError::InvalidPattern(
            "pattern has no steps".to_string(),
        ));
    }

    let mut numbers: Vec<u32> = steps.iter().map(|step| step.step_number).collect();
    numbers.sort_unstable();
    for (expected, actual) in (1u32..).zip(&numbers) {
        if *actual != expected {
            return Err(RevisitError::InvalidPattern(format!(
                "step numbers must be contiguous from 1, expected {} but found {}",
                expected, actual
            )));
        }
    }

    if let Some(step) = steps.iter().find(|step| step.interval_days == 0) {
        return Err(RevisitError::InvalidPattern(format!(
            "step {} has a zero-day interval",
            step.step_number
        )));
    }

    Ok(())
}
