use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::{Result, RevisitError};
use crate::models::{validate_steps, Pattern, ReviewDate, Step};

/// How a step's interval is measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetBasis {
    /// Step `k` is due `interval_1 + ... + interval_k` days after learning,
    /// i.e. each interval counts from the previous step's date
    #[default]
    Cumulative,
    /// Step `k` is due `interval_k` days after learning
    FromLearnedDate,
}

impl OffsetBasis {
    /// Day offsets from the learned date for steps already ordered by number
    pub fn offsets(&self, sorted_steps: &[Step]) -> Vec<i64> {
        match self {
            OffsetBasis::Cumulative => sorted_steps
                .iter()
                .scan(0i64, |total, step| {
                    *total += i64::from(step.interval_days);
                    Some(*total)
                })
                .collect(),
            OffsetBasis::FromLearnedDate => sorted_steps
                .iter()
                .map(|step| i64::from(step.interval_days))
                .collect(),
        }
    }
}

impl fmt::Display for OffsetBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OffsetBasis::Cumulative => write!(f, "cumulative"),
            OffsetBasis::FromLearnedDate => write!(f, "from_learned_date"),
        }
    }
}

impl FromStr for OffsetBasis {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cumulative" => Ok(OffsetBasis::Cumulative),
            "from_learned_date" => Ok(OffsetBasis::FromLearnedDate),
            other => Err(format!("unknown offset basis: {}", other)),
        }
    }
}

/// Moves a date by a signed number of days
pub(crate) fn shift_date(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(|| {
            RevisitError::InvalidPattern(format!("{} shifted by {} days is out of range", date, days))
        })
}

/// Turns a pattern and a learned date into an ordered schedule
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleGenerator {
    basis: OffsetBasis,
}

impl ScheduleGenerator {
    pub fn new(basis: OffsetBasis) -> Self {
        Self { basis }
    }

    pub fn basis(&self) -> OffsetBasis {
        self.basis
    }

    /// Computes per-step day offsets for a raw step list
    ///
    /// ### Errors
    ///
    /// Returns `InvalidPattern` if the steps break the pattern invariants, or
    /// if the offsets would make the schedule go backwards in time.
    pub fn step_offsets(&self, steps: &[Step]) -> Result<Vec<i64>> {
        validate_steps(steps)?;

        let mut sorted = steps.to_vec();
        sorted.sort_by_key(|step| step.step_number);
        let offsets = self.basis.offsets(&sorted);

        if let Some(pair) = offsets.windows(2).position(|w| w[1] < w[0]) {
            return Err(RevisitError::InvalidPattern(format!(
                "step {} would be due before step {}",
                pair + 2,
                pair + 1
            )));
        }

        Ok(offsets)
    }

    /// Computes per-step day offsets for a pattern
    pub fn offsets(&self, pattern: &Pattern) -> Result<Vec<i64>> {
        self.step_offsets(&pattern.steps)
    }

    /// Generates a fresh schedule
    ///
    /// ### Arguments
    ///
    /// * `pattern` - The pattern to schedule from
    /// * `learned_date` - The day the item was learned
    ///
    /// ### Returns
    ///
    /// One pending `ReviewDate` per step, ordered by step number, with
    /// `scheduled_date` equal to `initial_scheduled_date`
    #[instrument(skip(self, pattern), fields(pattern_id = %pattern.id, basis = %self.basis))]
    pub fn generate(&self, pattern: &Pattern, learned_date: NaiveDate) -> Result<Vec<ReviewDate>> {
        let offsets = self.offsets(pattern)?;

        let review_dates = pattern
            .sorted_steps()
            .iter()
            .zip(offsets)
            .map(|(step, offset)| {
                shift_date(learned_date, offset).map(|date| ReviewDate::new(step.step_number, date))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Generated {} review dates", review_dates.len());
        Ok(review_dates)
    }

    /// Validates a schedule produced by the authoritative service
    ///
    /// The service owns the date arithmetic; this only checks the shape:
    /// step numbers one-to-one with the pattern and baselines that never go
    /// backwards.
    ///
    /// ### Returns
    ///
    /// The schedule ordered by step number
    pub fn accept(&self, pattern: &Pattern, mut review_dates: Vec<ReviewDate>) -> Result<Vec<ReviewDate>> {
        pattern.validate()?;

        if review_dates.len() != pattern.steps.len() {
            return Err(RevisitError::InvalidPattern(format!(
                "schedule has {} review dates for a {}-step pattern",
                review_dates.len(),
                pattern.steps.len()
            )));
        }

        review_dates.sort_by_key(|rd| rd.step_number);
        for (expected, review_date) in (1u32..).zip(&review_dates) {
            if review_date.step_number != expected {
                return Err(RevisitError::InvalidPattern(format!(
                    "schedule is missing step {}",
                    expected
                )));
            }
        }

        if review_dates
            .windows(2)
            .any(|w| w[1].initial_scheduled_date < w[0].initial_scheduled_date)
        {
            return Err(RevisitError::InvalidPattern(
                "schedule baselines are not in step order".to_string(),
            ));
        }

        Ok(review_dates)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TargetWeight;

    fn day(offset: i64) -> NaiveDate {
        shift_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), offset).unwrap()
    }

    fn pattern(intervals: &[u32]) -> Pattern {
        Pattern::new("test".to_string(), TargetWeight::Normal, intervals)
    }

    #[test]
    fn test_cumulative_schedule_for_1_3_7() {
        let generator = ScheduleGenerator::default();
        let schedule = generator.generate(&pattern(&[1, 3, 7]), day(0)).unwrap();

        let dates: Vec<NaiveDate> = schedule.iter().map(|rd| rd.scheduled_date).collect();
        assert_eq!(dates, vec![day(1), day(4), day(11)]);
        assert!(schedule.iter().all(|rd| rd.initial_scheduled_date == rd.scheduled_date));
        assert!(schedule.iter().all(|rd| !rd.is_completed));
    }

    #[test]
    fn test_from_learned_date_schedule() {
        let generator = ScheduleGenerator::new(OffsetBasis::FromLearnedDate);
        let schedule = generator.generate(&pattern(&[1, 3, 7]), day(0)).unwrap();

        let dates: Vec<NaiveDate> = schedule.iter().map(|rd| rd.scheduled_date).collect();
        assert_eq!(dates, vec![day(1), day(3), day(7)]);
    }

    #[test]
    fn test_from_learned_date_rejects_shrinking_intervals() {
        let generator = ScheduleGenerator::new(OffsetBasis::FromLearnedDate);
        let result = generator.generate(&pattern(&[7, 3]), day(0));
        assert!(matches!(result, Err(RevisitError::InvalidPattern(_))));
    }

    #[test]
    fn test_generate_rejects_empty_pattern() {
        let result = ScheduleGenerator::default().generate(&pattern(&[]), day(0));
        assert!(matches!(result, Err(RevisitError::InvalidPattern(_))));
    }

    #[test]
    fn test_generate_rejects_non_contiguous_steps() {
        let broken = Pattern::new_with_fields(
            "p".to_string(),
            "broken".to_string(),
            TargetWeight::Unset,
            vec![Step::new(1, 1), Step::new(3, 2)],
        );
        let result = ScheduleGenerator::default().generate(&broken, day(0));
        assert!(matches!(result, Err(RevisitError::InvalidPattern(_))));
    }

    #[test]
    fn test_accept_sorts_by_step() {
        let p = pattern(&[1, 3]);
        let schedule = vec![ReviewDate::new(2, day(4)), ReviewDate::new(1, day(1))];

        let accepted = ScheduleGenerator::default().accept(&p, schedule).unwrap();
        assert_eq!(accepted[0].step_number, 1);
        assert_eq!(accepted[1].step_number, 2);
    }

    #[test]
    fn test_accept_rejects_missing_step() {
        let p = pattern(&[1, 3, 7]);
        let schedule = vec![ReviewDate::new(1, day(1)), ReviewDate::new(3, day(11))];
        assert!(ScheduleGenerator::default().accept(&p, schedule).is_err());
    }

    #[test]
    fn test_accept_rejects_duplicate_step() {
        let p = pattern(&[1, 3]);
        let schedule = vec![ReviewDate::new(1, day(1)), ReviewDate::new(1, day(4))];
        assert!(ScheduleGenerator::default().accept(&p, schedule).is_err());
    }

    #[test]
    fn test_accept_rejects_backwards_baselines() {
        let p = pattern(&[1, 3]);
        let schedule = vec![ReviewDate::new(1, day(5)), ReviewDate::new(2, day(4))];
        assert!(ScheduleGenerator::default().accept(&p, schedule).is_err());
    }

    #[test]
    fn test_offset_basis_parse_and_display() {
        assert_eq!("cumulative".parse::<OffsetBasis>().unwrap(), OffsetBasis::Cumulative);
        assert_eq!(
            "from-learned-date".parse::<OffsetBasis>().unwrap(),
            OffsetBasis::FromLearnedDate
        );
        assert!("weekly".parse::<OffsetBasis>().is_err());
        assert_eq!(OffsetBasis::FromLearnedDate.to_string(), "from_learned_date");
    }
}
