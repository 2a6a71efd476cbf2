use chrono::{Local, NaiveDate};

/// Source of the current calendar date
///
/// "Today" drives the reschedule bounds and the overdue policies, so it is
/// injected rather than read from the system inside the scheduling code.
pub trait Clock: Send + Sync {
    /// The current local date
    fn today(&self) -> NaiveDate;

    /// The day before `today`
    fn yesterday(&self) -> NaiveDate {
        self.today().pred_opt().unwrap_or(NaiveDate::MIN)
    }
}

/// Reads the date from the local system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
