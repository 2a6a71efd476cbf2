/// Scheduling module
///
/// Pure functions over patterns and schedules: generating review dates,
/// rewinding one of them with an overdue policy, comparing patterns, and
/// gating box placement. Nothing here talks to the service or the caches.

mod generator;
mod reschedule;
mod compat;
mod placement;

pub use generator::*;
pub use reschedule::*;
pub use compat::*;
pub use placement::*;
