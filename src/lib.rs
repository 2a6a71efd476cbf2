/// Revisit: Pattern-Based Review Scheduling
///
/// This library tracks study items that must be revisited on a schedule
/// derived from a reusable pattern of day intervals, and keeps a client-side
/// view of those items consistent with an authoritative item service.
///
/// ### Modules
///
/// - `models`: Patterns, items, review dates, boxes and categories
/// - `scheduling`: Schedule generation, manual reschedule with overdue
///   policies, pattern compatibility and the box placement gate
/// - `store`: Location store, query cache, response merging and per-item
///   mutation locks
/// - `service`: The item service contract with HTTP and in-memory backends
/// - `sync`: The mutation façade tying the service to the caches
/// - `catalog`: Known patterns, boxes and categories
/// - `dto`: Request and response shapes exchanged with the service
/// - `config`: Layered configuration (defaults, TOML file, env, flags)
/// - `logging`: Subscriber setup for stderr and rolling JSON files
///
/// ### Scheduling
///
/// A pattern `[1, 3, 7]` for an item learned on day 0 yields review dates on
/// days 1, 4 and 11 under the default cumulative offset basis. A review date
/// can later be moved back into `[initial_scheduled_date, yesterday]`; the
/// steps after it shift by the same pattern offsets, and the ones that fall
/// due are either marked completed or pinned to today.
///
/// ### Placement
///
/// Once an item has a completed review it may only enter boxes whose pattern
/// is absent or has exactly the same intervals, so completed steps keep
/// their meaning.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod dto;
pub mod errors;
pub mod logging;
pub mod models;
pub mod scheduling;
pub mod service;
pub mod store;
pub mod sync;

#[cfg(test)]
pub mod test_utils;

pub use errors::{Result, RevisitError};
pub use sync::Synchronizer;
