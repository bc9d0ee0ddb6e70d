//! # Furfolio Analytics Engine
//!
//! This crate derives retention and revenue figures from an owner's recorded
//! appointments and transactions.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of storage,
//!   rendering or logging. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** `RetentionClassifier` and `RevenueAggregator` hold
//!   only their configuration. Every operation takes `now` explicitly, never
//!   mutates its inputs, and returns a new value or an `AnalyticsError`.
//!
//! ## Public API
//!
//! - `RetentionClassifier`: buckets owners into `RetentionCategory` values.
//! - `RevenueAggregator`: totals, daily/monthly series, rankings, goal and growth.
//! - `ReferenceCalendar`: the injected definition of "day" and "month".
//! - `order_by_date`: date ordering for an owner's appointments.

// Declare the modules that constitute this crate.
pub mod calendar;
pub mod error;
pub mod retention;
pub mod revenue;
pub mod schedule;

// Re-export the key components to create a clean, public-facing API.
pub use calendar::ReferenceCalendar;
pub use error::AnalyticsError;
pub use retention::{FollowUp, RetentionClassifier, RetentionWindows};
pub use revenue::{
    CategoryRevenue, DailyRevenue, GoalProgress, MonthlyRevenue, OwnerRevenue, RevenueAggregator,
};
pub use schedule::order_by_date;

use std::cmp::Ordering;

/// Case-insensitive name ordering used for every tie-break, falling back to
/// the exact string so the order is total.
pub(crate) fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
