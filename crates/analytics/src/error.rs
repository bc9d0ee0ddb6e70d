use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Caller errors detected by the analytics engine.
///
/// Every operation is pure, so nothing here is transient and nothing is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid date range: start {from} is after end {to}")]
    InvalidRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    #[error("Invalid goal amount ({0}): the goal must be greater than zero")]
    InvalidGoal(Decimal),
}
