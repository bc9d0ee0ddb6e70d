use analytics::{CategoryRevenue, DailyRevenue, FollowUp, GoalProgress, MonthlyRevenue, OwnerRevenue};
use chrono::{DateTime, Utc};
use core_types::RetentionCategory;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Everything the business dashboard shows, computed for a single instant.
///
/// This struct is the final output of the `Dashboard` and owns all of its data,
/// so it can be serialized or handed to a renderer without borrowing the owners.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub owner_count: usize,
    pub retention: Vec<RetentionBucket>,
    pub follow_ups: Vec<FollowUpRow>,
    pub revenue: RevenueSummary,
    pub top_owners: Vec<OwnerTotalRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetentionBucket {
    pub category: RetentionCategory,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowUpRow {
    pub owner_id: Uuid,
    pub name: String,
    pub category: RetentionCategory,
    pub days_since: i64,
}

impl From<&FollowUp<'_>> for FollowUpRow {
    fn from(f: &FollowUp<'_>) -> Self {
        Self {
            owner_id: f.owner.id,
            name: f.owner.name.clone(),
            category: f.category,
            days_since: f.days_since,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerTotalRow {
    pub owner_id: Uuid,
    pub name: String,
    pub total: Decimal,
}

impl From<&OwnerRevenue<'_>> for OwnerTotalRow {
    fn from(r: &OwnerRevenue<'_>) -> Self {
        Self {
            owner_id: r.owner.id,
            name: r.owner.name.clone(),
            total: r.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueSummary {
    pub total: Decimal,
    pub average_transaction: Option<Decimal>,
    pub by_category: Vec<CategoryRevenue>,
    pub daily: Vec<DailyRevenue>,
    pub monthly: Vec<MonthlyRevenue>,
    pub goal: GoalProgress,
    pub growth_window_days: i64,
    pub growth_pct: Decimal,
}

impl DashboardReport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
