//! # Furfolio Dashboard
//!
//! The caller-side layer over the analytics engine. It builds the engine from
//! configuration, records every call in `tracing`, and assembles the owned
//! `DashboardReport` that renderers consume.
//!
//! The engine itself never logs; all observability lives here.

use crate::error::DashboardError;
use analytics::{
    AnalyticsError, CategoryRevenue, DailyRevenue, FollowUp, GoalProgress, MonthlyRevenue,
    OwnerRevenue, ReferenceCalendar, RetentionClassifier, RetentionWindows, RevenueAggregator,
};
use chrono::{DateTime, Utc};
use configuration::{Config, RevenueSettings};
use core_types::{AppointmentRecord, Owner, RetentionCategory, Transaction};
use rust_decimal::Decimal;
use uuid::Uuid;

pub mod error;
pub mod report;

pub use report::{DashboardReport, FollowUpRow, OwnerTotalRow, RetentionBucket, RevenueSummary};

/// The main dashboard service.
pub struct Dashboard {
    classifier: RetentionClassifier,
    aggregator: RevenueAggregator,
    settings: RevenueSettings,
}

impl Dashboard {
    pub fn new(
        classifier: RetentionClassifier,
        aggregator: RevenueAggregator,
        settings: RevenueSettings,
    ) -> Self {
        Self {
            classifier,
            aggregator,
            settings,
        }
    }

    /// Builds the engine instances described by the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, DashboardError> {
        let r = &config.retention;
        let windows = RetentionWindows::new(
            r.new_client_window_days,
            r.active_window_days,
            r.retention_risk_window_days,
            r.inactive_window_days,
        )?;
        let calendar = ReferenceCalendar::from_offset_minutes(config.revenue.utc_offset_minutes)?;
        let aggregator = RevenueAggregator::new(
            config.revenue.excluded_categories.iter().copied(),
            calendar,
        );

        tracing::debug!(
            ?windows,
            excluded = ?aggregator.excluded_categories(),
            offset = %calendar.offset(),
            "Dashboard configured."
        );
        Ok(Self::new(
            RetentionClassifier::new(windows),
            aggregator,
            config.revenue.clone(),
        ))
    }

    pub fn settings(&self) -> &RevenueSettings {
        &self.settings
    }

    pub fn calendar(&self) -> &ReferenceCalendar {
        self.aggregator.calendar()
    }

    /// Classifies every owner, preserving input order.
    #[tracing::instrument(name = "classify_owners", skip_all, fields(owners = owners.len()))]
    pub fn classify_owners<'a>(
        &self,
        owners: &'a [Owner],
        now: DateTime<Utc>,
    ) -> Result<Vec<(&'a Owner, RetentionCategory)>, DashboardError> {
        observe("classify_all", self.classifier.classify_all(owners, now))
    }

    #[tracing::instrument(name = "filter_by_category", skip_all, fields(owners = owners.len(), category = %category))]
    pub fn owners_in<'a>(
        &self,
        owners: &'a [Owner],
        category: RetentionCategory,
        now: DateTime<Utc>,
    ) -> Result<Vec<&'a Owner>, DashboardError> {
        let matched = observe(
            "filter_by_category",
            self.classifier.filter_by_category(owners, category, now),
        )?;
        tracing::debug!(matched = matched.len(), "Filtered owners by retention category.");
        Ok(matched)
    }

    #[tracing::instrument(name = "retention_stats", skip_all, fields(owners = owners.len()))]
    pub fn retention_stats(
        &self,
        owners: &[Owner],
        now: DateTime<Utc>,
    ) -> Result<Vec<RetentionBucket>, DashboardError> {
        let stats = observe(
            "stats_by_category",
            self.classifier.stats_by_category(owners, now),
        )?;
        Ok(stats
            .into_iter()
            .map(|(category, count)| RetentionBucket { category, count })
            .collect())
    }

    #[tracing::instrument(name = "follow_up_list", skip_all, fields(owners = owners.len()))]
    pub fn follow_ups<'a>(
        &self,
        owners: &'a [Owner],
        now: DateTime<Utc>,
    ) -> Result<Vec<FollowUp<'a>>, DashboardError> {
        let list = observe("follow_up_list", self.classifier.follow_up_list(owners, now))?;
        if !list.is_empty() {
            tracing::info!(count = list.len(), "Owners need a follow-up.");
        }
        Ok(list)
    }

    #[tracing::instrument(name = "total_revenue", skip_all, fields(transactions = transactions.len()))]
    pub fn total_revenue(
        &self,
        transactions: &[Transaction],
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Decimal, DashboardError> {
        let total = observe(
            "total_revenue",
            self.aggregator.total_revenue(transactions, from, to),
        )?;
        tracing::debug!(?from, ?to, %total, "Computed total revenue.");
        Ok(total)
    }

    pub fn revenue_by_category(
        &self,
        transactions: &[Transaction],
    ) -> Result<Vec<CategoryRevenue>, DashboardError> {
        let breakdown = observe(
            "revenue_by_category",
            self.aggregator.revenue_by_category(transactions),
        )?;
        tracing::debug!(categories = breakdown.len(), "Computed revenue by category.");
        Ok(breakdown)
    }

    pub fn average_transaction(
        &self,
        transactions: &[Transaction],
    ) -> Result<Option<Decimal>, DashboardError> {
        observe(
            "average_transaction_value",
            self.aggregator.average_transaction_value(transactions),
        )
    }

    #[tracing::instrument(name = "daily_revenue", skip_all, fields(days = days))]
    pub fn daily_revenue(
        &self,
        transactions: &[Transaction],
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<DailyRevenue>, DashboardError> {
        observe(
            "daily_revenue",
            self.aggregator.daily_revenue(transactions, days, now),
        )
    }

    #[tracing::instrument(name = "monthly_revenue", skip_all, fields(months = months))]
    pub fn monthly_revenue(
        &self,
        transactions: &[Transaction],
        months: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<MonthlyRevenue>, DashboardError> {
        observe(
            "monthly_revenue",
            self.aggregator.monthly_revenue(transactions, months, now),
        )
    }

    pub fn top_owners<'a>(
        &self,
        owners: &'a [Owner],
        n: i64,
    ) -> Result<Vec<OwnerRevenue<'a>>, DashboardError> {
        let top = observe("top_owners", self.aggregator.top_owners(owners, n))?;
        tracing::debug!(requested = n, returned = top.len(), "Ranked owners by revenue.");
        Ok(top)
    }

    #[tracing::instrument(name = "monthly_goal_progress", skip_all, fields(goal = %goal))]
    pub fn goal_progress(
        &self,
        transactions: &[Transaction],
        goal: Decimal,
        now: DateTime<Utc>,
    ) -> Result<GoalProgress, DashboardError> {
        let progress = observe(
            "monthly_goal_progress",
            self.aggregator.monthly_goal_progress(transactions, goal, now),
        )?;
        if progress.progress >= Decimal::ONE {
            tracing::info!(total = %progress.total, "Monthly revenue goal reached.");
        }
        Ok(progress)
    }

    #[tracing::instrument(name = "revenue_growth", skip_all, fields(days = days))]
    pub fn growth(
        &self,
        transactions: &[Transaction],
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<Decimal, DashboardError> {
        observe(
            "revenue_growth",
            self.aggregator.revenue_growth(transactions, days, now),
        )
    }

    /// An owner's appointments in date order.
    pub fn schedule<'a>(
        &self,
        owners: &'a [Owner],
        owner_id: Uuid,
    ) -> Result<Vec<&'a AppointmentRecord>, DashboardError> {
        let owner = owners
            .iter()
            .find(|o| o.id == owner_id)
            .ok_or(DashboardError::OwnerNotFound(owner_id))?;
        Ok(analytics::order_by_date(&owner.appointments))
    }

    /// Computes every dashboard figure for `owners` as of `now`.
    #[tracing::instrument(name = "dashboard_report", skip_all, fields(owners = owners.len(), now = %now))]
    pub fn build_report(
        &self,
        owners: &[Owner],
        now: DateTime<Utc>,
    ) -> Result<DashboardReport, DashboardError> {
        let transactions = all_transactions(owners);
        let s = &self.settings;

        let retention = self.retention_stats(owners, now)?;
        let follow_ups = self
            .follow_ups(owners, now)?
            .iter()
            .map(FollowUpRow::from)
            .collect();

        let revenue = RevenueSummary {
            total: self.total_revenue(&transactions, None, None)?,
            average_transaction: self.average_transaction(&transactions)?,
            by_category: self.revenue_by_category(&transactions)?,
            daily: self.daily_revenue(&transactions, s.daily_window_days, now)?,
            monthly: self.monthly_revenue(&transactions, s.monthly_window_months, now)?,
            goal: self.goal_progress(&transactions, s.monthly_goal, now)?,
            growth_window_days: s.growth_window_days,
            growth_pct: self.growth(&transactions, s.growth_window_days, now)?,
        };

        let top_owners = self
            .top_owners(owners, s.top_owner_count)?
            .iter()
            .map(OwnerTotalRow::from)
            .collect();

        tracing::info!(
            total = %revenue.total,
            transactions = transactions.len(),
            "Dashboard report built."
        );

        Ok(DashboardReport {
            generated_at: now,
            owner_count: owners.len(),
            retention,
            follow_ups,
            revenue,
            top_owners,
        })
    }
}

/// Every transaction of every owner, in owner order.
pub fn all_transactions(owners: &[Owner]) -> Vec<Transaction> {
    owners
        .iter()
        .flat_map(|o| o.transactions.iter().cloned())
        .collect()
}

/// Passes an engine result through, logging failures before they propagate.
fn observe<T>(operation: &'static str, result: Result<T, AnalyticsError>) -> Result<T, DashboardError> {
    result.map_err(|e| {
        tracing::warn!(operation, error = %e, "Analytics call rejected its input.");
        DashboardError::from(e)
    })
}
