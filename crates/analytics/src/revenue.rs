use crate::calendar::ReferenceCalendar;
use crate::error::AnalyticsError;
use chrono::{DateTime, Days, Months, NaiveDate, TimeDelta, Utc};
use core_types::{Owner, Transaction, TransactionCategory};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Revenue booked on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyRevenue {
    pub day: NaiveDate,
    pub total: Decimal,
}

/// Revenue booked in one calendar month, keyed by the month's first day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRevenue {
    pub month_start: NaiveDate,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRevenue {
    pub category: TransactionCategory,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnerRevenue<'a> {
    pub owner: &'a Owner,
    pub total: Decimal,
}

/// Month-to-date revenue measured against a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalProgress {
    pub total: Decimal,
    pub goal: Decimal,
    /// `total / goal`, capped at 1.
    pub progress: Decimal,
}

/// A stateless calculator for revenue statistics over recorded transactions.
///
/// Transactions whose category is excluded never contribute to any result.
#[derive(Debug, Clone, Default)]
pub struct RevenueAggregator {
    excluded_categories: BTreeSet<TransactionCategory>,
    calendar: ReferenceCalendar,
}

impl RevenueAggregator {
    pub fn new(
        excluded_categories: impl IntoIterator<Item = TransactionCategory>,
        calendar: ReferenceCalendar,
    ) -> Self {
        Self {
            excluded_categories: excluded_categories.into_iter().collect(),
            calendar,
        }
    }

    pub fn calendar(&self) -> &ReferenceCalendar {
        &self.calendar
    }

    pub fn excluded_categories(&self) -> &BTreeSet<TransactionCategory> {
        &self.excluded_categories
    }

    pub fn is_included(&self, txn: &Transaction) -> bool {
        !self.excluded_categories.contains(&txn.category)
    }

    fn included<'a>(
        &'a self,
        transactions: &'a [Transaction],
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        transactions.iter().filter(move |t| self.is_included(t))
    }

    /// Sum of included amounts dated within `[from, to]`. A `None` bound is open.
    pub fn total_revenue(
        &self,
        transactions: &[Transaction],
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Decimal, AnalyticsError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(AnalyticsError::InvalidRange { from, to });
            }
        }

        sum_amounts(
            self.included(transactions)
                .filter(|t| from.is_none_or(|f| t.date >= f) && to.is_none_or(|e| t.date <= e)),
        )
    }

    /// The inclusive instant range covered by the last `days` calendar days
    /// ending on the day of `now`.
    pub fn day_window(
        &self,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), AnalyticsError> {
        let (first, today) = self.day_span(days, now)?;
        let end = today
            .succ_opt()
            .map_or(DateTime::<Utc>::MAX_UTC, |next| {
                self.calendar.start_of_day(next) - TimeDelta::nanoseconds(1)
            });
        Ok((self.calendar.start_of_day(first), end))
    }

    /// One entry per calendar day for the last `days` days, oldest first.
    ///
    /// Days without transactions are reported with a zero total.
    pub fn daily_revenue(
        &self,
        transactions: &[Transaction],
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<DailyRevenue>, AnalyticsError> {
        let (first, today) = self.day_span(days, now)?;

        let mut buckets: BTreeMap<NaiveDate, Decimal> = first
            .iter_days()
            .take_while(|d| *d <= today)
            .map(|d| (d, Decimal::ZERO))
            .collect();

        for txn in self.included(transactions) {
            if let Some(total) = buckets.get_mut(&self.calendar.local_date(txn.date)) {
                *total = add(*total, txn.amount)?;
            }
        }

        Ok(buckets
            .into_iter()
            .map(|(day, total)| DailyRevenue { day, total })
            .collect())
    }

    /// One entry per calendar month for the last `months` months, oldest first.
    pub fn monthly_revenue(
        &self,
        transactions: &[Transaction],
        months: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<MonthlyRevenue>, AnalyticsError> {
        if months <= 0 {
            return Err(AnalyticsError::InvalidInput(format!(
                "months must be at least 1, got {months}"
            )));
        }
        let current = self.calendar.month_start(self.calendar.local_date(now));
        let first = u32::try_from(months - 1)
            .ok()
            .and_then(|back| current.checked_sub_months(Months::new(back)))
            .ok_or_else(|| {
                AnalyticsError::InvalidInput(format!("{months} months reaches past the calendar range"))
            })?;

        let mut buckets = BTreeMap::new();
        let mut month = Some(first);
        while let Some(start) = month.filter(|m| *m <= current) {
            buckets.insert(start, Decimal::ZERO);
            month = start.checked_add_months(Months::new(1));
        }

        for txn in self.included(transactions) {
            let key = self.calendar.month_start(self.calendar.local_date(txn.date));
            if let Some(total) = buckets.get_mut(&key) {
                *total = add(*total, txn.amount)?;
            }
        }

        Ok(buckets
            .into_iter()
            .map(|(month_start, total)| MonthlyRevenue { month_start, total })
            .collect())
    }

    /// Totals per category, largest first.
    ///
    /// Ties are broken by display name, compared case-insensitively.
    pub fn revenue_by_category(
        &self,
        transactions: &[Transaction],
    ) -> Result<Vec<CategoryRevenue>, AnalyticsError> {
        let mut totals: BTreeMap<TransactionCategory, Decimal> = BTreeMap::new();
        for txn in self.included(transactions) {
            let total = totals.entry(txn.category).or_insert(Decimal::ZERO);
            *total = add(*total, txn.amount)?;
        }

        let mut ranked: Vec<CategoryRevenue> = totals
            .into_iter()
            .map(|(category, total)| CategoryRevenue { category, total })
            .collect();
        ranked.sort_by(|a, b| {
            b.total.cmp(&a.total).then_with(|| {
                crate::compare_names(a.category.display_name(), b.category.display_name())
            })
        });
        Ok(ranked)
    }

    /// The `n` owners with the highest included revenue, highest first.
    ///
    /// Ties are broken by name. `n <= 0` yields an empty list.
    pub fn top_owners<'a>(
        &self,
        owners: &'a [Owner],
        n: i64,
    ) -> Result<Vec<OwnerRevenue<'a>>, AnalyticsError> {
        let n = usize::try_from(n).unwrap_or(0);
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut ranked = owners
            .iter()
            .map(|owner| {
                Ok(OwnerRevenue {
                    owner,
                    total: sum_amounts(self.included(&owner.transactions))?,
                })
            })
            .collect::<Result<Vec<_>, AnalyticsError>>()?;
        ranked.sort_by(|a, b| rank_owners(a, b));
        ranked.truncate(n);
        Ok(ranked)
    }

    /// Revenue for the calendar month containing `now`, as a share of `goal`.
    pub fn monthly_goal_progress(
        &self,
        transactions: &[Transaction],
        goal: Decimal,
        now: DateTime<Utc>,
    ) -> Result<GoalProgress, AnalyticsError> {
        if goal <= Decimal::ZERO {
            return Err(AnalyticsError::InvalidGoal(goal));
        }

        let (start, end) = self.calendar.month_bounds(now);
        let total = sum_amounts(
            self.included(transactions)
                .filter(|t| t.date >= start && t.date < end),
        )?;
        let progress = total
            .checked_div(goal)
            .ok_or_else(|| overflow("goal progress"))?
            .min(Decimal::ONE);

        Ok(GoalProgress {
            total,
            goal,
            progress,
        })
    }

    /// Percent change between the last `days` days and the `days` before that.
    ///
    /// When the earlier window sums to zero the growth is reported as exactly
    /// 100, whatever the current window holds.
    pub fn revenue_growth(
        &self,
        transactions: &[Transaction],
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<Decimal, AnalyticsError> {
        if days <= 0 {
            return Err(AnalyticsError::InvalidInput(format!(
                "days must be at least 1, got {days}"
            )));
        }
        let out_of_range =
            || AnalyticsError::InvalidInput(format!("{days} days reaches past the calendar range"));
        let span = TimeDelta::try_days(days).ok_or_else(out_of_range)?;
        let current_start = now.checked_sub_signed(span).ok_or_else(out_of_range)?;
        let previous_start = current_start
            .checked_sub_signed(span)
            .ok_or_else(out_of_range)?;

        let mut current = Decimal::ZERO;
        let mut previous = Decimal::ZERO;
        for txn in self.included(transactions) {
            if txn.date >= current_start && txn.date <= now {
                current = add(current, txn.amount)?;
            } else if txn.date >= previous_start && txn.date < current_start {
                previous = add(previous, txn.amount)?;
            }
        }

        if previous.is_zero() {
            return Ok(Decimal::ONE_HUNDRED);
        }
        current
            .checked_sub(previous)
            .and_then(|change| change.checked_div(previous))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| overflow("revenue growth"))
    }

    /// Mean amount of the included transactions, `None` if there are none.
    pub fn average_transaction_value(
        &self,
        transactions: &[Transaction],
    ) -> Result<Option<Decimal>, AnalyticsError> {
        let mut count = 0u64;
        let mut sum = Decimal::ZERO;
        for txn in self.included(transactions) {
            count += 1;
            sum = add(sum, txn.amount)?;
        }
        if count == 0 {
            return Ok(None);
        }
        sum.checked_div(Decimal::from(count))
            .map(Some)
            .ok_or_else(|| overflow("average transaction value"))
    }

    /// First and last calendar day of a `days`-long span ending today.
    fn day_span(
        &self,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<(NaiveDate, NaiveDate), AnalyticsError> {
        if days <= 0 {
            return Err(AnalyticsError::InvalidInput(format!(
                "days must be at least 1, got {days}"
            )));
        }
        let today = self.calendar.local_date(now);
        let back = u64::try_from(days - 1).unwrap_or(u64::MAX);
        let first = today.checked_sub_days(Days::new(back)).ok_or_else(|| {
            AnalyticsError::InvalidInput(format!("{days} days reaches past the calendar range"))
        })?;
        Ok((first, today))
    }
}

fn overflow(what: &str) -> AnalyticsError {
    AnalyticsError::InvalidInput(format!("{what} overflows the decimal range"))
}

fn add(total: Decimal, amount: Decimal) -> Result<Decimal, AnalyticsError> {
    total.checked_add(amount).ok_or_else(|| overflow("revenue total"))
}

fn sum_amounts<'a>(
    mut transactions: impl Iterator<Item = &'a Transaction>,
) -> Result<Decimal, AnalyticsError> {
    transactions.try_fold(Decimal::ZERO, |total, t| add(total, t.amount))
}

fn rank_owners(a: &OwnerRevenue<'_>, b: &OwnerRevenue<'_>) -> Ordering {
    b.total
        .cmp(&a.total)
        .then_with(|| crate::compare_names(&a.owner.name, &b.owner.name))
}
