use crate::error::AnalyticsError;
use chrono::{DateTime, Utc};
use core_types::{Owner, RetentionCategory};
use std::collections::BTreeMap;

/// Day thresholds that separate the retention buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionWindows {
    pub new_client_days: i64,
    pub active_days: i64,
    pub retention_risk_days: i64,
    pub inactive_days: i64,
}

impl RetentionWindows {
    /// Validates that every window is positive and that they are ordered
    /// `new_client <= active <= retention_risk <= inactive`.
    pub fn new(
        new_client_days: i64,
        active_days: i64,
        retention_risk_days: i64,
        inactive_days: i64,
    ) -> Result<Self, AnalyticsError> {
        if new_client_days <= 0 {
            return Err(AnalyticsError::InvalidInput(
                "new client window must be at least one day".to_string(),
            ));
        }
        if !(new_client_days <= active_days
            && active_days <= retention_risk_days
            && retention_risk_days <= inactive_days)
        {
            return Err(AnalyticsError::InvalidInput(format!(
                "retention windows must be non-decreasing, got {new_client_days}/{active_days}/{retention_risk_days}/{inactive_days}"
            )));
        }
        Ok(Self {
            new_client_days,
            active_days,
            retention_risk_days,
            inactive_days,
        })
    }
}

impl Default for RetentionWindows {
    fn default() -> Self {
        Self {
            new_client_days: 14,
            active_days: 30,
            retention_risk_days: 60,
            inactive_days: 180,
        }
    }
}

/// An owner flagged for outreach, with how long it has been since their last visit.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowUp<'a> {
    pub owner: &'a Owner,
    pub category: RetentionCategory,
    pub days_since: i64,
}

/// A stateless classifier assigning each owner exactly one `RetentionCategory`.
#[derive(Debug, Clone, Default)]
pub struct RetentionClassifier {
    windows: RetentionWindows,
}

impl RetentionClassifier {
    pub fn new(windows: RetentionWindows) -> Self {
        Self { windows }
    }

    pub fn windows(&self) -> &RetentionWindows {
        &self.windows
    }

    /// Classifies an owner from their appointment history as of `now`.
    pub fn classify(
        &self,
        owner: &Owner,
        now: DateTime<Utc>,
    ) -> Result<RetentionCategory, AnalyticsError> {
        let count = i64::try_from(owner.appointment_count()).unwrap_or(i64::MAX);
        self.classify_history(owner.last_appointment_date(), count, now)
    }

    /// The classification rule itself.
    ///
    /// Buckets are tested in a fixed order and the first match wins, so a long
    /// absence always outranks the new-client heuristic.
    pub fn classify_history(
        &self,
        last_appointment: Option<DateTime<Utc>>,
        appointment_count: i64,
        now: DateTime<Utc>,
    ) -> Result<RetentionCategory, AnalyticsError> {
        if appointment_count < 0 {
            return Err(AnalyticsError::InvalidInput(format!(
                "appointment count cannot be negative, got {appointment_count}"
            )));
        }

        let Some(last) = last_appointment else {
            return Ok(RetentionCategory::NewClient);
        };
        let days = days_between(last, now);
        let w = &self.windows;

        let category = if days > w.inactive_days {
            RetentionCategory::Inactive
        } else if days > w.retention_risk_days {
            RetentionCategory::RetentionRisk
        } else if appointment_count <= 1 && days <= w.new_client_days {
            RetentionCategory::NewClient
        } else if days <= w.active_days {
            RetentionCategory::Active
        } else {
            RetentionCategory::Returning
        };
        Ok(category)
    }

    /// Whole days since the owner's last appointment, `None` if they have none.
    pub fn days_since_last_visit(&self, owner: &Owner, now: DateTime<Utc>) -> Option<i64> {
        owner.last_appointment_date().map(|last| days_between(last, now))
    }

    /// Pairs every owner with their category, preserving input order.
    pub fn classify_all<'a>(
        &self,
        owners: &'a [Owner],
        now: DateTime<Utc>,
    ) -> Result<Vec<(&'a Owner, RetentionCategory)>, AnalyticsError> {
        owners
            .iter()
            .map(|owner| self.classify(owner, now).map(|category| (owner, category)))
            .collect()
    }

    /// Owners in `category`, in their original order.
    pub fn filter_by_category<'a>(
        &self,
        owners: &'a [Owner],
        category: RetentionCategory,
        now: DateTime<Utc>,
    ) -> Result<Vec<&'a Owner>, AnalyticsError> {
        Ok(self
            .classify_all(owners, now)?
            .into_iter()
            .filter(|(_, c)| *c == category)
            .map(|(owner, _)| owner)
            .collect())
    }

    /// Owner counts per category. All five categories are always present.
    pub fn stats_by_category(
        &self,
        owners: &[Owner],
        now: DateTime<Utc>,
    ) -> Result<BTreeMap<RetentionCategory, usize>, AnalyticsError> {
        let mut stats: BTreeMap<_, _> = RetentionCategory::ALL.into_iter().map(|c| (c, 0)).collect();
        for owner in owners {
            *stats.entry(self.classify(owner, now)?).or_insert(0) += 1;
        }
        Ok(stats)
    }

    /// Owners at risk or inactive, longest absence first.
    pub fn follow_up_list<'a>(
        &self,
        owners: &'a [Owner],
        now: DateTime<Utc>,
    ) -> Result<Vec<FollowUp<'a>>, AnalyticsError> {
        let mut list: Vec<FollowUp<'a>> = self
            .classify_all(owners, now)?
            .into_iter()
            .filter(|(_, category)| category.needs_follow_up())
            .map(|(owner, category)| FollowUp {
                owner,
                category,
                days_since: self.days_since_last_visit(owner, now).unwrap_or(0),
            })
            .collect();

        list.sort_by(|a, b| {
            b.days_since
                .cmp(&a.days_since)
                .then_with(|| crate::compare_names(&a.owner.name, &b.owner.name))
        });
        Ok(list)
    }
}

/// Whole elapsed days from `from` to `to`.
///
/// A future-dated `from` yields 0 rather than a negative count, so an owner
/// with an upcoming booking is never treated as overdue.
fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_days().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn owner_seen(name: &str, days_ago: &[i64]) -> Owner {
        days_ago.iter().fold(Owner::new(name), |owner, d| {
            owner.with_appointment(now() - Duration::days(*d))
        })
    }

    #[test]
    fn owner_without_appointments_is_new() {
        let classifier = RetentionClassifier::default();
        let owner = Owner::new("Nobody Yet");
        assert_eq!(classifier.classify(&owner, now()).unwrap(), RetentionCategory::NewClient);
        let far_future = now() + Duration::days(10_000);
        assert_eq!(classifier.classify(&owner, far_future).unwrap(), RetentionCategory::NewClient);
    }

    #[test]
    fn single_visit_moves_through_buckets_over_time() {
        let classifier = RetentionClassifier::default();
        let cases = [
            (5, RetentionCategory::NewClient),
            (20, RetentionCategory::Active),
            (45, RetentionCategory::Returning),
            (100, RetentionCategory::RetentionRisk),
            (200, RetentionCategory::Inactive),
        ];
        for (days, expected) in cases {
            let owner = owner_seen("Sam", &[days]);
            assert_eq!(classifier.classify(&owner, now()).unwrap(), expected, "{days} days");
        }
    }

    #[test]
    fn repeat_client_is_active_not_new() {
        let classifier = RetentionClassifier::default();
        let owner = owner_seen("Regular", &[40, 5]);
        assert_eq!(classifier.classify(&owner, now()).unwrap(), RetentionCategory::Active);
    }

    #[test]
    fn window_edges_are_inclusive() {
        let classifier = RetentionClassifier::default();
        let at = |days: i64, count: i64| {
            classifier
                .classify_history(Some(now() - Duration::days(days)), count, now())
                .unwrap()
        };
        assert_eq!(at(14, 1), RetentionCategory::NewClient);
        assert_eq!(at(15, 1), RetentionCategory::Active);
        assert_eq!(at(30, 3), RetentionCategory::Active);
        assert_eq!(at(60, 3), RetentionCategory::Returning);
        assert_eq!(at(61, 3), RetentionCategory::RetentionRisk);
        assert_eq!(at(180, 3), RetentionCategory::RetentionRisk);
        assert_eq!(at(181, 0), RetentionCategory::Inactive);
    }

    #[test]
    fn future_appointment_is_clamped_to_today() {
        // An upcoming booking counts as zero days, never as a negative gap.
        let classifier = RetentionClassifier::default();
        let booked = owner_seen("Early Bird", &[-7]);
        assert_eq!(classifier.days_since_last_visit(&booked, now()), Some(0));
        assert_eq!(classifier.classify(&booked, now()).unwrap(), RetentionCategory::NewClient);

        let regular = owner_seen("Regular", &[90, -3]);
        assert_eq!(classifier.classify(&regular, now()).unwrap(), RetentionCategory::Active);
    }

    #[test]
    fn negative_count_is_rejected() {
        let classifier = RetentionClassifier::default();
        let err = classifier.classify_history(Some(now()), -1, now()).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput(_)));
    }

    #[test]
    fn custom_windows_are_honoured() {
        let windows = RetentionWindows::new(7, 14, 21, 28).unwrap();
        let classifier = RetentionClassifier::new(windows);
        let owner = owner_seen("Busy", &[25]);
        assert_eq!(classifier.classify(&owner, now()).unwrap(), RetentionCategory::RetentionRisk);
    }

    #[test]
    fn misordered_windows_are_rejected() {
        assert!(RetentionWindows::new(30, 14, 60, 180).is_err());
        assert!(RetentionWindows::new(0, 30, 60, 180).is_err());
        assert_eq!(RetentionWindows::new(14, 30, 60, 180).unwrap(), RetentionWindows::default());
    }

    #[test]
    fn filter_keeps_input_order() {
        let classifier = RetentionClassifier::default();
        let owners = vec![
            owner_seen("Zed", &[100]),
            owner_seen("Amy", &[3, 10]),
            owner_seen("Bob", &[70]),
        ];
        let at_risk = classifier
            .filter_by_category(&owners, RetentionCategory::RetentionRisk, now())
            .unwrap();
        let names: Vec<_> = at_risk.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Zed", "Bob"]);
    }

    #[test]
    fn stats_include_empty_buckets() {
        let classifier = RetentionClassifier::default();
        let owners = vec![owner_seen("A", &[2]), owner_seen("B", &[300])];
        let stats = classifier.stats_by_category(&owners, now()).unwrap();

        assert_eq!(stats.len(), 5);
        assert_eq!(stats[&RetentionCategory::NewClient], 1);
        assert_eq!(stats[&RetentionCategory::Inactive], 1);
        assert_eq!(stats[&RetentionCategory::Returning], 0);
        assert_eq!(stats.values().sum::<usize>(), owners.len());

        let empty = classifier.stats_by_category(&[], now()).unwrap();
        assert_eq!(empty.len(), 5);
        assert!(empty.values().all(|n| *n == 0));
    }

    #[test]
    fn follow_up_list_orders_by_absence() {
        let classifier = RetentionClassifier::default();
        let owners = vec![
            owner_seen("bea", &[90]),
            owner_seen("Active", &[1, 8]),
            owner_seen("Cal", &[400]),
            owner_seen("Abe", &[90]),
        ];
        let list = classifier.follow_up_list(&owners, now()).unwrap();
        let names: Vec<_> = list.iter().map(|f| f.owner.name.as_str()).collect();
        assert_eq!(names, vec!["Cal", "Abe", "bea"]);
        assert_eq!(list[0].category, RetentionCategory::Inactive);
        assert_eq!(list[0].days_since, 400);
    }
}
