use analytics::{AnalyticsError, ReferenceCalendar, RetentionClassifier, RevenueAggregator};
use chrono::{DateTime, Duration, TimeZone, Utc};
use core_types::{Owner, RetentionCategory, Transaction, TransactionCategory};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 15, 16, 45, 0).unwrap()
}

fn amount() -> impl Strategy<Value = Decimal> {
    (-10_000i64..100_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn category() -> impl Strategy<Value = TransactionCategory> {
    prop::sample::select(TransactionCategory::ALL.to_vec())
}

/// Transactions spread over the 60 days before `now()`.
fn recent_transactions() -> impl Strategy<Value = Vec<Transaction>> {
    prop::collection::vec((0i64..60 * 24 * 60, amount(), category()), 0..40).prop_map(|rows| {
        rows.into_iter()
            .map(|(minutes_ago, amount, category)| {
                Transaction::new(Uuid::new_v4(), now() - Duration::minutes(minutes_ago), amount, category)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn classification_is_total(days_ago in -1_000i64..5_000, count in 0i64..50) {
        let classifier = RetentionClassifier::default();
        let last = now() - Duration::days(days_ago);
        let category = classifier.classify_history(Some(last), count, now()).unwrap();
        prop_assert!(RetentionCategory::ALL.contains(&category));
    }

    #[test]
    fn long_absence_beats_new_client(days_ago in 181i64..5_000, count in 0i64..=1) {
        let classifier = RetentionClassifier::default();
        let last = now() - Duration::days(days_ago);
        prop_assert_eq!(
            classifier.classify_history(Some(last), count, now()).unwrap(),
            RetentionCategory::Inactive
        );
    }

    #[test]
    fn no_history_is_always_new(seconds in 0i64..4_000_000_000) {
        let classifier = RetentionClassifier::default();
        let at = Utc.timestamp_opt(seconds, 0).unwrap();
        prop_assert_eq!(
            classifier.classify(&Owner::new("Fresh"), at).unwrap(),
            RetentionCategory::NewClient
        );
    }

    #[test]
    fn category_totals_add_up(txns in recent_transactions(), exclude_refunds in any::<bool>()) {
        let excluded = exclude_refunds.then_some(TransactionCategory::Refund);
        let agg = RevenueAggregator::new(excluded, ReferenceCalendar::utc());
        let by_category: Decimal = agg.revenue_by_category(&txns).unwrap().iter().map(|c| c.total).sum();
        prop_assert_eq!(by_category, agg.total_revenue(&txns, None, None).unwrap());
    }

    #[test]
    fn daily_series_matches_window_total(
        txns in recent_transactions(),
        days in 1i64..45,
        offset_minutes in -600i32..=600,
    ) {
        let calendar = ReferenceCalendar::from_offset_minutes(offset_minutes).unwrap();
        let agg = RevenueAggregator::new([TransactionCategory::Refund], calendar);

        let series = agg.daily_revenue(&txns, days, now()).unwrap();
        prop_assert_eq!(series.len() as i64, days);
        prop_assert!(series.windows(2).all(|w| w[0].day.succ_opt() == Some(w[1].day)));
        prop_assert_eq!(series.last().map(|d| d.day), Some(calendar.local_date(now())));

        let (from, to) = agg.day_window(days, now()).unwrap();
        let series_total: Decimal = series.iter().map(|d| d.total).sum();
        prop_assert_eq!(series_total, agg.total_revenue(&txns, Some(from), Some(to)).unwrap());
    }

    #[test]
    fn top_owners_are_bounded_and_sorted(
        totals in prop::collection::vec(0i64..500, 0..12),
        n in -3i64..8,
    ) {
        let owners: Vec<Owner> = totals
            .iter()
            .enumerate()
            .map(|(i, units)| {
                Owner::new(format!("owner-{i:02}"))
                    .with_transaction(now(), Decimal::from(*units), TransactionCategory::Service)
            })
            .collect();
        let agg = RevenueAggregator::default();
        let top = agg.top_owners(&owners, n).unwrap();

        prop_assert!(top.len() as i64 <= n.max(0));
        prop_assert!(top.len() <= owners.len());
        for pair in top.windows(2) {
            prop_assert!(pair[0].total > pair[1].total
                || (pair[0].total == pair[1].total && pair[0].owner.name < pair[1].owner.name));
        }
    }

    #[test]
    fn growth_without_prior_revenue_is_one_hundred(
        amounts in prop::collection::vec(amount(), 0..10),
        days in 1i64..90,
    ) {
        let txns: Vec<Transaction> = amounts
            .into_iter()
            .map(|a| Transaction::new(Uuid::new_v4(), now(), a, TransactionCategory::Service))
            .collect();
        let agg = RevenueAggregator::default();
        prop_assert_eq!(agg.revenue_growth(&txns, days, now()).unwrap(), dec!(100));
    }
}

#[test]
fn one_visit_ages_from_new_to_inactive() {
    let classifier = RetentionClassifier::default();
    let visit = |days: i64| Owner::new("Pat").with_appointment(now() - Duration::days(days));

    assert_eq!(classifier.classify(&visit(5), now()).unwrap(), RetentionCategory::NewClient);
    assert_eq!(classifier.classify(&visit(100), now()).unwrap(), RetentionCategory::RetentionRisk);
    assert_eq!(classifier.classify(&visit(200), now()).unwrap(), RetentionCategory::Inactive);
}

#[test]
fn service_and_product_example() {
    let owner = Uuid::new_v4();
    let txns = vec![
        Transaction::new(
            owner,
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            dec!(100),
            TransactionCategory::Service,
        ),
        Transaction::new(
            owner,
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            dec!(50),
            TransactionCategory::Product,
        ),
    ];
    let agg = RevenueAggregator::new([], ReferenceCalendar::utc());

    assert_eq!(agg.total_revenue(&txns, None, None).unwrap(), dec!(150));
    let breakdown: Vec<_> = agg
        .revenue_by_category(&txns)
        .unwrap()
        .into_iter()
        .map(|c| (c.category, c.total))
        .collect();
    assert_eq!(
        breakdown,
        vec![
            (TransactionCategory::Service, dec!(100)),
            (TransactionCategory::Product, dec!(50)),
        ]
    );
}

#[test]
fn zero_goal_is_an_error() {
    let agg = RevenueAggregator::default();
    assert_eq!(
        agg.monthly_goal_progress(&[], Decimal::ZERO, now()),
        Err(AnalyticsError::InvalidGoal(Decimal::ZERO))
    );
}

#[test]
fn refund_heavy_previous_window_is_used_as_is() {
    let agg = RevenueAggregator::default();
    let owner = Uuid::new_v4();
    let txns = vec![
        Transaction::new(owner, now() - Duration::days(10), dec!(-50), TransactionCategory::Refund),
        Transaction::new(owner, now() - Duration::days(2), dec!(100), TransactionCategory::Service),
    ];
    // (100 - (-50)) / -50 * 100
    assert_eq!(agg.revenue_growth(&txns, 7, now()).unwrap(), dec!(-300));
}

#[test]
fn refund_heavy_month_gives_negative_progress() {
    let agg = RevenueAggregator::default();
    let owner = Uuid::new_v4();
    let txns = vec![
        Transaction::new(owner, now() - Duration::days(3), dec!(-250), TransactionCategory::Refund),
        Transaction::new(owner, now() - Duration::days(1), dec!(50), TransactionCategory::Service),
    ];
    let progress = agg.monthly_goal_progress(&txns, dec!(1000), now()).unwrap();
    assert_eq!(progress.total, dec!(-200));
    assert_eq!(progress.progress, dec!(-0.2));
}
