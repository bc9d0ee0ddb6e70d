use analytics::{CategoryRevenue, DailyRevenue, GoalProgress, MonthlyRevenue};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use core_types::{AppointmentRecord, Owner, RetentionCategory};
use dashboard::{DashboardReport, FollowUpRow, OwnerTotalRow, RetentionBucket};
use rust_decimal::Decimal;

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

fn percent(ratio: Decimal) -> String {
    ratio
        .checked_mul(Decimal::ONE_HUNDRED)
        .map_or_else(|| "out of range".to_string(), |p| format!("{}%", p.round_dp(1)))
}

pub fn classified_owners(rows: &[(&Owner, RetentionCategory)]) -> Table {
    let mut t = table(vec!["Owner", "Category", "Appointments", "Last Visit"]);
    for (owner, category) in rows {
        let last = owner
            .last_appointment_date()
            .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
        t.add_row(vec![
            owner.name.clone(),
            category.to_string(),
            owner.appointment_count().to_string(),
            last,
        ]);
    }
    t
}

pub fn retention_buckets(buckets: &[RetentionBucket]) -> Table {
    let mut t = table(vec!["Category", "Owners"]);
    for b in buckets {
        t.add_row(vec![b.category.to_string(), b.count.to_string()]);
    }
    t
}

pub fn follow_ups(rows: &[FollowUpRow]) -> Table {
    let mut t = table(vec!["Owner", "Category", "Days Since Visit"]);
    for r in rows {
        t.add_row(vec![r.name.clone(), r.category.to_string(), r.days_since.to_string()]);
    }
    t
}

pub fn categories(rows: &[CategoryRevenue]) -> Table {
    let mut t = table(vec!["Category", "Revenue"]);
    for r in rows {
        t.add_row(vec![r.category.to_string(), money(r.total)]);
    }
    t
}

pub fn daily(rows: &[DailyRevenue]) -> Table {
    let mut t = table(vec!["Day", "Revenue"]);
    for r in rows {
        t.add_row(vec![r.day.to_string(), money(r.total)]);
    }
    t
}

pub fn monthly(rows: &[MonthlyRevenue]) -> Table {
    let mut t = table(vec!["Month", "Revenue"]);
    for r in rows {
        t.add_row(vec![r.month_start.format("%Y-%m").to_string(), money(r.total)]);
    }
    t
}

pub fn top_owners(rows: &[OwnerTotalRow]) -> Table {
    let mut t = table(vec!["#", "Owner", "Revenue"]);
    for (rank, r) in rows.iter().enumerate() {
        t.add_row(vec![(rank + 1).to_string(), r.name.clone(), money(r.total)]);
    }
    t
}

pub fn schedule(owner: &str, appointments: &[&AppointmentRecord]) -> Table {
    let mut t = table(vec!["#", "Owner", "Date"]);
    for (i, a) in appointments.iter().enumerate() {
        t.add_row(vec![
            (i + 1).to_string(),
            owner.to_string(),
            a.date.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    t
}

pub fn goal_line(goal: &GoalProgress) -> String {
    format!(
        "Monthly goal: {} of {} ({})",
        money(goal.total),
        money(goal.goal),
        percent(goal.progress)
    )
}

pub fn growth_line(days: i64, growth_pct: Decimal) -> String {
    format!("Growth, last {days} days vs previous {days}: {}%", growth_pct.round_dp(1))
}

/// Prints the complete dashboard to stdout.
pub fn print_report(report: &DashboardReport) {
    println!(
        "--- Furfolio dashboard at {} ({} owners) ---",
        report.generated_at.format("%Y-%m-%d %H:%M UTC"),
        report.owner_count
    );
    println!("\nRetention\n{}", retention_buckets(&report.retention));
    if !report.follow_ups.is_empty() {
        println!("\nNeeds follow-up\n{}", follow_ups(&report.follow_ups));
    }

    let revenue = &report.revenue;
    println!("\nTotal revenue: {}", money(revenue.total));
    if let Some(avg) = revenue.average_transaction {
        println!("Average transaction: {}", money(avg));
    }
    println!("{}", goal_line(&revenue.goal));
    println!("{}", growth_line(revenue.growth_window_days, revenue.growth_pct));
    println!("\nBy category\n{}", categories(&revenue.by_category));
    println!("\nDaily\n{}", daily(&revenue.daily));
    println!("\nMonthly\n{}", monthly(&revenue.monthly));
    println!("\nTop owners\n{}", top_owners(&report.top_owners));
}
