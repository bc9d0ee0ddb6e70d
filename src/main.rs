use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use configuration::{load_config, load_config_from};
use core_types::RetentionCategory;
use dashboard::{Dashboard, FollowUpRow, OwnerTotalRow, all_transactions};
use std::path::PathBuf;
use uuid::Uuid;

mod dataset;
mod render;

/// The main entry point for the Furfolio analytics command line.
fn main() -> Result<()> {
    // Load FURFOLIO__* overrides from a .env file if one exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .context("Failed to load configuration")?;
    let _log_guard = configuration::init_logging(&config.logging)?;

    let dataset = dataset::load(&cli.data)?;
    let dashboard = Dashboard::from_config(&config)?;
    let now = cli.now.unwrap_or_else(Utc::now);
    let owners = &dataset.owners;

    // Execute the appropriate command
    match cli.command {
        Commands::Retention(args) => {
            let rows: Vec<_> = match args.category {
                Some(category) => dashboard
                    .owners_in(owners, category, now)?
                    .into_iter()
                    .map(|owner| (owner, category))
                    .collect(),
                None => dashboard.classify_owners(owners, now)?,
            };
            println!("{}", render::classified_owners(&rows));
            println!("{}", render::retention_buckets(&dashboard.retention_stats(owners, now)?));
        }
        Commands::FollowUp => {
            let rows: Vec<FollowUpRow> = dashboard
                .follow_ups(owners, now)?
                .iter()
                .map(FollowUpRow::from)
                .collect();
            if rows.is_empty() {
                println!("No owners need a follow-up.");
            } else {
                println!("{}", render::follow_ups(&rows));
            }
        }
        Commands::Revenue(args) => handle_revenue(&dashboard, owners, args, now)?,
        Commands::Top(args) => {
            let count = args.count.unwrap_or(dashboard.settings().top_owner_count);
            let rows: Vec<OwnerTotalRow> = dashboard
                .top_owners(owners, count)?
                .iter()
                .map(OwnerTotalRow::from)
                .collect();
            println!("{}", render::top_owners(&rows));
        }
        Commands::Schedule(args) => {
            let appointments = dashboard.schedule(owners, args.owner)?;
            let name = owners
                .iter()
                .find(|o| o.id == args.owner)
                .map_or("", |o| o.name.as_str());
            println!("{}", render::schedule(name, &appointments));
        }
        Commands::Report(args) => {
            let report = dashboard.build_report(owners, now)?;
            if args.json {
                println!("{}", report.to_json_pretty()?);
            } else {
                render::print_report(&report);
            }
        }
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Retention and revenue analytics for a grooming business.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the JSON owner dataset.
    #[arg(long, global = true, default_value = "owners.json")]
    data: PathBuf,

    /// Evaluate as of this instant (RFC 3339) instead of the current time.
    #[arg(long, global = true)]
    now: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every owner into a retention category.
    Retention(RetentionArgs),
    /// List owners at risk or inactive, longest absence first.
    FollowUp,
    /// Revenue totals, breakdowns, goal progress and growth.
    Revenue(RevenueArgs),
    /// Rank owners by revenue.
    Top(TopArgs),
    /// Show an owner's appointments in date order.
    Schedule(ScheduleArgs),
    /// Print the full dashboard.
    Report(ReportArgs),
}

#[derive(Parser)]
struct RetentionArgs {
    /// Only show owners in this category (e.g. "retention_risk").
    #[arg(long)]
    category: Option<RetentionCategory>,
}

#[derive(Parser)]
struct RevenueArgs {
    /// First day to include (format: YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day to include (format: YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(Parser)]
struct TopArgs {
    /// How many owners to list. Defaults to `revenue.top_owner_count`.
    #[arg(long, short)]
    count: Option<i64>,
}

#[derive(Parser)]
struct ScheduleArgs {
    #[arg(long)]
    owner: Uuid,
}

#[derive(Parser)]
struct ReportArgs {
    /// Emit the report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Revenue Command Logic
// ==============================================================================

fn handle_revenue(
    dashboard: &Dashboard,
    owners: &[core_types::Owner],
    args: RevenueArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let calendar = dashboard.calendar();
    let settings = dashboard.settings();
    let transactions = all_transactions(owners);

    // Dates are whole days in the business's calendar.
    let from = args.from.map(|d| calendar.start_of_day(d));
    let to = args
        .to
        .map(|d| d.succ_opt().map_or(DateTime::<Utc>::MAX_UTC, |next| {
            calendar.start_of_day(next) - chrono::TimeDelta::nanoseconds(1)
        }));

    let total = dashboard.total_revenue(&transactions, from, to)?;
    match (args.from, args.to) {
        (None, None) => println!("Total revenue: {:.2}", total),
        (f, t) => println!(
            "Revenue {} to {}: {:.2}",
            f.map_or_else(|| "start".to_string(), |d| d.to_string()),
            t.map_or_else(|| "today".to_string(), |d| d.to_string()),
            total
        ),
    }

    let goal = dashboard.goal_progress(&transactions, settings.monthly_goal, now)?;
    println!("{}", render::goal_line(&goal));
    let growth = dashboard.growth(&transactions, settings.growth_window_days, now)?;
    println!("{}", render::growth_line(settings.growth_window_days, growth));

    let by_category = dashboard.revenue_by_category(&transactions)?;
    println!("\nBy category\n{}", render::categories(&by_category));
    let daily = dashboard.daily_revenue(&transactions, settings.daily_window_days, now)?;
    println!("\nDaily\n{}", render::daily(&daily));
    let monthly = dashboard.monthly_revenue(&transactions, settings.monthly_window_months, now)?;
    println!("\nMonthly\n{}", render::monthly(&monthly));
    Ok(())
}
