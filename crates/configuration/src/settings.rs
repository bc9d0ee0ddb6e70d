use core_types::TransactionCategory;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section is optional in the file; missing sections fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub retention: RetentionSettings,
    pub revenue: RevenueSettings,
    pub logging: LoggingSettings,
}

/// Day thresholds for retention classification.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetentionSettings {
    /// A single-visit owner seen within this many days is still a new client.
    pub new_client_window_days: i64,
    pub active_window_days: i64,
    /// Beyond this many days without a visit an owner is at risk.
    pub retention_risk_window_days: i64,
    /// Beyond this many days an owner is considered lost.
    pub inactive_window_days: i64,
}

/// Parameters for the revenue dashboard.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RevenueSettings {
    /// Categories left out of every revenue figure (e.g. refunds).
    pub excluded_categories: Vec<TransactionCategory>,
    /// Offset of the business's calendar from UTC. Defines day and month boundaries.
    pub utc_offset_minutes: i32,
    pub monthly_goal: Decimal,
    /// Length of the daily revenue series.
    pub daily_window_days: i64,
    /// Length of each window compared by the growth figure.
    pub growth_window_days: i64,
    /// Number of months in the monthly revenue series.
    pub monthly_window_months: i64,
    pub top_owner_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs go to a daily rolling file in this directory instead of stderr.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

// --- Default Implementations ---
// These allow a user to omit any section from their toml and still have it
// work with the standard dashboard settings.

impl Default for RetentionSettings {
    fn default() -> Self {
        Self {
            new_client_window_days: 14,
            active_window_days: 30,
            retention_risk_window_days: 60,
            inactive_window_days: 180,
        }
    }
}

impl Default for RevenueSettings {
    fn default() -> Self {
        Self {
            excluded_categories: vec![TransactionCategory::Refund],
            utc_offset_minutes: 0,
            monthly_goal: dec!(5000),
            daily_window_days: 7,
            growth_window_days: 30,
            monthly_window_months: 6,
            top_owner_count: 5,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "furfolio.log".to_string(),
        }
    }
}

impl Config {
    /// Rejects settings the analytics engine would refuse at call time, so a
    /// bad file fails at startup instead of halfway through a report.
    pub fn validate(&self) -> Result<(), String> {
        let r = &self.retention;
        if r.new_client_window_days <= 0 {
            return Err("retention.new_client_window_days must be at least 1".to_string());
        }
        if !(r.new_client_window_days <= r.active_window_days
            && r.active_window_days <= r.retention_risk_window_days
            && r.retention_risk_window_days <= r.inactive_window_days)
        {
            return Err(
                "retention windows must satisfy new_client <= active <= retention_risk <= inactive"
                    .to_string(),
            );
        }

        let v = &self.revenue;
        // chrono accepts offsets strictly inside one day.
        if v.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(format!(
                "revenue.utc_offset_minutes must be within +/-1439, got {}",
                v.utc_offset_minutes
            ));
        }
        if v.monthly_goal <= Decimal::ZERO {
            return Err("revenue.monthly_goal must be greater than zero".to_string());
        }
        for (name, value) in [
            ("daily_window_days", v.daily_window_days),
            ("growth_window_days", v.growth_window_days),
            ("monthly_window_months", v.monthly_window_months),
        ] {
            if value < 1 {
                return Err(format!("revenue.{name} must be at least 1, got {value}"));
            }
        }
        if v.top_owner_count < 0 {
            return Err("revenue.top_owner_count cannot be negative".to_string());
        }
        Ok(())
    }
}
