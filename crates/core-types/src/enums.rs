use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of money movement a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionCategory {
    Service,
    Product,
    Tip,
    Package,
    Refund,
    Other,
}

impl TransactionCategory {
    pub const ALL: [TransactionCategory; 6] = [
        TransactionCategory::Service,
        TransactionCategory::Product,
        TransactionCategory::Tip,
        TransactionCategory::Package,
        TransactionCategory::Refund,
        TransactionCategory::Other,
    ];

    /// The human-readable name. Also the key for deterministic tie-breaks.
    pub fn display_name(&self) -> &'static str {
        match self {
            TransactionCategory::Service => "Service",
            TransactionCategory::Product => "Product",
            TransactionCategory::Tip => "Tip",
            TransactionCategory::Package => "Package",
            TransactionCategory::Refund => "Refund",
            TransactionCategory::Other => "Other",
        }
    }
}

impl fmt::Display for TransactionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for TransactionCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionCategory::ALL
            .into_iter()
            .find(|c| c.display_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }
}

/// How recently and frequently an owner has engaged with the business.
///
/// Exactly one category applies to an owner at a given evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionCategory {
    NewClient,
    Active,
    Returning,
    RetentionRisk,
    Inactive,
}

impl RetentionCategory {
    pub const ALL: [RetentionCategory; 5] = [
        RetentionCategory::NewClient,
        RetentionCategory::Active,
        RetentionCategory::Returning,
        RetentionCategory::RetentionRisk,
        RetentionCategory::Inactive,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            RetentionCategory::NewClient => "New Client",
            RetentionCategory::Active => "Active",
            RetentionCategory::Returning => "Returning",
            RetentionCategory::RetentionRisk => "Retention Risk",
            RetentionCategory::Inactive => "Inactive",
        }
    }

    /// Whether owners in this bucket should be contacted.
    pub fn needs_follow_up(&self) -> bool {
        matches!(self, RetentionCategory::RetentionRisk | RetentionCategory::Inactive)
    }
}

impl fmt::Display for RetentionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for RetentionCategory {
    type Err = CoreError;

    /// Accepts the display name or the snake_case form ("retention_risk").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['_', '-'], " ");
        RetentionCategory::ALL
            .into_iter()
            .find(|c| c.display_name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }
}
