use crate::enums::TransactionCategory;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A monetary charge or credit recorded against an owner.
///
/// Amounts may be zero or negative (refunds). Records are immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub amount: Decimal,
    pub category: TransactionCategory,
    pub owner_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Transaction {
    pub fn new(
        owner_id: Uuid,
        date: DateTime<Utc>,
        amount: Decimal,
        category: TransactionCategory,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            amount,
            category,
            owner_id,
            notes: None,
        }
    }
}

/// The minimal shape of an appointment needed by retention classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub owner_id: Uuid,
}

impl AppointmentRecord {
    pub fn new(owner_id: Uuid, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            owner_id,
        }
    }
}

/// A client of the grooming business together with their history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub appointments: Vec<AppointmentRecord>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Owner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            appointments: Vec::new(),
            transactions: Vec::new(),
        }
    }

    /// Records an appointment at `date` and returns `self` for chaining.
    pub fn with_appointment(mut self, date: DateTime<Utc>) -> Self {
        self.appointments.push(AppointmentRecord::new(self.id, date));
        self
    }

    /// Records a transaction and returns `self` for chaining.
    pub fn with_transaction(
        mut self,
        date: DateTime<Utc>,
        amount: Decimal,
        category: TransactionCategory,
    ) -> Self {
        self.transactions
            .push(Transaction::new(self.id, date, amount, category));
        self
    }

    /// The date of the most recent appointment, regardless of storage order.
    pub fn last_appointment_date(&self) -> Option<DateTime<Utc>> {
        self.appointments.iter().map(|a| a.date).max()
    }

    pub fn appointment_count(&self) -> usize {
        self.appointments.len()
    }
}
