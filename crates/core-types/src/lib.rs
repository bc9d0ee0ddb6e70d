//! # Furfolio Core Types
//!
//! The plain data model shared by every other crate in the workspace: owners,
//! their appointments and transactions, and the closed category enums.
//!
//! As a Layer 0 crate it has no knowledge of how records are stored or
//! rendered. A persistence collaborator supplies these values; the analytics
//! layer derives everything else from them on demand.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{RetentionCategory, TransactionCategory};
pub use error::CoreError;
pub use structs::{AppointmentRecord, Owner, Transaction};
