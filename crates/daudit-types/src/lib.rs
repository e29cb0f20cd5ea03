//! # daudit-types
//!
//! Shared types, errors, and configuration for the **DAudit** escrow engine.
//!
//! This crate is the leaf dependency of the workspace. Every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`ItemId`], [`TokenId`], [`ReceiptId`]
//! - **Amounts**: [`Amount`] and the integral-value checks in [`amount`]
//! - **Audit item model**: [`AuditItem`], [`AuditItemStatus`], [`AssetRef`]
//! - **Enrollment model**: [`EnrollmentRecord`]
//! - **Assignment model**: [`AssignmentRecord`], [`AuditorSlot`], [`AuditOutcome`]
//! - **Receipts**: [`PayoutReceipt`], [`PayoutKind`], [`SettlementReport`]
//! - **Configuration**: [`CoordinatorConfig`], [`OutcomePolicy`]
//! - **Errors**: [`DauditError`] with `DA_ERR_` prefix codes, [`ErrorKind`]
//! - **Constants**: system-wide limits and defaults

pub mod amount;
pub mod assignment;
pub mod config;
pub mod constants;
pub mod enrollment;
pub mod error;
pub mod ids;
pub mod item;
pub mod receipt;

// Re-export all primary types at crate root for ergonomic imports:
//   use daudit_types::{AuditItem, Address, ItemId, ...};

pub use amount::*;
pub use assignment::*;
pub use config::*;
pub use enrollment::*;
pub use error::*;
pub use ids::*;
pub use item::*;
pub use receipt::*;

// Constants are accessed via `daudit_types::constants::FOO`
// (not re-exported to avoid name collisions).
