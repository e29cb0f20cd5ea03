//! # daudit-coordinator
//!
//! **The audit coordinator: escrow, lifecycle and settlement.**
//!
//! A producer lists a document with a fee, auditors enroll, the first
//! enrolled candidates are assigned, they submit findings, and the
//! administrator settles. This crate holds:
//!
//! - [`AuditCoordinator`]: the item state machine over both registries
//! - [`FeeTreasury`]: listing fees, per-item escrow and the conservation check
//! - [`AssetRegistry`]: the interface to document and finding tokens
//! - [`NativeLedger`] and [`LedgerRuntime`]: a reference executor that gives
//!   every call an all-or-nothing commit
//!
//! ## Lifecycle
//!
//! ```text
//! create_audit_item ──▶ PENDING ──assign_auditors──▶ IN_PROGRESS
//!                          │                            │
//!                          │ cancel_audit_item          │ pay_auditors
//!                          ▼                            ▼
//!                      CANCELLED                 PASSED | FAILED
//! ```

pub mod asset;
pub mod coordinator;
pub mod ledger;
pub mod runtime;
pub mod treasury;

pub use asset::{AssetRegistry, InMemoryAssetRegistry, ensure_token_owner};
pub use coordinator::AuditCoordinator;
pub use ledger::{CallContext, NativeLedger};
pub use runtime::{Call, CallOutcome, LedgerRuntime};
pub use treasury::{FeeTreasury, TreasurySnapshot};
