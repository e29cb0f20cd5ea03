//! # daudit-selection
//!
//! **Pure deterministic decisions for DAudit.**
//!
//! This crate takes snapshots of registry state and returns decisions. It has:
//!
//! - **Zero side effects**: no registry writes, no value movement
//! - **Deterministic output**: the same enrollment snapshot always yields the
//!   same assignment and the same selection root
//! - **No randomness, no weighting**: earliest enrolled auditors win
//!
//! The coordinator calls [`plan_assignment`] at assignment time and
//! [`aggregate_outcome`] at settlement time.

pub mod determinism;
pub mod selection;
pub mod verdict;

pub use determinism::{compute_selection_root, verify_selection_root};
pub use selection::{AssignmentPlan, plan_assignment};
pub use verdict::{VoteTally, aggregate_outcome};
