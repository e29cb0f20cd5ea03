//! # daudit-registry
//!
//! **Registry plane**: the two append-only arenas the coordinator reads and
//! advances.
//!
//! ## Architecture
//!
//! 1. **EnrollmentRegistry**: per item, the ordered candidate pool of
//!    auditors who volunteered. Permissionless: guarded only by data
//!    invariants (no duplicates, record exists, not yet locked).
//! 2. **AssignmentRegistry**: per item, the selected auditors with their fee
//!    shares, paid flags and submitted results. Written exactly once by the
//!    coordinator, then advanced slot by slot.
//!
//! ```text
//! auditors → EnrollmentRegistry.insert/update/add
//!          → Coordinator.assign_auditors  (snapshot + lock enrollment)
//!          → AssignmentRegistry.insert → record_result → settle_unpaid
//! ```
//!
//! Records are never removed. Each record carries its index into the
//! global list so readers can page through `fetch_*` in insertion order.

pub mod assignment;
pub mod enrollment;
pub mod roster;

pub use assignment::AssignmentRegistry;
pub use enrollment::EnrollmentRegistry;
pub use roster::validate_roster;
