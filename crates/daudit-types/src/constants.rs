//! System-wide constants for the DAudit escrow engine.

/// Default listing fee in native base units (0.025 of a 10^18-unit coin).
pub const DEFAULT_LISTING_FEE: i64 = 25_000_000_000_000_000;

/// Upper bound on the number of auditors a single item may require.
pub const MAX_AUDITORS_PER_ITEM: u32 = 64;

/// Upper bound on the number of candidates in one enrollment record.
pub const MAX_ENROLLMENT_CANDIDATES: usize = 1024;

/// First token id issued by an asset registry.
pub const FIRST_TOKEN_ID: u64 = 1;

/// Outcome code submitted by an auditor for a passing audit.
pub const OUTCOME_CODE_PASSED: u8 = 0;

/// Outcome code submitted by an auditor for a failing audit.
pub const OUTCOME_CODE_FAILED: u8 = 1;

/// Domain separator for selection-root digests.
pub const SELECTION_ROOT_DOMAIN: &[u8] = b"daudit:selection_root:v1:";

/// Domain separator for ed25519-derived addresses.
pub const ADDRESS_DERIVATION_DOMAIN: &[u8] = b"daudit:address:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "DAudit";
