//! Selection roots for after-the-fact verification.
//!
//! Every assignment carries a SHA-256 digest committing to the item, the
//! required count and the selected auditors in order. Anyone holding the
//! enrollment snapshot can recompute it and confirm that the first-N rule
//! was followed.

use daudit_types::{Address, ItemId, constants};
use sha2::{Digest, Sha256};

/// Compute the selection root for an assignment.
///
/// The same inputs in the same order always produce the same root.
#[must_use]
pub fn compute_selection_root(item_id: ItemId, required: u32, selected: &[Address]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(constants::SELECTION_ROOT_DOMAIN);
    hasher.update(item_id.0.to_le_bytes());
    hasher.update(required.to_le_bytes());
    hasher.update((selected.len() as u64).to_le_bytes());

    for auditor in selected {
        hasher.update(auditor.as_bytes());
    }

    let result = hasher.finalize();
    let mut root = [0u8; 32];
    root.copy_from_slice(&result);
    root
}

/// Recompute and compare against an expected root.
#[must_use]
pub fn verify_selection_root(
    item_id: ItemId,
    required: u32,
    selected: &[Address],
    expected_root: &[u8; 32],
) -> bool {
    compute_selection_root(item_id, required, selected) == *expected_root
}
