//! Validation shared by both registries for caller-supplied auditor lists.

use std::collections::HashSet;

use daudit_types::{Address, DauditError, Result, constants};

/// Check an auditor list before it touches any registry state.
///
/// # Errors
/// - `EmptyAuditorList` if the list is empty
/// - `TooManyAuditors` above [`constants::MAX_ENROLLMENT_CANDIDATES`]
/// - `InvalidAddress` if it contains the zero address
/// - `DuplicateAuditor` on the first repeated address
pub fn validate_roster(auditors: &[Address]) -> Result<()> {
    if auditors.is_empty() {
        return Err(DauditError::EmptyAuditorList);
    }
    if auditors.len() > constants::MAX_ENROLLMENT_CANDIDATES {
        return Err(DauditError::TooManyAuditors {
            count: auditors.len(),
            max: constants::MAX_ENROLLMENT_CANDIDATES,
        });
    }
    let mut seen = HashSet::with_capacity(auditors.len());
    for auditor in auditors {
        ensure_participant(auditor)?;
        if !seen.insert(*auditor) {
            return Err(DauditError::DuplicateAuditor(*auditor));
        }
    }
    Ok(())
}

/// Reject the zero address.
pub fn ensure_participant(auditor: &Address) -> Result<()> {
    if auditor.is_zero() {
        return Err(DauditError::InvalidAddress {
            reason: "zero address cannot audit".to_string(),
        });
    }
    Ok(())
}
