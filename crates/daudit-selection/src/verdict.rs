//! Folding individual auditor outcomes into an item's final status.

use daudit_types::{AuditItemStatus, AuditOutcome, OutcomePolicy};

/// Counts of submitted verdicts for one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub passed: usize,
    pub failed: usize,
    /// Assigned auditors who never submitted.
    pub missing: usize,
}

impl VoteTally {
    /// Tally a slot-ordered list of outcomes (`None` = not submitted).
    #[must_use]
    pub fn from_outcomes(outcomes: &[Option<AuditOutcome>]) -> Self {
        outcomes.iter().fold(Self::default(), |mut tally, o| {
            match o {
                Some(AuditOutcome::Passed) => tally.passed += 1,
                Some(AuditOutcome::Failed) => tally.failed += 1,
                None => tally.missing += 1,
            }
            tally
        })
    }

    #[must_use]
    pub fn submitted(&self) -> usize {
        self.passed + self.failed
    }
}

/// Decide Passed or Failed for a settled item.
///
/// - `NoFailures`: Passed iff at least one result and no Failed result
/// - `Majority`: Passed iff passed votes > failed votes
/// - `Unanimous`: Passed iff every slot submitted Passed
///
/// No submissions at all is always Failed.
#[must_use]
pub fn aggregate_outcome(
    policy: OutcomePolicy,
    outcomes: &[Option<AuditOutcome>],
) -> AuditItemStatus {
    let tally = VoteTally::from_outcomes(outcomes);
    let passed = match policy {
        OutcomePolicy::NoFailures => tally.submitted() > 0 && tally.failed == 0,
        OutcomePolicy::Majority => tally.passed > tally.failed,
        OutcomePolicy::Unanimous => {
            !outcomes.is_empty() && tally.missing == 0 && tally.failed == 0
        }
    };
    if passed {
        AuditItemStatus::Passed
    } else {
        AuditItemStatus::Failed
    }
}
