//! Assignment records: the auditors chosen for an item, their fee shares,
//! payment status and submitted outcomes.

use serde::{Deserialize, Serialize};

use crate::{Address, Amount, DauditError, ItemId, Result, TokenId, constants};

/// Verdict reported by a single auditor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditOutcome {
    Passed,
    Failed,
}

impl AuditOutcome {
    /// Decode the wire outcome code (0 = passed, 1 = failed).
    ///
    /// # Errors
    /// Returns `InvalidOutcomeCode` for any other value.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            constants::OUTCOME_CODE_PASSED => Ok(Self::Passed),
            constants::OUTCOME_CODE_FAILED => Ok(Self::Failed),
            other => Err(DauditError::InvalidOutcomeCode(other)),
        }
    }

    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            Self::Passed => constants::OUTCOME_CODE_PASSED,
            Self::Failed => constants::OUTCOME_CODE_FAILED,
        }
    }
}

impl std::fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "PASSED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// A submitted finding: the result token and the verdict it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    pub token_id: TokenId,
    pub outcome: AuditOutcome,
}

/// One assigned auditor's position in an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditorSlot {
    pub auditor: Address,
    pub fee_share: Amount,
    pub paid: bool,
    /// `None` until the auditor submits.
    pub result: Option<AuditResult>,
}

impl AuditorSlot {
    #[must_use]
    pub fn new(auditor: Address, fee_share: Amount) -> Self {
        Self {
            auditor,
            fee_share,
            paid: false,
            result: None,
        }
    }

    #[must_use]
    pub fn has_submitted(&self) -> bool {
        self.result.is_some()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<AuditOutcome> {
        self.result.map(|r| r.outcome)
    }
}

/// The finalized subset of auditors chosen for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    /// Position in the global assignment list.
    pub index: usize,
    pub item_id: ItemId,
    /// Slots in selection order.
    pub slots: Vec<AuditorSlot>,
    /// SHA-256 commitment to the selected set, for after-the-fact audit.
    pub selection_root: [u8; 32],
}

impl AssignmentRecord {
    #[must_use]
    pub fn slot(&self, auditor: &Address) -> Option<&AuditorSlot> {
        self.slots.iter().find(|s| s.auditor == *auditor)
    }

    #[must_use]
    pub fn auditors(&self) -> Vec<Address> {
        self.slots.iter().map(|s| s.auditor).collect()
    }

    #[must_use]
    pub fn fees(&self) -> Vec<Amount> {
        self.slots.iter().map(|s| s.fee_share).collect()
    }

    #[must_use]
    pub fn paid(&self) -> Vec<bool> {
        self.slots.iter().map(|s| s.paid).collect()
    }

    #[must_use]
    pub fn outcomes(&self) -> Vec<Option<AuditOutcome>> {
        self.slots.iter().map(AuditorSlot::outcome).collect()
    }

    #[must_use]
    pub fn result_tokens(&self) -> Vec<Option<TokenId>> {
        self.slots
            .iter()
            .map(|s| s.result.map(|r| r.token_id))
            .collect()
    }

    #[must_use]
    pub fn is_assigned(&self, auditor: &Address) -> bool {
        self.slot(auditor).is_some()
    }

    /// Whether any share has been paid.
    #[must_use]
    pub fn any_paid(&self) -> bool {
        self.slots.iter().any(|s| s.paid)
    }

    #[must_use]
    pub fn all_paid(&self) -> bool {
        self.slots.iter().all(|s| s.paid)
    }

    /// Sum of all fee shares, paid or not.
    #[must_use]
    pub fn total_shares(&self) -> Amount {
        self.slots.iter().map(|s| s.fee_share).sum()
    }

    #[must_use]
    pub fn selection_root_hex(&self) -> String {
        hex::encode(self.selection_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn record() -> AssignmentRecord {
        AssignmentRecord {
            index: 0,
            item_id: ItemId(1),
            slots: vec![
                AuditorSlot::new(Address::repeat_byte(1), Decimal::new(50, 0)),
                AuditorSlot::new(Address::repeat_byte(2), Decimal::new(50, 0)),
            ],
            selection_root: [0u8; 32],
        }
    }

    #[test]
    fn outcome_codes() {
        assert_eq!(AuditOutcome::from_code(0).unwrap(), AuditOutcome::Passed);
        assert_eq!(AuditOutcome::from_code(1).unwrap(), AuditOutcome::Failed);
        assert!(matches!(
            AuditOutcome::from_code(2),
            Err(DauditError::InvalidOutcomeCode(2))
        ));
        assert_eq!(AuditOutcome::Failed.code(), 1);
    }

    #[test]
    fn parallel_views_line_up() {
        let mut rec = record();
        rec.slots[1].paid = true;
        rec.slots[0].result = Some(AuditResult {
            token_id: TokenId(9),
            outcome: AuditOutcome::Passed,
        });
        assert_eq!(
            rec.auditors(),
            vec![Address::repeat_byte(1), Address::repeat_byte(2)]
        );
        assert_eq!(rec.paid(), vec![false, true]);
        assert_eq!(rec.outcomes(), vec![Some(AuditOutcome::Passed), None]);
        assert_eq!(rec.result_tokens(), vec![Some(TokenId(9)), None]);
        assert!(rec.any_paid());
        assert!(!rec.all_paid());
    }

    #[test]
    fn total_shares_sums_slots() {
        assert_eq!(record().total_shares(), Decimal::new(100, 0));
    }

    #[test]
    fn slot_lookup() {
        let rec = record();
        assert!(rec.is_assigned(&Address::repeat_byte(2)));
        assert!(!rec.is_assigned(&Address::repeat_byte(3)));
    }
}
