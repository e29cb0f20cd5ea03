//! First-N-by-enrollment-order auditor selection.
//!
//! Given an item and a snapshot of its enrollment, the plan is:
//! 1. Require at least `required_auditors` candidates
//! 2. Take the first `required_auditors` candidates, in enrollment order
//! 3. Split the audit fee evenly, rounding each share down
//! 4. Commit to the selection with a selection root
//!
//! The remainder of the split stays in escrow and is never distributed.

use daudit_types::{
    Address, Amount, AuditItem, DauditError, EnrollmentRecord, ItemId, Result, amount,
};

use crate::determinism::compute_selection_root;

/// The assignment the coordinator should write for an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentPlan {
    pub item_id: ItemId,
    /// Selected auditors in enrollment order.
    pub auditors: Vec<Address>,
    /// Share owed to each selected auditor.
    pub fee_share: Amount,
    /// `audit_fee - fee_share * auditors.len()`. Retained, never paid.
    pub remainder: Amount,
    pub selection_root: [u8; 32],
}

impl AssignmentPlan {
    /// Total that settlement will pay out.
    #[must_use]
    pub fn distributable(&self) -> Amount {
        self.fee_share * Amount::from(self.auditors.len() as u64)
    }
}

/// Build the assignment plan for `item` from its enrollment snapshot.
///
/// # Errors
/// Returns `InsufficientEnrollment` if fewer candidates are enrolled than the
/// item requires.
pub fn plan_assignment(item: &AuditItem, enrollment: &EnrollmentRecord) -> Result<AssignmentPlan> {
    let required = item.required_auditors;
    let needed = required as usize;
    if enrollment.auditors.len() < needed {
        return Err(DauditError::InsufficientEnrollment {
            item: item.id,
            required,
            enrolled: enrollment.auditors.len(),
        });
    }

    let auditors: Vec<Address> = enrollment.auditors[..needed].to_vec();
    let (fee_share, remainder) = amount::split_even(item.audit_fee, required);
    let selection_root = compute_selection_root(item.id, required, &auditors);

    tracing::debug!(
        item = %item.id,
        selected = auditors.len(),
        enrolled = enrollment.auditors.len(),
        share = %fee_share,
        remainder = %remainder,
        root = hex::encode(selection_root),
        "Assignment planned"
    );

    Ok(AssignmentPlan {
        item_id: item.id,
        auditors,
        fee_share,
        remainder,
        selection_root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify_selection_root;
    use rust_decimal::Decimal;

    fn enrollment(item: ItemId, bytes: &[u8]) -> EnrollmentRecord {
        EnrollmentRecord {
            index: 0,
            item_id: item,
            auditors: bytes.iter().map(|&b| Address::repeat_byte(b)).collect(),
            locked: false,
        }
    }

    #[test]
    fn selects_first_n_in_order() {
        let item = AuditItem::dummy(ItemId(1), Decimal::new(100, 0), 2);
        let plan = plan_assignment(&item, &enrollment(item.id, &[0xa, 0xb, 0xc])).unwrap();
        assert_eq!(
            plan.auditors,
            vec![Address::repeat_byte(0xa), Address::repeat_byte(0xb)]
        );
        assert_eq!(plan.fee_share, Decimal::new(50, 0));
        assert_eq!(plan.remainder, Decimal::ZERO);
        assert_eq!(plan.distributable(), Decimal::new(100, 0));
    }

    #[test]
    fn exact_enrollment_is_enough() {
        let item = AuditItem::dummy(ItemId(1), Decimal::new(90, 0), 3);
        let plan = plan_assignment(&item, &enrollment(item.id, &[1, 2, 3])).unwrap();
        assert_eq!(plan.auditors.len(), 3);
        assert_eq!(plan.fee_share, Decimal::new(30, 0));
    }

    #[test]
    fn insufficient_enrollment() {
        let item = AuditItem::dummy(ItemId(4), Decimal::new(100, 0), 3);
        let err = plan_assignment(&item, &enrollment(item.id, &[1, 2])).unwrap_err();
        assert_eq!(
            err,
            DauditError::InsufficientEnrollment {
                item: ItemId(4),
                required: 3,
                enrolled: 2,
            }
        );
    }

    #[test]
    fn remainder_is_retained() {
        let item = AuditItem::dummy(ItemId(1), Decimal::new(100, 0), 3);
        let plan = plan_assignment(&item, &enrollment(item.id, &[1, 2, 3, 4])).unwrap();
        assert_eq!(plan.fee_share, Decimal::new(33, 0));
        assert_eq!(plan.remainder, Decimal::ONE);
        assert!(plan.distributable() <= item.audit_fee);
    }

    #[test]
    fn plan_root_verifies() {
        let item = AuditItem::dummy(ItemId(8), Decimal::new(10, 0), 2);
        let plan = plan_assignment(&item, &enrollment(item.id, &[5, 6, 7])).unwrap();
        assert!(verify_selection_root(
            item.id,
            item.required_auditors,
            &plan.auditors,
            &plan.selection_root
        ));
    }

    #[test]
    fn same_snapshot_same_plan() {
        let item = AuditItem::dummy(ItemId(3), Decimal::new(77, 0), 2);
        let snap = enrollment(item.id, &[9, 8, 7]);
        assert_eq!(
            plan_assignment(&item, &snap).unwrap(),
            plan_assignment(&item, &snap).unwrap()
        );
    }

    #[test]
    fn randomized_shares_never_exceed_fee() {
        for _ in 0..200 {
            let fee = Decimal::from(rand::random::<u32>());
            let required = rand::random::<u32>() % 16 + 1;
            let item = AuditItem::dummy(ItemId(1), fee, required);
            let candidates: Vec<u8> = (1..=16).collect();
            let plan = plan_assignment(&item, &enrollment(item.id, &candidates)).unwrap();
            assert!(plan.distributable() <= fee);
            assert_eq!(plan.distributable() + plan.remainder, fee);
            assert!(plan.remainder < Decimal::from(required));
        }
    }
}
