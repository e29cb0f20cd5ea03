//! Assignment registry: the selected auditors per audit item.
//!
//! A record is written exactly once by the coordinator when it assigns an
//! item. After that only two things advance it: auditors' results
//! (`record_result`, exactly once per slot) and settlement (`settle_unpaid`,
//! which flips each unpaid slot to paid exactly once). The replace/append
//! operations exist for administrative correction and are refused as soon
//! as any share has been paid.

use std::collections::{HashMap, HashSet};

use daudit_types::{
    Address, Amount, AssignmentRecord, AuditResult, AuditorSlot, DauditError, ItemId, Result,
    TokenId,
};

use crate::roster::{ensure_participant, validate_roster};

const ENTITY: &str = "assignment";

/// Per-item assignment records with a global insertion index.
#[derive(Debug, Clone, Default)]
pub struct AssignmentRegistry {
    /// Records in creation order. Never removed.
    records: Vec<AssignmentRecord>,
    /// Item id → position in `records`.
    by_item: HashMap<ItemId, usize>,
    /// Result tokens already linked to a slot, across all items.
    linked_results: HashSet<TokenId>,
}

impl AssignmentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the assignment for an item. Every slot gets `fee_share`.
    ///
    /// # Errors
    /// - `AlreadyAssigned` if the item already has a record
    /// - roster validation errors (empty, duplicate, zero address)
    pub fn insert_audit_assignment(
        &mut self,
        item_id: ItemId,
        auditors: Vec<Address>,
        fee_share: Amount,
        selection_root: [u8; 32],
    ) -> Result<usize> {
        if self.by_item.contains_key(&item_id) {
            return Err(DauditError::AlreadyAssigned(item_id));
        }
        validate_roster(&auditors)?;

        let index = self.records.len();
        self.records.push(AssignmentRecord {
            index,
            item_id,
            slots: auditors
                .into_iter()
                .map(|a| AuditorSlot::new(a, fee_share))
                .collect(),
            selection_root,
        });
        self.by_item.insert(item_id, index);
        Ok(index)
    }

    /// Replace the assigned auditors.
    ///
    /// Auditors present in both the old and new list keep their submitted
    /// results. Every slot's share is reset to `fee_share`.
    ///
    /// # Errors
    /// - `NotFound` if the item has no record
    /// - `PaymentAlreadyIssued` once any share has been paid
    /// - roster validation errors
    pub fn update_auditors(
        &mut self,
        item_id: ItemId,
        auditors: Vec<Address>,
        fee_share: Amount,
    ) -> Result<()> {
        let idx = self.unpaid_position(item_id)?;
        validate_roster(&auditors)?;

        let record = &mut self.records[idx];
        let mut previous: HashMap<Address, AuditorSlot> = record
            .slots
            .drain(..)
            .map(|slot| (slot.auditor, slot))
            .collect();
        record.slots = auditors
            .into_iter()
            .map(|auditor| {
                let mut slot = previous
                    .remove(&auditor)
                    .unwrap_or_else(|| AuditorSlot::new(auditor, fee_share));
                slot.fee_share = fee_share;
                slot
            })
            .collect();
        Ok(())
    }

    /// Append one auditor. Every slot's share is reset to `fee_share`.
    ///
    /// # Errors
    /// - `NotFound` if the item has no record
    /// - `PaymentAlreadyIssued` once any share has been paid
    /// - `DuplicateAuditor` if the auditor is already assigned
    pub fn add_auditor(
        &mut self,
        item_id: ItemId,
        auditor: Address,
        fee_share: Amount,
    ) -> Result<()> {
        let idx = self.unpaid_position(item_id)?;
        ensure_participant(&auditor)?;

        let record = &mut self.records[idx];
        if record.is_assigned(&auditor) {
            return Err(DauditError::DuplicateAuditor(auditor));
        }
        record.slots.push(AuditorSlot::new(auditor, fee_share));
        for slot in &mut record.slots {
            slot.fee_share = fee_share;
        }
        Ok(())
    }

    /// Attach an auditor's result to their slot. Exactly once per slot.
    ///
    /// # Errors
    /// - `NotFound` if the item has no record
    /// - `NotAssigned` if `auditor` holds no slot
    /// - `DuplicateSubmission` if the slot already has a result
    /// - `ResultTokenReused` if the token is linked to any other slot
    pub fn record_result(
        &mut self,
        item_id: ItemId,
        auditor: Address,
        result: AuditResult,
    ) -> Result<()> {
        let idx = self.position(item_id)?;
        let record = &mut self.records[idx];
        let slot = record
            .slots
            .iter_mut()
            .find(|s| s.auditor == auditor)
            .ok_or(DauditError::NotAssigned {
                item: item_id,
                auditor,
            })?;
        if slot.has_submitted() {
            return Err(DauditError::DuplicateSubmission {
                item: item_id,
                auditor,
            });
        }
        if self.linked_results.contains(&result.token_id) {
            return Err(DauditError::ResultTokenReused(result.token_id));
        }

        slot.result = Some(result);
        self.linked_results.insert(result.token_id);
        Ok(())
    }

    /// Flip every unpaid slot to paid and return what each is owed.
    ///
    /// Slots already paid are skipped, so a second call returns an empty
    /// list.
    ///
    /// # Errors
    /// Returns `NotFound` if the item has no record.
    pub fn settle_unpaid(&mut self, item_id: ItemId) -> Result<Vec<(Address, Amount)>> {
        let idx = self.position(item_id)?;
        let owed = self.records[idx]
            .slots
            .iter_mut()
            .filter(|s| !s.paid)
            .map(|slot| {
                slot.paid = true;
                (slot.auditor, slot.fee_share)
            })
            .collect();
        Ok(owed)
    }

    /// # Errors
    /// Returns `NotFound` if the item has no record.
    pub fn get_audit_assignment(&self, item_id: ItemId) -> Result<&AssignmentRecord> {
        self.position(item_id).map(|idx| &self.records[idx])
    }

    #[must_use]
    pub fn get(&self, item_id: ItemId) -> Option<&AssignmentRecord> {
        self.by_item.get(&item_id).map(|&idx| &self.records[idx])
    }

    #[must_use]
    pub fn is_audit_assigned(&self, item_id: ItemId) -> bool {
        self.by_item.contains_key(&item_id)
    }

    #[must_use]
    pub fn is_result_token_linked(&self, token_id: TokenId) -> bool {
        self.linked_results.contains(&token_id)
    }

    /// All records in index order.
    pub fn fetch_audit_assignments(&self) -> impl Iterator<Item = &AssignmentRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, item_id: ItemId) -> Result<usize> {
        self.by_item
            .get(&item_id)
            .copied()
            .ok_or(DauditError::NotFound {
                entity: ENTITY,
                item: item_id,
            })
    }

    fn unpaid_position(&self, item_id: ItemId) -> Result<usize> {
        let idx = self.position(item_id)?;
        if self.records[idx].any_paid() {
            return Err(DauditError::PaymentAlreadyIssued(item_id));
        }
        Ok(idx)
    }
}
