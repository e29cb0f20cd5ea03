//! Enrollment registry: the candidate pool of auditors per audit item.
//!
//! Anyone may enroll; the registry enforces only data invariants. Once the
//! coordinator assigns (or cancels) an item it locks the item here, after
//! which the candidate list is read-only.

use std::collections::{HashMap, HashSet};

use daudit_types::{Address, DauditError, EnrollmentRecord, ItemId, Result, constants};

use crate::roster::{ensure_participant, validate_roster};

const ENTITY: &str = "enrollment";

/// Per-item ordered candidate lists with a global insertion index.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentRegistry {
    /// Records in creation order. Never removed.
    records: Vec<EnrollmentRecord>,
    /// Item id → position in `records`.
    by_item: HashMap<ItemId, usize>,
    /// Items frozen by assignment or cancellation, with or without a record.
    locked: HashSet<ItemId>,
}

impl EnrollmentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the enrollment record for an item.
    ///
    /// # Errors
    /// - `EnrollmentExists` if the item already has a record
    /// - `AlreadyAssigned` if the item is locked
    /// - roster validation errors (empty, duplicate, zero address)
    pub fn insert_audit_enrollment(
        &mut self,
        item_id: ItemId,
        auditors: Vec<Address>,
    ) -> Result<usize> {
        self.ensure_unlocked(item_id)?;
        if self.by_item.contains_key(&item_id) {
            return Err(DauditError::EnrollmentExists(item_id));
        }
        validate_roster(&auditors)?;

        let index = self.push_record(item_id, auditors);
        tracing::debug!(
            item = %item_id,
            index,
            candidates = self.records[index].auditors.len(),
            "Enrollment created"
        );
        Ok(index)
    }

    /// Replace the whole candidate list of an item.
    ///
    /// # Errors
    /// - `NotFound` if the item has no record
    /// - `AlreadyAssigned` if the item is locked
    /// - roster validation errors
    pub fn update_auditors(&mut self, item_id: ItemId, auditors: Vec<Address>) -> Result<()> {
        self.ensure_unlocked(item_id)?;
        let idx = self.position(item_id)?;
        validate_roster(&auditors)?;

        let record = &mut self.records[idx];
        record.auditors = auditors;
        tracing::debug!(
            item = %item_id,
            candidates = record.auditors.len(),
            "Enrollment replaced"
        );
        Ok(())
    }

    /// Append a single candidate, creating the record if it does not exist.
    ///
    /// # Errors
    /// - `AlreadyAssigned` if the item is locked
    /// - `DuplicateAuditor` if the address is already enrolled
    /// - `TooManyAuditors` if the record is full
    /// - `InvalidAddress` for the zero address
    pub fn add_auditor(&mut self, item_id: ItemId, auditor: Address) -> Result<usize> {
        self.ensure_unlocked(item_id)?;
        ensure_participant(&auditor)?;

        let Some(idx) = self.by_item.get(&item_id).copied() else {
            let index = self.push_record(item_id, vec![auditor]);
            tracing::debug!(
                item = %item_id,
                %auditor,
                index,
                "Enrollment created by first candidate"
            );
            return Ok(index);
        };

        let record = &mut self.records[idx];
        if record.contains(&auditor) {
            return Err(DauditError::DuplicateAuditor(auditor));
        }
        if record.auditors.len() >= constants::MAX_ENROLLMENT_CANDIDATES {
            return Err(DauditError::TooManyAuditors {
                count: record.auditors.len() + 1,
                max: constants::MAX_ENROLLMENT_CANDIDATES,
            });
        }
        record.auditors.push(auditor);
        tracing::debug!(
            item = %item_id,
            %auditor,
            position = record.auditors.len(),
            "Candidate enrolled"
        );
        Ok(idx)
    }

    /// Freeze the candidate list of an item. Idempotent.
    ///
    /// Works whether or not a record exists, so a cancelled item that never
    /// had candidates cannot gain them later.
    pub fn lock(&mut self, item_id: ItemId) {
        self.locked.insert(item_id);
        if let Some(&idx) = self.by_item.get(&item_id) {
            self.records[idx].locked = true;
        }
    }

    /// # Errors
    /// Returns `NotFound` if the item has no record.
    pub fn get_audit_enrollment(&self, item_id: ItemId) -> Result<&EnrollmentRecord> {
        self.position(item_id).map(|idx| &self.records[idx])
    }

    #[must_use]
    pub fn get(&self, item_id: ItemId) -> Option<&EnrollmentRecord> {
        self.by_item.get(&item_id).map(|&idx| &self.records[idx])
    }

    #[must_use]
    pub fn is_audit_enrolled(&self, item_id: ItemId) -> bool {
        self.by_item.contains_key(&item_id)
    }

    #[must_use]
    pub fn is_locked(&self, item_id: ItemId) -> bool {
        self.locked.contains(&item_id)
    }

    /// All records in index order.
    pub fn fetch_audit_enrollments(&self) -> impl Iterator<Item = &EnrollmentRecord> {
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

    fn ensure_unlocked(&self, item_id: ItemId) -> Result<()> {
        if self.locked.contains(&item_id) {
            return Err(DauditError::AlreadyAssigned(item_id));
        }
        Ok(())
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

    fn push_record(&mut self, item_id: ItemId, auditors: Vec<Address>) -> usize {
        let index = self.records.len();
        self.records.push(EnrollmentRecord {
            index,
            item_id,
            auditors,
            locked: false,
        });
        self.by_item.insert(item_id, index);
        index
    }
}
