//! Enrollment records: the candidate pool of auditors for one item.

use serde::{Deserialize, Serialize};

use crate::{Address, ItemId};

/// Ordered, duplicate-free list of candidates volunteering to audit an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    /// Position in the global enrollment list.
    pub index: usize,
    pub item_id: ItemId,
    /// Candidates in enrollment order. Earliest first.
    pub auditors: Vec<Address>,
    /// Frozen once the item is assigned or cancelled.
    pub locked: bool,
}

impl EnrollmentRecord {
    #[must_use]
    pub fn contains(&self, auditor: &Address) -> bool {
        self.auditors.contains(auditor)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.auditors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.auditors.is_empty()
    }
}
