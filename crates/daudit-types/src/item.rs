//! # AuditItem: a document listed for third-party review
//!
//! ## State Machine
//!
//! ```text
//!   ┌─────────┐ assign  ┌─────────────┐ settle  ┌────────┐
//!   │ PENDING ├────────▶│ IN_PROGRESS ├────────▶│ PASSED │
//!   └────┬────┘         └──────┬──────┘    │    └────────┘
//!        │ cancel              │ cancel    │    ┌────────┐
//!        │                     ▼           └───▶│ FAILED │
//!        │              ┌───────────┐           └────────┘
//!        └─────────────▶│ CANCELLED │
//!                       └───────────┘
//! ```
//!
//! Transitions are monotonic: an item never re-enters PENDING and never
//! leaves a terminal state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, DauditError, ItemId, Result, TokenId};

/// Lifecycle state of an audit item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditItemStatus {
    /// Listed and escrowed; collecting enrollments.
    Pending,
    /// Auditors assigned; collecting results.
    InProgress,
    /// Settled with a passing verdict.
    Passed,
    /// Settled with a failing verdict.
    Failed,
    /// Withdrawn by the administrator; escrow refunded.
    Cancelled,
}

impl AuditItemStatus {
    /// Can an item in this state move to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::InProgress | Self::Cancelled)
                | (Self::InProgress, Self::Passed | Self::Failed | Self::Cancelled)
        )
    }

    /// Passed, Failed and Cancelled admit no further transition.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Cancelled)
    }

    /// Passed or Failed: the escrow has been distributed.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }

    /// Numeric code used by the presentation layer.
    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::InProgress => 1,
            Self::Passed => 2,
            Self::Failed => 3,
            Self::Cancelled => 4,
        }
    }
}

impl std::fmt::Display for AuditItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Passed => write!(f, "PASSED"),
            Self::Failed => write!(f, "FAILED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Reference to a token held in an external asset registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    /// Address of the registry contract.
    pub contract: Address,
    /// Token id inside that registry.
    pub token_id: TokenId,
}

/// A document registered for audit, carrying an escrowed fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditItem {
    pub id: ItemId,
    /// Who listed the item and paid the fees.
    pub producer: Address,
    /// Current owner of the item. The producer at creation.
    pub owner: Address,
    pub asset: AssetRef,
    /// Escrowed value to be split among assigned auditors.
    pub audit_fee: Amount,
    pub required_auditors: u32,
    pub status: AuditItemStatus,
    /// Creation order across all items.
    pub sequence: u64,
    pub created_at: DateTime<Utc>,
    /// Set when the item reaches Passed, Failed or Cancelled.
    pub closed_at: Option<DateTime<Utc>>,
}

impl AuditItem {
    /// Move to `target`, enforcing the monotonic state machine.
    ///
    /// # Errors
    /// Returns `WrongStatus` if the transition is not allowed.
    pub fn transition(&mut self, target: AuditItemStatus) -> Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(DauditError::WrongStatus {
                item: self.id,
                expected: expected_source(target),
                actual: self.status,
            });
        }
        self.status = target;
        if target.is_terminal() {
            self.closed_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Fail with `WrongStatus` unless the item is in `status`.
    pub fn ensure_status(&self, status: AuditItemStatus, expected: &'static str) -> Result<()> {
        if self.status == status {
            Ok(())
        } else {
            Err(DauditError::WrongStatus {
                item: self.id,
                expected,
                actual: self.status,
            })
        }
    }
}

fn expected_source(target: AuditItemStatus) -> &'static str {
    match target {
        AuditItemStatus::Pending => "NONE",
        AuditItemStatus::InProgress => "PENDING",
        AuditItemStatus::Passed | AuditItemStatus::Failed => "IN_PROGRESS",
        AuditItemStatus::Cancelled => "PENDING or IN_PROGRESS",
    }
}

/// Dummy item for unit tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl AuditItem {
    pub fn dummy(id: ItemId, audit_fee: Amount, required_auditors: u32) -> Self {
        let producer = Address::random();
        Self {
            id,
            producer,
            owner: producer,
            asset: AssetRef {
                contract: Address::random(),
                token_id: TokenId(id.0),
            },
            audit_fee,
            required_auditors,
            status: AuditItemStatus::Pending,
            sequence: id.0,
            created_at: Utc::now(),
            closed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    const ALL: [AuditItemStatus; 5] = [
        AuditItemStatus::Pending,
        AuditItemStatus::InProgress,
        AuditItemStatus::Passed,
        AuditItemStatus::Failed,
        AuditItemStatus::Cancelled,
    ];

    #[test]
    fn forward_transitions_valid() {
        use AuditItemStatus::*;
        assert!(Pending.can_transition_to(InProgress));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Passed));
        assert!(InProgress.can_transition_to(Failed));
        assert!(InProgress.can_transition_to(Cancelled));
    }

    #[test]
    fn nothing_reenters_pending() {
        for s in ALL {
            assert!(!s.can_transition_to(AuditItemStatus::Pending), "{s}");
        }
    }

    #[test]
    fn terminal_states_are_final() {
        for from in ALL.iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn pending_cannot_skip_to_verdict() {
        assert!(!AuditItemStatus::Pending.can_transition_to(AuditItemStatus::Passed));
        assert!(!AuditItemStatus::Pending.can_transition_to(AuditItemStatus::Failed));
    }

    #[test]
    fn transition_sets_closed_at_on_terminal() {
        let mut item = AuditItem::dummy(ItemId(1), Decimal::new(100, 0), 2);
        item.transition(AuditItemStatus::InProgress).unwrap();
        assert!(item.closed_at.is_none());
        item.transition(AuditItemStatus::Failed).unwrap();
        assert!(item.closed_at.is_some());
    }

    #[test]
    fn illegal_transition_reports_wrong_status() {
        let mut item = AuditItem::dummy(ItemId(1), Decimal::new(100, 0), 2);
        let err = item.transition(AuditItemStatus::Passed).unwrap_err();
        assert!(matches!(
            err,
            DauditError::WrongStatus {
                actual: AuditItemStatus::Pending,
                ..
            }
        ));
        assert_eq!(item.status, AuditItemStatus::Pending);
    }

    #[test]
    fn status_codes_match_display_order() {
        let codes: Vec<u8> = ALL.iter().map(AuditItemStatus::code).collect();
        assert_eq!(codes, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn serde_roundtrip() {
        let item = AuditItem::dummy(ItemId(5), Decimal::new(10, 0), 1);
        let json = serde_json::to_string(&item).unwrap();
        let back: AuditItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }
}
