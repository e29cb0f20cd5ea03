//! Payout receipts for the DAudit audit trail.
//!
//! Every transfer of escrowed value (auditor fee share or producer refund)
//! produces a [`PayoutReceipt`]. Receipts form an append-only log kept by the
//! coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, AuditItemStatus, ItemId, ReceiptId};

/// Why value left the escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayoutKind {
    /// An assigned auditor's fee share.
    AuditorFee,
    /// Escrow returned to the producer on cancellation.
    ProducerRefund,
}

impl std::fmt::Display for PayoutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuditorFee => write!(f, "AUDITOR_FEE"),
            Self::ProducerRefund => write!(f, "PRODUCER_REFUND"),
        }
    }
}

/// One native-value transfer issued from escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutReceipt {
    pub id: ReceiptId,
    pub item_id: ItemId,
    pub recipient: Address,
    pub amount: Amount,
    pub kind: PayoutKind,
    pub issued_at: DateTime<Utc>,
}

impl PayoutReceipt {
    #[must_use]
    pub fn new(item_id: ItemId, recipient: Address, amount: Amount, kind: PayoutKind) -> Self {
        Self {
            id: ReceiptId::new(),
            item_id,
            recipient,
            amount,
            kind,
            issued_at: Utc::now(),
        }
    }
}

/// Result of a `pay_auditors` call.
///
/// On an idempotent re-invocation `payouts` is empty and `dust` is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReport {
    pub item_id: ItemId,
    pub status: AuditItemStatus,
    pub payouts: Vec<PayoutReceipt>,
    /// Rounding remainder moved out of escrow into the retained bucket.
    pub dust: Amount,
}

impl SettlementReport {
    #[must_use]
    pub fn total_paid(&self) -> Amount {
        self.payouts.iter().map(|p| p.amount).sum()
    }

    /// `true` if this call moved no value.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.payouts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn payout_kind_display() {
        assert_eq!(format!("{}", PayoutKind::AuditorFee), "AUDITOR_FEE");
        assert_eq!(format!("{}", PayoutKind::ProducerRefund), "PRODUCER_REFUND");
    }

    #[test]
    fn report_totals() {
        let report = SettlementReport {
            item_id: ItemId(1),
            status: AuditItemStatus::Failed,
            payouts: vec![
                PayoutReceipt::new(
                    ItemId(1),
                    Address::repeat_byte(1),
                    Decimal::new(50, 0),
                    PayoutKind::AuditorFee,
                ),
                PayoutReceipt::new(
                    ItemId(1),
                    Address::repeat_byte(2),
                    Decimal::new(50, 0),
                    PayoutKind::AuditorFee,
                ),
            ],
            dust: Decimal::ZERO,
        };
        assert_eq!(report.total_paid(), Decimal::new(100, 0));
        assert!(!report.is_noop());
    }
}
