//! Fee treasury and its conservation invariant.
//!
//! Every unit the coordinator has ever received sits in exactly one bucket:
//! ```text
//! received == retained_listing + escrowed + paid_out + refunded + dust
//! ```
//! and the coordinator's ledger balance must equal what it still holds:
//! ```text
//! balance == received - paid_out - refunded
//! ```
//! A violation is a critical `TreasuryImbalance`. Nothing may commit past it.

use std::collections::HashMap;

use daudit_types::{Amount, DauditError, ItemId, Result, amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Point-in-time totals of every treasury bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasurySnapshot {
    pub received: Amount,
    pub retained_listing: Amount,
    pub escrowed: Amount,
    pub paid_out: Amount,
    pub refunded: Amount,
    pub dust: Amount,
}

impl TreasurySnapshot {
    /// Value the coordinator should still be holding.
    #[must_use]
    pub fn custody(&self) -> Amount {
        self.received - self.paid_out - self.refunded
    }
}

/// Tracks listing fees, per-item escrow and everything paid back out.
#[derive(Debug, Clone, Default)]
pub struct FeeTreasury {
    received: Decimal,
    retained_listing: Decimal,
    /// Remaining escrow per item. An entry is kept at zero once drained.
    escrow: HashMap<ItemId, Decimal>,
    paid_out: Decimal,
    refunded: Decimal,
    dust: Decimal,
}

impl FeeTreasury {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Book a new listing: the listing fee is retained, the audit fee is
    /// escrowed against the item. Nothing changes on error.
    ///
    /// # Errors
    /// Returns `InvalidAmount` if any bucket would overflow.
    pub fn record_listing(
        &mut self,
        item_id: ItemId,
        listing_fee: Amount,
        audit_fee: Amount,
    ) -> Result<()> {
        let total = amount::checked_total(listing_fee, audit_fee)?;
        let received = amount::checked_total(self.received, total)?;
        let retained = amount::checked_total(self.retained_listing, listing_fee)?;
        let escrowed = amount::checked_total(self.escrow_of(item_id), audit_fee)?;
        self.received = received;
        self.retained_listing = retained;
        self.escrow.insert(item_id, escrowed);
        Ok(())
    }

    /// Pay `amount` out of an item's escrow.
    ///
    /// # Errors
    /// Returns `TreasuryImbalance` if the escrow cannot cover it.
    pub fn release(&mut self, item_id: ItemId, amount: Amount) -> Result<()> {
        let held = self.escrow_mut(item_id)?;
        if *held < amount {
            return Err(DauditError::TreasuryImbalance {
                reason: format!("{item_id}: release of {amount} exceeds escrow {held}"),
            });
        }
        *held -= amount;
        self.paid_out += amount;
        Ok(())
    }

    /// Drain an item's whole escrow back to its producer. Returns the amount.
    ///
    /// # Errors
    /// Returns `TreasuryImbalance` if the item was never escrowed.
    pub fn refund(&mut self, item_id: ItemId) -> Result<Amount> {
        let held = self.escrow_mut(item_id)?;
        let amount = std::mem::take(held);
        self.refunded += amount;
        Ok(amount)
    }

    /// Move whatever escrow is left for a settled item into the dust bucket.
    ///
    /// # Errors
    /// Returns `TreasuryImbalance` if the item was never escrowed.
    pub fn sweep_dust(&mut self, item_id: ItemId) -> Result<Amount> {
        let held = self.escrow_mut(item_id)?;
        let amount = std::mem::take(held);
        self.dust += amount;
        Ok(amount)
    }

    /// Remaining escrow for one item.
    #[must_use]
    pub fn escrow_of(&self, item_id: ItemId) -> Amount {
        self.escrow.get(&item_id).copied().unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn snapshot(&self) -> TreasurySnapshot {
        TreasurySnapshot {
            received: self.received,
            retained_listing: self.retained_listing,
            escrowed: self.escrow.values().copied().sum(),
            paid_out: self.paid_out,
            refunded: self.refunded,
            dust: self.dust,
        }
    }

    /// Check bucket conservation and that the ledger agrees on custody.
    ///
    /// # Errors
    /// Returns `TreasuryImbalance` describing the first mismatch.
    pub fn verify(&self, ledger_balance: Amount) -> Result<()> {
        let snap = self.snapshot();
        let accounted =
            snap.retained_listing + snap.escrowed + snap.paid_out + snap.refunded + snap.dust;
        if accounted != snap.received {
            return Err(DauditError::TreasuryImbalance {
                reason: format!(
                    "received {} != accounted {accounted} \
                     (retained={}, escrowed={}, paid_out={}, refunded={}, dust={})",
                    snap.received,
                    snap.retained_listing,
                    snap.escrowed,
                    snap.paid_out,
                    snap.refunded,
                    snap.dust,
                ),
            });
        }
        if ledger_balance != snap.custody() {
            return Err(DauditError::TreasuryImbalance {
                reason: format!(
                    "ledger balance {ledger_balance} != custody {}",
                    snap.custody()
                ),
            });
        }
        Ok(())
    }

    fn escrow_mut(&mut self, item_id: ItemId) -> Result<&mut Decimal> {
        self.escrow
            .get_mut(&item_id)
            .ok_or_else(|| DauditError::TreasuryImbalance {
                reason: format!("{item_id} has no escrow account"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listed() -> FeeTreasury {
        let mut t = FeeTreasury::new();
        t.record_listing(ItemId(1), Decimal::new(25, 0), Decimal::new(100, 0))
            .unwrap();
        t
    }

    #[test]
    fn empty_treasury_balances() {
        let t = FeeTreasury::new();
        assert!(t.verify(Decimal::ZERO).is_ok());
        assert_eq!(t.snapshot().custody(), Decimal::ZERO);
    }

    #[test]
    fn listing_splits_into_retained_and_escrow() {
        let t = listed();
        let snap = t.snapshot();
        assert_eq!(snap.received, Decimal::new(125, 0));
        assert_eq!(snap.retained_listing, Decimal::new(25, 0));
        assert_eq!(snap.escrowed, Decimal::new(100, 0));
        assert!(t.verify(Decimal::new(125, 0)).is_ok());
    }

    #[test]
    fn release_then_sweep() {
        let mut t = FeeTreasury::new();
        t.record_listing(ItemId(1), Decimal::new(25, 0), Decimal::new(100, 0))
            .unwrap();
        t.release(ItemId(1), Decimal::new(33, 0)).unwrap();
        t.release(ItemId(1), Decimal::new(33, 0)).unwrap();
        t.release(ItemId(1), Decimal::new(33, 0)).unwrap();
        assert_eq!(t.sweep_dust(ItemId(1)).unwrap(), Decimal::ONE);
        assert_eq!(t.escrow_of(ItemId(1)), Decimal::ZERO);

        let snap = t.snapshot();
        assert_eq!(snap.paid_out, Decimal::new(99, 0));
        assert_eq!(snap.dust, Decimal::ONE);
        // 125 received, 99 paid out: 26 still held (listing + dust)
        assert!(t.verify(Decimal::new(26, 0)).is_ok());
    }

    #[test]
    fn over_release_rejected() {
        let mut t = listed();
        let err = t.release(ItemId(1), Decimal::new(101, 0)).unwrap_err();
        assert!(matches!(err, DauditError::TreasuryImbalance { .. }));
        assert_eq!(t.escrow_of(ItemId(1)), Decimal::new(100, 0));
    }

    #[test]
    fn refund_drains_escrow() {
        let mut t = listed();
        assert_eq!(t.refund(ItemId(1)).unwrap(), Decimal::new(100, 0));
        assert_eq!(t.refund(ItemId(1)).unwrap(), Decimal::ZERO);
        assert_eq!(t.snapshot().refunded, Decimal::new(100, 0));
        assert!(t.verify(Decimal::new(25, 0)).is_ok());
    }

    #[test]
    fn unknown_item_is_imbalance() {
        let mut t = FeeTreasury::new();
        assert!(t.release(ItemId(9), Decimal::ONE).is_err());
        assert!(t.refund(ItemId(9)).is_err());
    }

    #[test]
    fn overflowing_listing_leaves_buckets_untouched() {
        let mut t = listed();
        let before = t.snapshot();
        let err = t.record_listing(ItemId(2), Decimal::ZERO, Decimal::MAX).unwrap_err();
        assert!(matches!(err, DauditError::InvalidAmount { .. }));
        assert_eq!(t.snapshot(), before);
        assert_eq!(t.escrow_of(ItemId(2)), Decimal::ZERO);
        assert!(t.verify(Decimal::new(125, 0)).is_ok());
    }

    #[test]
    fn ledger_disagreement_detected() {
        let t = listed();
        let err = t.verify(Decimal::new(124, 0)).unwrap_err();
        assert!(format!("{err}").contains("DA_ERR_900"));
    }

    #[test]
    fn snapshot_serializes() {
        let snap = listed().snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let back: TreasurySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, back);
    }
}
