//! Native-value ledger used by the reference runtime.
//!
//! Tracks one balance per address. Value enters only through `deposit`
//! (genesis funding) and otherwise moves between accounts, so
//! `total_supply() == minted()` at all times.

use std::collections::HashMap;

use daudit_types::{Address, Amount, DauditError, Result, amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Authenticated caller and the value attached to a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: Address,
    pub value: Amount,
}

impl CallContext {
    #[must_use]
    pub fn new(caller: Address, value: Amount) -> Self {
        Self { caller, value }
    }

    /// A call with no attached value.
    #[must_use]
    pub fn free(caller: Address) -> Self {
        Self::new(caller, Decimal::ZERO)
    }

    /// Caller identity derived from an ed25519 verifying key.
    #[must_use]
    pub fn from_key(key: &ed25519_dalek::VerifyingKey, value: Amount) -> Self {
        Self::new(Address::from_verifying_key(key), value)
    }
}

/// Per-address native balances.
#[derive(Debug, Clone, Default)]
pub struct NativeLedger {
    balances: HashMap<Address, Decimal>,
    minted: Decimal,
}

impl NativeLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create new value in `account`.
    ///
    /// # Errors
    /// `InvalidAmount` for negative or fractional amounts or when total
    /// supply would overflow, `InvalidAddress` for the zero address.
    pub fn deposit(&mut self, account: Address, amount: Amount) -> Result<()> {
        amount::ensure_whole_units(amount)?;
        if account.is_zero() {
            return Err(DauditError::InvalidAddress {
                reason: "cannot fund the zero address".to_string(),
            });
        }
        let minted = amount::checked_total(self.minted, amount)?;
        let balance = amount::checked_total(self.balance(account), amount)?;
        self.balances.insert(account, balance);
        self.minted = minted;
        Ok(())
    }

    /// Move `amount` from one account to another.
    ///
    /// # Errors
    /// Returns `InsufficientFunds` if `from` cannot cover it. Nothing moves.
    pub fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<()> {
        amount::ensure_whole_units(amount)?;
        let available = self.balance(from);
        if available < amount {
            return Err(DauditError::InsufficientFunds {
                account: from,
                needed: amount,
                available,
            });
        }
        if amount.is_zero() || from == to {
            return Ok(());
        }
        *self.balances.entry(from).or_insert(Decimal::ZERO) -= amount;
        *self.balances.entry(to).or_insert(Decimal::ZERO) += amount;
        Ok(())
    }

    #[must_use]
    pub fn balance(&self, account: Address) -> Amount {
        self.balances.get(&account).copied().unwrap_or(Decimal::ZERO)
    }

    /// Sum of every balance.
    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.balances.values().copied().sum()
    }

    /// Everything ever deposited.
    #[must_use]
    pub fn minted(&self) -> Amount {
        self.minted
    }

    /// # Errors
    /// Returns `TreasuryImbalance` if value was created or destroyed outside
    /// `deposit`.
    pub fn verify_supply(&self) -> Result<()> {
        let total = self.total_supply();
        if total != self.minted {
            return Err(DauditError::TreasuryImbalance {
                reason: format!("ledger supply {total} != minted {}", self.minted),
            });
        }
        Ok(())
    }
}
