//! Native-value amounts.
//!
//! Every amount is a whole number of native base units. Amounts are carried
//! as [`Decimal`] so fee arithmetic never overflows silently, but only
//! non-negative values with no fractional part are accepted.

use rust_decimal::Decimal;

use crate::{DauditError, Result};

/// Amount of native value in base units.
pub type Amount = Decimal;

/// Reject negative or fractional amounts.
pub fn ensure_whole_units(amount: Amount) -> Result<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DauditError::InvalidAmount {
            amount,
            reason: "must not be negative".to_string(),
        });
    }
    if !amount.fract().is_zero() {
        return Err(DauditError::InvalidAmount {
            amount,
            reason: "must be a whole number of base units".to_string(),
        });
    }
    Ok(())
}

/// `a + b`, or `InvalidAmount` if the sum leaves the representable range.
pub fn checked_total(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_add(b).ok_or_else(|| DauditError::InvalidAmount {
        amount: b,
        reason: format!("total with {a} overflows"),
    })
}

/// Split `total` into `parts` equal whole shares.
///
/// Returns `(share, remainder)` with `share * parts + remainder == total`.
#[must_use]
pub fn split_even(total: Amount, parts: u32) -> (Amount, Amount) {
    if parts == 0 {
        return (Decimal::ZERO, total);
    }
    let n = Decimal::from(parts);
    let share = (total / n).floor();
    (share, total - share * n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_amounts_accepted() {
        assert!(ensure_whole_units(Decimal::ZERO).is_ok());
        assert!(ensure_whole_units(Decimal::new(100, 0)).is_ok());
        // 100.00 has scale 2 but no fractional part
        assert!(ensure_whole_units(Decimal::new(10000, 2)).is_ok());
    }

    #[test]
    fn negative_rejected() {
        let err = ensure_whole_units(Decimal::new(-1, 0)).unwrap_err();
        assert!(matches!(err, DauditError::InvalidAmount { .. }));
    }

    #[test]
    fn fractional_rejected() {
        let err = ensure_whole_units(Decimal::new(15, 1)).unwrap_err();
        assert!(matches!(err, DauditError::InvalidAmount { .. }));
    }

    #[test]
    fn checked_total_reports_overflow() {
        assert_eq!(
            checked_total(Decimal::new(25, 0), Decimal::new(100, 0)).unwrap(),
            Decimal::new(125, 0)
        );
        let err = checked_total(Decimal::ONE, Decimal::MAX).unwrap_err();
        assert!(matches!(err, DauditError::InvalidAmount { .. }));
        assert!(format!("{err}").contains("DA_ERR_104"));
    }

    #[test]
    fn split_even_exact() {
        assert_eq!(
            split_even(Decimal::new(100, 0), 2),
            (Decimal::new(50, 0), Decimal::ZERO)
        );
    }

    #[test]
    fn split_even_keeps_remainder() {
        let (share, rem) = split_even(Decimal::new(100, 0), 3);
        assert_eq!(share, Decimal::new(33, 0));
        assert_eq!(rem, Decimal::ONE);
        assert_eq!(share * Decimal::from(3u32) + rem, Decimal::new(100, 0));
    }

    #[test]
    fn split_even_large_wei_values() {
        let total = Decimal::new(100_000_000_000_000_000, 0);
        let (share, rem) = split_even(total, 3);
        assert_eq!(share, Decimal::new(33_333_333_333_333_333, 0));
        assert_eq!(rem, Decimal::ONE);
    }

    #[test]
    fn split_into_zero_parts_keeps_everything() {
        assert_eq!(
            split_even(Decimal::new(7, 0), 0),
            (Decimal::ZERO, Decimal::new(7, 0))
        );
    }
}
