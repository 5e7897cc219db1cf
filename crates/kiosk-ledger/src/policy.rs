//! Charge validation and the settlement-reset policy.
//!
//! Every buyer starts at a fixed allowance
//! ([`kiosk_types::CREDIT_ALLOWANCE_MICRO`] by default) and purchases draw
//! the balance down toward zero. Settlement is the only operation that
//! restores balance, and how much it restores is a [`SettlementPolicy`]
//! decision rather than a hardcoded behavior.

use serde::{Deserialize, Serialize};

use crate::{LedgerError, Result};

/// How settlement restores a buyer's balance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementPolicy {
    /// Balance returns to the full allowance regardless of the amount
    /// settled (flat allowance-refresh model).
    #[default]
    FullReset,
    /// Balance increases by exactly the settled amount, capped at the
    /// allowance.
    RefundSettled,
}

/// Validate a charge and return the post-charge balance.
///
/// # Errors
///
/// - [`LedgerError::ZeroAmount`] if `amount` is zero
/// - [`LedgerError::InsufficientCredit`] if `amount` exceeds `balance`
pub fn check_charge(balance: u64, amount: u64) -> Result<u64> {
    if amount == 0 {
        return Err(LedgerError::ZeroAmount);
    }
    if amount > balance {
        return Err(LedgerError::InsufficientCredit {
            required: amount,
            available: balance,
        });
    }
    Ok(balance - amount)
}

/// Compute the post-settlement balance under the given policy.
///
/// `settled_amount` is the sum of the purchases being settled. The result
/// never exceeds `allowance`.
///
/// # Errors
///
/// - [`LedgerError::Overflow`] if the refund calculation overflows
pub fn post_settlement_balance(
    policy: SettlementPolicy,
    allowance: u64,
    balance: u64,
    settled_amount: u64,
) -> Result<u64> {
    let new_balance = match policy {
        SettlementPolicy::FullReset => allowance,
        SettlementPolicy::RefundSettled => balance
            .checked_add(settled_amount)
            .ok_or(LedgerError::Overflow)?
            .min(allowance),
    };

    tracing::debug!(?policy, balance, settled_amount, new_balance, "settlement balance computed");

    Ok(new_balance)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWANCE: u64 = 100_000_000;

    #[test]
    fn test_check_charge_decrements() {
        assert_eq!(check_charge(ALLOWANCE, 30_000_000).expect("charge"), 70_000_000);
    }

    #[test]
    fn test_check_charge_exact_balance() {
        assert_eq!(check_charge(50, 50).expect("charge"), 0);
    }

    #[test]
    fn test_check_charge_zero_amount() {
        assert!(matches!(check_charge(ALLOWANCE, 0), Err(LedgerError::ZeroAmount)));
    }

    #[test]
    fn test_check_charge_insufficient() {
        let err = check_charge(20, 50).expect_err("must fail");
        match err {
            LedgerError::InsufficientCredit { required, available } => {
                assert_eq!(required, 50);
                assert_eq!(available, 20);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_full_reset_ignores_settled_amount() {
        // A buyer who used 40 of 100 resets exactly like one who used 100.
        let balance =
            post_settlement_balance(SettlementPolicy::FullReset, ALLOWANCE, 60, 40).expect("policy");
        assert_eq!(balance, ALLOWANCE);

        let balance =
            post_settlement_balance(SettlementPolicy::FullReset, ALLOWANCE, 0, ALLOWANCE)
                .expect("policy");
        assert_eq!(balance, ALLOWANCE);
    }

    #[test]
    fn test_refund_settled_adds_exactly() {
        let balance = post_settlement_balance(
            SettlementPolicy::RefundSettled,
            ALLOWANCE,
            60_000_000,
            40_000_000,
        )
        .expect("policy");
        assert_eq!(balance, ALLOWANCE);

        let balance = post_settlement_balance(
            SettlementPolicy::RefundSettled,
            ALLOWANCE,
            60_000_000,
            10_000_000,
        )
        .expect("policy");
        assert_eq!(balance, 70_000_000);
    }

    #[test]
    fn test_refund_settled_caps_at_allowance() {
        let balance = post_settlement_balance(
            SettlementPolicy::RefundSettled,
            ALLOWANCE,
            90_000_000,
            40_000_000,
        )
        .expect("policy");
        assert_eq!(balance, ALLOWANCE);
    }

    #[test]
    fn test_refund_settled_overflow() {
        let result =
            post_settlement_balance(SettlementPolicy::RefundSettled, ALLOWANCE, u64::MAX, 1);
        assert!(matches!(result, Err(LedgerError::Overflow)));
    }

    #[test]
    fn test_default_policy_is_full_reset() {
        assert_eq!(SettlementPolicy::default(), SettlementPolicy::FullReset);
    }
}
