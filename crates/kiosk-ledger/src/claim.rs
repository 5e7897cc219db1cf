//! FIFO claim-consumption planning.
//!
//! Pending earnings are consumed oldest-first. Earnings are never split:
//! under [`ClaimPolicy::ConsumeWhole`] the final earning consumed may carry
//! the claim total past the requested amount, and the claim pays out that
//! total; under [`ClaimPolicy::ExactOnly`] a request that does not land on
//! an earning boundary is rejected.

use serde::{Deserialize, Serialize};

use kiosk_types::EarningId;

use crate::{LedgerError, Result};

/// How a claim request maps onto whole pending earnings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimPolicy {
    /// Consume whole earnings oldest-first until the running total reaches
    /// the request; the payout covers the full consumed total.
    #[default]
    ConsumeWhole,
    /// Reject requests that do not land exactly on an earning boundary.
    ExactOnly,
}

/// One pending earning, in FIFO order.
#[derive(Clone, Copy, Debug)]
pub struct PendingEarning {
    pub id: EarningId,
    /// Amount in micro-credits.
    pub amount: u64,
}

/// The earnings a claim will consume and the exact total to pay out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimPlan {
    /// Earnings to mark claimed, oldest first.
    pub earning_ids: Vec<EarningId>,
    /// Sum of the consumed earnings, in micro-credits.
    pub total: u64,
}

/// Plan a claim against the pending queue.
///
/// `pending` must already be ordered oldest-first; the plan consumes a
/// prefix of it.
///
/// # Errors
///
/// - [`LedgerError::ZeroAmount`] if `requested` is zero
/// - [`LedgerError::ExceedsAvailable`] if `requested` exceeds the pending sum
/// - [`LedgerError::UnalignedAmount`] under [`ClaimPolicy::ExactOnly`] when
///   the request is not a prefix sum of the queue
/// - [`LedgerError::Overflow`] if the pending sum overflows
pub fn plan(pending: &[PendingEarning], requested: u64, policy: ClaimPolicy) -> Result<ClaimPlan> {
    if requested == 0 {
        return Err(LedgerError::ZeroAmount);
    }

    let mut available: u64 = 0;
    for earning in pending {
        available = available
            .checked_add(earning.amount)
            .ok_or(LedgerError::Overflow)?;
    }
    if requested > available {
        return Err(LedgerError::ExceedsAvailable {
            requested,
            available,
        });
    }

    let mut earning_ids = Vec::new();
    let mut total: u64 = 0;
    for earning in pending {
        if total >= requested {
            break;
        }
        total += earning.amount;
        earning_ids.push(earning.id);
    }

    if policy == ClaimPolicy::ExactOnly && total != requested {
        return Err(LedgerError::UnalignedAmount {
            requested,
            boundary: total,
        });
    }

    tracing::debug!(
        requested,
        total,
        consumed = earning_ids.len(),
        ?policy,
        "claim plan computed"
    );

    Ok(ClaimPlan { earning_ids, total })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(amounts: &[u64]) -> Vec<PendingEarning> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| PendingEarning {
                id: i as i64 + 1,
                amount,
            })
            .collect()
    }

    #[test]
    fn test_exact_single_earning() {
        let plan = plan(&queue(&[30, 50]), 30, ClaimPolicy::ConsumeWhole).expect("plan");
        assert_eq!(plan.earning_ids, vec![1]);
        assert_eq!(plan.total, 30);
    }

    #[test]
    fn test_exact_multiple_earnings() {
        let plan = plan(&queue(&[30, 50, 20]), 80, ClaimPolicy::ConsumeWhole).expect("plan");
        assert_eq!(plan.earning_ids, vec![1, 2]);
        assert_eq!(plan.total, 80);
    }

    #[test]
    fn test_consume_whole_overshoots() {
        // Claiming 30 when the oldest earning is 50 consumes the whole 50.
        let plan = plan(&queue(&[50, 20]), 30, ClaimPolicy::ConsumeWhole).expect("plan");
        assert_eq!(plan.earning_ids, vec![1]);
        assert_eq!(plan.total, 50);
    }

    #[test]
    fn test_consume_whole_overshoot_on_last() {
        let plan = plan(&queue(&[30, 50]), 40, ClaimPolicy::ConsumeWhole).expect("plan");
        assert_eq!(plan.earning_ids, vec![1, 2]);
        assert_eq!(plan.total, 80);
    }

    #[test]
    fn test_exact_only_rejects_unaligned() {
        let err = plan(&queue(&[50, 20]), 30, ClaimPolicy::ExactOnly).expect_err("must fail");
        match err {
            LedgerError::UnalignedAmount { requested, boundary } => {
                assert_eq!(requested, 30);
                assert_eq!(boundary, 50);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_exact_only_accepts_boundary() {
        let plan = plan(&queue(&[50, 20]), 70, ClaimPolicy::ExactOnly).expect("plan");
        assert_eq!(plan.earning_ids, vec![1, 2]);
        assert_eq!(plan.total, 70);
    }

    #[test]
    fn test_zero_requested() {
        assert!(matches!(
            plan(&queue(&[50]), 0, ClaimPolicy::ConsumeWhole),
            Err(LedgerError::ZeroAmount)
        ));
    }

    #[test]
    fn test_exceeds_available() {
        let err = plan(&queue(&[30, 20]), 60, ClaimPolicy::ConsumeWhole).expect_err("must fail");
        match err {
            LedgerError::ExceedsAvailable { requested, available } => {
                assert_eq!(requested, 60);
                assert_eq!(available, 50);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_queue_exceeds() {
        assert!(matches!(
            plan(&[], 1, ClaimPolicy::ConsumeWhole),
            Err(LedgerError::ExceedsAvailable { .. })
        ));
    }

    #[test]
    fn test_fifo_order_respected() {
        // Consumption is strictly a prefix of the queue as given.
        let plan = plan(&queue(&[10, 20, 30, 40]), 25, ClaimPolicy::ConsumeWhole).expect("plan");
        assert_eq!(plan.earning_ids, vec![1, 2]);
        assert_eq!(plan.total, 30);
    }
}
