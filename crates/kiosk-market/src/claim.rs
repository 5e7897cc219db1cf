//! The claim workflow.
//!
//! Claims consume pending earnings oldest-first and pay the creator through
//! the injected payout provider. The transfer happens before any earning is
//! touched: a failed payout mutates nothing. On success, the consumed
//! earnings flip to claimed and the creator's lifetime aggregates grow by
//! the amount actually paid out.

use rusqlite::Connection;

use kiosk_db::queries::{accounts, earnings};
use kiosk_db::DbError;
use kiosk_ledger::claim::{self as claim_plan, PendingEarning};
use kiosk_payout::PayoutProvider;
use kiosk_types::ledger::ClaimReceipt;

use crate::{MarketConfig, MarketError, Result};

/// Claim pending earnings up to `requested` micro-credits.
///
/// Under the whole-earning policy the payout may exceed `requested` by the
/// tail of the final earning consumed; the receipt reports the actual
/// amount.
///
/// The caller must hold the connection for the whole call (including the
/// payout await) so concurrent claims against the same creator serialize.
///
/// # Errors
///
/// - [`MarketError::InvalidInput`] if `requested` is zero
/// - [`MarketError::AccountNotFound`] if the creator is not registered
/// - [`MarketError::NoPayoutAddress`] if no payout address is on file
/// - [`MarketError::NoPendingEarnings`] if nothing is claimable
/// - [`MarketError::ExceedsAvailable`] if `requested` exceeds the pending sum
/// - [`MarketError::UnalignedClaim`] under the exact-only policy
/// - [`MarketError::PayoutFailed`] if the provider fails; nothing is mutated
pub async fn claim_earnings(
    conn: &mut Connection,
    config: &MarketConfig,
    provider: &dyn PayoutProvider,
    creator: &str,
    requested: u64,
    now: u64,
) -> Result<ClaimReceipt> {
    if requested == 0 {
        return Err(MarketError::InvalidInput(
            "claim amount must be non-zero".to_string(),
        ));
    }

    let account = accounts::get(conn, creator).map_err(|e| match e {
        DbError::NotFound(_) => MarketError::AccountNotFound(creator.to_string()),
        other => MarketError::Db(other),
    })?;
    let payout_address = account.payout_address.ok_or(MarketError::NoPayoutAddress)?;

    let pending = earnings::list_pending(conn, creator)?;
    if pending.is_empty() {
        return Err(MarketError::NoPendingEarnings);
    }

    let queue: Vec<PendingEarning> = pending
        .iter()
        .map(|e| PendingEarning {
            id: e.earning_id,
            amount: e.amount,
        })
        .collect();
    let plan = claim_plan::plan(&queue, requested, config.claim_policy)?;

    // Payout strictly precedes any mutation.
    let payout_reference = provider
        .transfer(&payout_address, plan.total)
        .await
        .map_err(|e| MarketError::PayoutFailed(e.to_string()))?;

    let tx = conn.transaction().map_err(DbError::Sqlite)?;
    earnings::mark_claimed(&tx, &plan.earning_ids, &payout_reference, now)?;
    accounts::add_claimed_aggregates(&tx, creator, plan.total, plan.earning_ids.len() as u32)?;
    tx.commit().map_err(DbError::Sqlite)?;

    let remaining_pending = earnings::pending_total(conn, creator)?;

    tracing::info!(
        creator,
        requested,
        claimed = plan.total,
        consumed = plan.earning_ids.len(),
        remaining_pending,
        payout_reference,
        "earnings claimed"
    );

    Ok(ClaimReceipt {
        claimed_amount: plan.total,
        claimed_earnings_count: plan.earning_ids.len() as u32,
        remaining_pending,
        payout_reference,
    })
}
