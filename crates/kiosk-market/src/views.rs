//! Read-side queries assembled into the RPC view types.

use rusqlite::Connection;

use kiosk_db::queries::{accounts, content, credit, earnings, purchases};
use kiosk_db::DbError;
use kiosk_types::account::AccountProfile;
use kiosk_types::content::{ContentSummary, EarningView, PurchaseView};
use kiosk_types::ledger::{
    CreditBalance, EarningStatus, EarningsSummary, PurchaseStatus, StatusTotals,
};

use crate::{MarketConfig, MarketError, Result};

/// A buyer's credit position, creating the ledger lazily on first query.
pub fn credit_balance(
    conn: &Connection,
    config: &MarketConfig,
    owner: &str,
    now: u64,
) -> Result<CreditBalance> {
    if !accounts::exists(conn, owner)? {
        return Err(MarketError::AccountNotFound(owner.to_string()));
    }

    let ledger = credit::get_or_create(conn, owner, config.allowance, now)?;
    Ok(CreditBalance {
        owner: ledger.owner,
        balance: ledger.balance,
        allowance: config.allowance,
    })
}

/// A creator's earnings summary plus the full earning list, newest first.
pub fn creator_earnings(
    conn: &Connection,
    creator: &str,
) -> Result<(EarningsSummary, Vec<EarningView>)> {
    if !accounts::exists(conn, creator)? {
        return Err(MarketError::AccountNotFound(creator.to_string()));
    }

    let (pending_amount, pending_count, claimed_amount, claimed_count) =
        earnings::summarize(conn, creator)?;
    let summary = EarningsSummary {
        pending: StatusTotals {
            amount: pending_amount,
            count: pending_count,
        },
        claimed: StatusTotals {
            amount: claimed_amount,
            count: claimed_count,
        },
    };

    let list = earnings::list_for_creator(conn, creator)?
        .into_iter()
        .map(|row| {
            EarningView {
                earning_id: row.earning_id,
                content_id: hex::encode(&row.content_id),
                purchase_id: row.purchase_id,
                amount: row.amount,
                status: EarningStatus::parse(&row.status).unwrap_or(EarningStatus::Pending),
                settlement_reference: row.settlement_reference,
                payout_reference: row.payout_reference,
                claimed_at: row.claimed_at,
                created_at: row.created_at,
            }
        })
        .collect();

    Ok((summary, list))
}

/// A buyer's purchase history, newest first.
pub fn purchase_history(conn: &Connection, buyer: &str) -> Result<Vec<PurchaseView>> {
    if !accounts::exists(conn, buyer)? {
        return Err(MarketError::AccountNotFound(buyer.to_string()));
    }

    let views = purchases::history(conn, buyer)?
        .into_iter()
        .map(|row| PurchaseView {
            purchase_id: row.purchase_id,
            content_id: hex::encode(&row.content_id),
            amount: row.amount,
            status: PurchaseStatus::parse(&row.status).unwrap_or(PurchaseStatus::Pending),
            settled: row.settled,
            settlement_reference: row.settlement_reference,
            created_at: row.created_at,
        })
        .collect();

    Ok(views)
}

/// The visible catalog, newest first.
pub fn catalog(conn: &Connection) -> Result<Vec<ContentSummary>> {
    let items = content::list(conn)?
        .into_iter()
        .map(|row| ContentSummary {
            content_id: hex::encode(&row.content_id),
            creator: row.creator,
            title: row.title,
            description: row.description,
            price: row.price,
            sales_count: row.sales_count,
            published_at: row.published_at,
        })
        .collect();

    Ok(items)
}

/// An account profile with its lifetime aggregates.
pub fn account_profile(conn: &Connection, account_id: &str) -> Result<AccountProfile> {
    let row = accounts::get(conn, account_id).map_err(|e| match e {
        DbError::NotFound(_) => MarketError::AccountNotFound(account_id.to_string()),
        other => MarketError::Db(other),
    })?;

    Ok(AccountProfile {
        account_id: row.account_id,
        display_name: row.display_name,
        payout_address: row.payout_address,
        total_earnings: row.total_earnings,
        total_sales: row.total_sales,
        created_at: row.created_at,
    })
}
