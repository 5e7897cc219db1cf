//! SQL schema definitions.

/// Complete schema for Kiosk v1 database.
pub const SCHEMA_V1: &str = r#"
-- ============================================================
-- Accounts & Aggregates
-- ============================================================

CREATE TABLE IF NOT EXISTS accounts (
    account_id TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    payout_address TEXT,
    total_earnings INTEGER NOT NULL DEFAULT 0,
    total_sales INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

-- ============================================================
-- Credit Ledger
-- ============================================================

CREATE TABLE IF NOT EXISTS credit_accounts (
    owner TEXT PRIMARY KEY REFERENCES accounts(account_id),
    balance INTEGER NOT NULL CHECK (balance >= 0),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS settled_references (
    owner TEXT NOT NULL REFERENCES credit_accounts(owner),
    reference TEXT NOT NULL,
    amount_settled INTEGER NOT NULL,
    settled_at INTEGER NOT NULL,
    PRIMARY KEY (owner, reference)
);

-- ============================================================
-- Content Catalog
-- ============================================================

CREATE TABLE IF NOT EXISTS content_catalog (
    content_id BLOB PRIMARY KEY,
    creator TEXT NOT NULL REFERENCES accounts(account_id),
    title TEXT NOT NULL,
    description TEXT,
    price INTEGER NOT NULL CHECK (price > 0),
    sales_count INTEGER NOT NULL DEFAULT 0,
    published_at INTEGER NOT NULL,
    is_tombstoned INTEGER NOT NULL DEFAULT 0,
    tombstoned_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_catalog_creator ON content_catalog(creator);

-- ============================================================
-- Purchases
-- ============================================================

CREATE TABLE IF NOT EXISTS purchases (
    purchase_id INTEGER PRIMARY KEY AUTOINCREMENT,
    buyer TEXT NOT NULL REFERENCES accounts(account_id),
    content_id BLOB NOT NULL REFERENCES content_catalog(content_id),
    amount INTEGER NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('pending','completed','failed','refunded')),
    settled INTEGER NOT NULL DEFAULT 0,
    settlement_reference TEXT,
    created_at INTEGER NOT NULL,
    UNIQUE (buyer, content_id)
);

CREATE INDEX IF NOT EXISTS idx_purchases_unsettled ON purchases(buyer, settled) WHERE settled = 0;

-- ============================================================
-- Creator Earnings
-- ============================================================

CREATE TABLE IF NOT EXISTS earnings (
    earning_id INTEGER PRIMARY KEY AUTOINCREMENT,
    creator TEXT NOT NULL REFERENCES accounts(account_id),
    content_id BLOB NOT NULL REFERENCES content_catalog(content_id),
    purchase_id INTEGER NOT NULL UNIQUE REFERENCES purchases(purchase_id),
    amount INTEGER NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('pending','claimed')),
    settlement_reference TEXT,
    payout_reference TEXT,
    claimed_at INTEGER,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_earnings_pending ON earnings(creator, status) WHERE status = 'pending';
"#;
