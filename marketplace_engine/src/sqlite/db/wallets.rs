use log::trace;
use mps_common::Naira;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Wallet, WalletEntry},
    traits::WalletApiError,
};

pub async fn fetch_wallet_by_owner(
    owner_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Wallet>, WalletApiError> {
    let wallet =
        sqlx::query_as("SELECT * FROM wallets WHERE owner_id = $1").bind(owner_id).fetch_optional(conn).await?;
    Ok(wallet)
}

/// Returns the seller's wallet, creating an empty one first if they have never been credited.
/// The no-op upsert makes the statement return a row in both cases.
pub async fn fetch_or_create_wallet(owner_id: &str, conn: &mut SqliteConnection) -> Result<Wallet, WalletApiError> {
    let wallet = sqlx::query_as(
        r#"
            INSERT INTO wallets (owner_id) VALUES ($1)
            ON CONFLICT (owner_id) DO UPDATE SET owner_id = owner_id
            RETURNING *;
        "#,
    )
    .bind(owner_id)
    .fetch_one(conn)
    .await?;
    Ok(wallet)
}

/// Adds `share` to the balance, `gross` to the running sales total, and appends the matching
/// `Credit` ledger row. Call inside the same transaction that marks the order paid.
pub async fn credit_wallet(
    wallet_id: i64,
    gross: Naira,
    share: Naira,
    conn: &mut SqliteConnection,
) -> Result<Wallet, WalletApiError> {
    let wallet: Wallet = sqlx::query_as(
        r#"
            UPDATE wallets
            SET balance = balance + $1, total_sales = total_sales + $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $3
            RETURNING *;
        "#,
    )
    .bind(share)
    .bind(gross)
    .bind(wallet_id)
    .fetch_one(&mut *conn)
    .await?;
    sqlx::query("INSERT INTO wallet_entries (wallet_id, amount, entry_type) VALUES ($1, $2, 'Credit')")
        .bind(wallet_id)
        .bind(gross)
        .execute(conn)
        .await?;
    trace!("💰️ Wallet #{wallet_id} credited with {share} ({gross} gross)");
    Ok(wallet)
}

/// The wallet's ledger, newest entries first.
pub async fn fetch_entries(wallet_id: i64, conn: &mut SqliteConnection) -> Result<Vec<WalletEntry>, WalletApiError> {
    let entries = sqlx::query_as("SELECT * FROM wallet_entries WHERE wallet_id = $1 ORDER BY id DESC")
        .bind(wallet_id)
        .fetch_all(conn)
        .await?;
    Ok(entries)
}
