use thiserror::Error;

use crate::db_types::{Wallet, WalletEntry};

/// Read access to the per-seller wallet ledger. Crediting is not exposed here: wallets are only
/// ever written as part of webhook settlement, inside the same transaction that marks the order
/// paid.
#[allow(async_fn_in_trait)]
pub trait WalletManagement {
    async fn fetch_wallet(&self, owner_id: &str) -> Result<Option<Wallet>, WalletApiError>;

    /// The full transaction log for the seller's wallet, newest first.
    async fn fetch_wallet_entries(&self, owner_id: &str) -> Result<Vec<WalletEntry>, WalletApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum WalletApiError {
    #[error("Wallet database error: {0}")]
    DatabaseError(String),
    #[error("No wallet exists for seller {0}")]
    WalletNotFound(String),
}

impl From<sqlx::Error> for WalletApiError {
    fn from(e: sqlx::Error) -> Self {
        WalletApiError::DatabaseError(e.to_string())
    }
}
