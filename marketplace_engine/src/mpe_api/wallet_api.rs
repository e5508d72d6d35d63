use mps_common::Naira;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Wallet, WalletEntry},
    helpers,
    traits::{WalletApiError, WalletManagement},
};

/// Read access to seller wallets for the earnings endpoints.
#[derive(Debug, Clone)]
pub struct WalletApi<B> {
    db: B,
}

/// What a seller has earned to date, with the platform split made explicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsSummary {
    /// Gross value of all credited orders.
    pub total_sales: Naira,
    /// The seller's 80% share (this is what the balance accumulates).
    pub payout: Naira,
    /// The platform's 20% share.
    pub platform_share: Naira,
}

impl<B> WalletApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> WalletApi<B>
where B: WalletManagement
{
    /// The seller's wallet. Errors with `WalletNotFound` if they have never been credited.
    pub async fn wallet(&self, owner_id: &str) -> Result<Wallet, WalletApiError> {
        self.db.fetch_wallet(owner_id).await?.ok_or_else(|| WalletApiError::WalletNotFound(owner_id.to_string()))
    }

    pub async fn balance(&self, owner_id: &str) -> Result<Naira, WalletApiError> {
        Ok(self.wallet(owner_id).await?.balance)
    }

    pub async fn transactions(&self, owner_id: &str) -> Result<Vec<WalletEntry>, WalletApiError> {
        self.db.fetch_wallet_entries(owner_id).await
    }

    pub async fn earnings_summary(&self, owner_id: &str) -> Result<EarningsSummary, WalletApiError> {
        let wallet = self.wallet(owner_id).await?;
        Ok(EarningsSummary {
            total_sales: wallet.total_sales,
            payout: helpers::seller_share(wallet.total_sales),
            platform_share: helpers::platform_fee(wallet.total_sales),
        })
    }
}
