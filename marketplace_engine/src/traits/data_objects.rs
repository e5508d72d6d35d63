use mps_common::Naira;
use serde::{Deserialize, Serialize};

use crate::db_types::Order;

/// What one seller earned from one webhook settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerCredit {
    pub seller_id: String,
    /// Sum of the gross order amounts settled for this seller in this delivery.
    pub gross: Naira,
    /// The amount that actually landed on the wallet balance (the 80% share).
    pub credited: Naira,
}

/// The outcome of settling all orders that share one payment reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettlementResult {
    /// Orders that transitioned Unpaid → Paid in this delivery.
    pub settled: Vec<Order>,
    /// Orders that were already paid and were skipped. Non-zero on webhook redelivery.
    pub skipped: usize,
    /// Per-seller wallet credits applied in this delivery, in first-settled order.
    pub credits: Vec<SellerCredit>,
}

impl SettlementResult {
    pub fn total_credited(&self) -> Naira {
        self.credits.iter().map(|c| c.credited).sum()
    }
}
