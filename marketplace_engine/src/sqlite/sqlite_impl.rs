//! `SqliteDatabase` is the concrete SQLite implementation of the engine's backend traits.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{new_pool, orders, purchases, wallets};
use crate::{
    db_types::{NewOrder, Order, OrderAction, Wallet, WalletEntry},
    helpers,
    mpe_api::order_objects::OrderQueryFilter,
    traits::{
        OrderManagement,
        PaymentGatewayDatabase,
        PaymentGatewayError,
        SellerCredit,
        SettlementResult,
        WalletApiError,
        WalletManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_for_party(&self, order_id: i64, user_id: &str) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_for_party(order_id, user_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_by_reference(&self, reference: &str) -> Result<Vec<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let matches = orders::fetch_orders_by_reference(reference, &mut conn).await?;
        Ok(matches)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let matches = orders::search_orders(query, &mut conn).await?;
        Ok(matches)
    }

    async fn purchased_products(&self, buyer_id: &str) -> Result<Vec<String>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        purchases::purchased_product_ids(buyer_id, &mut conn).await
    }
}

impl WalletManagement for SqliteDatabase {
    async fn fetch_wallet(&self, owner_id: &str) -> Result<Option<Wallet>, WalletApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| WalletApiError::DatabaseError(e.to_string()))?;
        wallets::fetch_wallet_by_owner(owner_id, &mut conn).await
    }

    async fn fetch_wallet_entries(&self, owner_id: &str) -> Result<Vec<WalletEntry>, WalletApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| WalletApiError::DatabaseError(e.to_string()))?;
        let wallet = wallets::fetch_wallet_by_owner(owner_id, &mut conn)
            .await?
            .ok_or_else(|| WalletApiError::WalletNotFound(owner_id.to_string()))?;
        wallets::fetch_entries(wallet.id, &mut conn).await
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_checkout_orders(&self, new_orders: Vec<NewOrder>) -> Result<Vec<Order>, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(new_orders.len());
        for order in new_orders {
            let order = orders::insert_order(order, &mut tx).await?;
            created.push(order);
        }
        tx.commit().await?;
        debug!("🗃️ {} checkout orders have been saved in the DB", created.len());
        Ok(created)
    }

    async fn attach_payment_reference(
        &self,
        order_ids: &[i64],
        reference: &str,
    ) -> Result<Vec<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let stamped = orders::attach_payment_reference(order_ids, reference, &mut conn).await?;
        debug!("🗃️ {} orders stamped with payment reference {reference}", stamped.len());
        Ok(stamped)
    }

    async fn settle_orders_for_reference(&self, reference: &str) -> Result<SettlementResult, PaymentGatewayError> {
        let matched = {
            let mut conn = self.pool.acquire().await?;
            orders::fetch_orders_by_reference(reference, &mut conn).await?
        };
        if matched.is_empty() {
            return Err(PaymentGatewayError::NoOrdersForReference(reference.to_string()));
        }
        let mut result = SettlementResult::default();
        // Orders are settled strictly one at a time. Each iteration commits (order paid + wallet
        // credited + purchase recorded) as one transaction, so a crash leaves earlier orders
        // fully settled and later ones untouched for the provider's retry.
        for order in matched {
            if order.is_paid() {
                trace!("🗃️ Order [{}] is already settled. Skipping.", order.order_number);
                result.skipped += 1;
                continue;
            }
            let mut tx = self.pool.begin().await?;
            let Some(paid) = orders::mark_order_paid(order.id, &mut tx).await? else {
                // A concurrent delivery settled this order between our fetch and the update.
                result.skipped += 1;
                continue;
            };
            let share = helpers::seller_share(paid.total_price);
            let wallet = wallets::fetch_or_create_wallet(&paid.seller_id, &mut tx).await?;
            wallets::credit_wallet(wallet.id, paid.total_price, share, &mut tx).await?;
            purchases::record_purchase(&paid.buyer_id, &paid.product_id, &mut tx).await?;
            tx.commit().await?;
            debug!("🗃️ Order [{}] settled. {share} credited to seller {}", paid.order_number, paid.seller_id);
            match result.credits.iter_mut().find(|c| c.seller_id == paid.seller_id) {
                Some(credit) => {
                    credit.gross += paid.total_price;
                    credit.credited += share;
                },
                None => result.credits.push(SellerCredit {
                    seller_id: paid.seller_id.clone(),
                    gross: paid.total_price,
                    credited: share,
                }),
            }
            result.settled.push(paid);
        }
        Ok(result)
    }

    async fn transition_order(
        &self,
        user_id: &str,
        order_id: i64,
        action: OrderAction,
    ) -> Result<Order, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_id(order_id, &mut tx)
            .await?
            .ok_or(PaymentGatewayError::OrderIdNotFound(order_id))?;
        if order.buyer_id != user_id && order.seller_id != user_id {
            return Err(PaymentGatewayError::NotOrderParty { order_id, user_id: user_id.to_string() });
        }
        order.check_action(action)?;
        // The UPDATE re-checks the precondition, so a concurrent transition between the fetch
        // and this statement surfaces as a conflict rather than a silent overwrite.
        let updated = orders::apply_action(order_id, action, &mut tx).await?.ok_or_else(|| {
            PaymentGatewayError::CannotTransition(crate::db_types::TransitionError {
                action,
                status: order.status,
                delivery_status: order.delivery_status,
            })
        })?;
        tx.commit().await?;
        debug!("🗃️ Order [{}]: applied '{action}'. Now {}/{}", updated.order_number, updated.status, updated.delivery_status);
        Ok(updated)
    }
}
