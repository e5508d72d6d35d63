use log::*;

use crate::{
    db_types::Order,
    mpe_api::order_objects::{OrderQueryFilter, OrderResult},
    traits::{OrderManagement, PaymentGatewayError},
};

/// The read-side API behind the buyer/seller order listings and lookups.
#[derive(Debug, Clone)]
pub struct OrderQueryApi<B> {
    db: B,
}

impl<B> OrderQueryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderQueryApi<B>
where B: OrderManagement
{
    pub async fn orders_for_buyer(&self, buyer_id: &str) -> Result<OrderResult, PaymentGatewayError> {
        let orders = self.db.search_orders(OrderQueryFilter::for_buyer(buyer_id)).await?;
        trace!("📋️ {} orders fetched for buyer {buyer_id}", orders.len());
        Ok(orders.into())
    }

    pub async fn orders_for_seller(&self, seller_id: &str) -> Result<OrderResult, PaymentGatewayError> {
        let orders = self.db.search_orders(OrderQueryFilter::for_seller(seller_id)).await?;
        trace!("📋️ {} orders fetched for seller {seller_id}", orders.len());
        Ok(orders.into())
    }

    /// Every order of the checkout identified by the gateway reference. Erroring on an unknown
    /// reference (rather than returning an empty list) keeps the endpoint's 404 honest.
    pub async fn orders_by_reference(&self, reference: &str) -> Result<Vec<Order>, PaymentGatewayError> {
        let orders = self.db.fetch_orders_by_reference(reference).await?;
        if orders.is_empty() {
            return Err(PaymentGatewayError::NoOrdersForReference(reference.to_string()));
        }
        Ok(orders)
    }

    /// A single order, visible only to its buyer or seller.
    pub async fn order_for_party(&self, user_id: &str, order_id: i64) -> Result<Order, PaymentGatewayError> {
        self.db
            .fetch_order_for_party(order_id, user_id)
            .await?
            .ok_or(PaymentGatewayError::OrderIdNotFound(order_id))
    }

    pub async fn purchased_products(&self, buyer_id: &str) -> Result<Vec<String>, PaymentGatewayError> {
        self.db.purchased_products(buyer_id).await
    }
}
