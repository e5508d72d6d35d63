use crate::{
    db_types::Order,
    mpe_api::order_objects::OrderQueryFilter,
    traits::PaymentGatewayError,
};

/// Read-only access to order records, used by the buyer/seller query endpoints and for the
/// defense-in-depth ownership checks in the lifecycle flow.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, PaymentGatewayError>;

    /// Fetches the order only if `user_id` is its buyer or seller.
    async fn fetch_order_for_party(&self, order_id: i64, user_id: &str) -> Result<Option<Order>, PaymentGatewayError>;

    /// All orders of one checkout (they share the gateway payment reference).
    async fn fetch_orders_by_reference(&self, reference: &str) -> Result<Vec<Order>, PaymentGatewayError>;

    /// Fetches orders matching the filter, ordered by creation time.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, PaymentGatewayError>;

    /// The ids of every product this buyer has successfully paid for.
    async fn purchased_products(&self, buyer_id: &str) -> Result<Vec<String>, PaymentGatewayError>;
}
