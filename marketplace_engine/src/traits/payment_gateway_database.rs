use thiserror::Error;

use crate::{
    db_types::{CheckoutValidationError, NewOrder, Order, OrderAction, OrderNumber, TransitionError},
    traits::{data_objects::SettlementResult, OrderManagement, WalletApiError},
};

/// The write-side behaviour a backend must provide for the payment engine.
///
/// This covers:
/// * Persisting the per-seller line orders of a checkout.
/// * Stamping a checkout's orders with the gateway's payment reference.
/// * Settling orders when the gateway confirms a charge (idempotently, with wallet crediting).
/// * Applying buyer/seller lifecycle actions under the state-machine rules.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase: Clone + OrderManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Inserts one order per checkout line in a single atomic transaction.
    ///
    /// Every order starts as `Pending`/`Unpaid` with no payment reference. Returns the created
    /// records in insertion order.
    async fn insert_checkout_orders(&self, orders: Vec<NewOrder>) -> Result<Vec<Order>, PaymentGatewayError>;

    /// Stamps every listed order with the gateway reference in one statement, so the update is
    /// all-or-nothing from the caller's perspective. Returns the updated orders.
    async fn attach_payment_reference(
        &self,
        order_ids: &[i64],
        reference: &str,
    ) -> Result<Vec<Order>, PaymentGatewayError>;

    /// Settles every order that shares `reference`.
    ///
    /// Orders are processed sequentially. For each still-unpaid order, a single transaction:
    /// * marks it `Paid` and stamps `paid_at` (gated on the current payment status, so
    ///   redelivered webhooks are a no-op for settled orders),
    /// * credits the seller's wallet with their share and appends a `Credit` ledger entry for
    ///   the gross amount, creating the wallet if it does not exist yet,
    /// * records the product in the buyer's purchased set (deduplicated).
    ///
    /// A crash mid-batch leaves earlier orders fully settled and later ones untouched; the
    /// provider's retry then completes the remainder.
    async fn settle_orders_for_reference(&self, reference: &str) -> Result<SettlementResult, PaymentGatewayError>;

    /// Applies a lifecycle action to the order, provided that `user_id` is the order's buyer or
    /// seller and the state-machine precondition holds. The precondition is re-checked inside
    /// the UPDATE itself, so a concurrent transition cannot slip through. Date columns are only
    /// ever set once.
    async fn transition_order(
        &self,
        user_id: &str,
        order_id: i64,
        action: OrderAction,
    ) -> Result<Order, PaymentGatewayError>;
}

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("{0}")]
    CheckoutValidation(#[from] CheckoutValidationError),
    #[error("An order with number {0} already exists")]
    DuplicateOrderNumber(OrderNumber),
    #[error("The requested order (internal id {0}) does not exist")]
    OrderIdNotFound(i64),
    #[error("No orders found for payment reference {0}")]
    NoOrdersForReference(String),
    #[error("Order {order_id} does not belong to user {user_id}")]
    NotOrderParty { order_id: i64, user_id: String },
    #[error("{0}")]
    CannotTransition(#[from] TransitionError),
    #[error("{0}")]
    WalletError(#[from] WalletApiError),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}
