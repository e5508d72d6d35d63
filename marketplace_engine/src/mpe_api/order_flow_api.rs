use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewCheckout, NewOrder, Order, OrderAction},
    events::{EventProducers, OrderAnnulledEvent, OrderPaidEvent},
    helpers,
    traits::{PaymentGatewayDatabase, PaymentGatewayError, SettlementResult},
};

/// `OrderFlowApi` is the primary API for the order lifecycle: turning checkouts into per-seller
/// orders, reconciling gateway webhook events, and applying buyer/seller actions.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: PaymentGatewayDatabase
{
    /// Turns a validated checkout into persisted orders: one per cart line, grouped by seller.
    ///
    /// Every order starts `Pending`/`Unpaid` with no payment reference. The caller is expected
    /// to initialize the gateway transaction next and then stamp the orders via
    /// [`Self::attach_payment_reference`]. If the gateway call never succeeds, the orders simply
    /// stay unpaid.
    pub async fn create_checkout_orders(&self, checkout: NewCheckout) -> Result<Vec<Order>, PaymentGatewayError> {
        checkout.validate()?;
        let groups = helpers::group_cart_by_seller(&checkout.cart);
        let mut new_orders = Vec::with_capacity(checkout.cart.len());
        for (seller_id, lines) in groups {
            for line in lines {
                new_orders.push(NewOrder {
                    order_number: helpers::new_order_number(),
                    buyer_id: checkout.buyer_id.clone(),
                    seller_id: seller_id.clone(),
                    product_id: line.product.id.clone(),
                    quantity: line.quantity,
                    total_price: line.line_total(),
                    customer_name: checkout.customer_name.clone(),
                    email: checkout.email.clone(),
                    address: checkout.address.clone(),
                    phone: checkout.phone.clone(),
                    note: checkout.note.clone(),
                });
            }
        }
        let orders = self.db.insert_checkout_orders(new_orders).await?;
        debug!("🔄️📦️ Checkout for buyer {} created {} orders", checkout.buyer_id, orders.len());
        Ok(orders)
    }

    /// Stamps every order of a checkout with the gateway's transaction reference. One gateway
    /// transaction funds all of them.
    pub async fn attach_payment_reference(
        &self,
        order_ids: &[i64],
        reference: &str,
    ) -> Result<Vec<Order>, PaymentGatewayError> {
        let stamped = self.db.attach_payment_reference(order_ids, reference).await?;
        debug!("🔄️📦️ Payment reference {reference} attached to {} orders", stamped.len());
        Ok(stamped)
    }

    /// Handles a verified `charge.success` event: marks every still-unpaid order sharing the
    /// reference as paid and credits the sellers' wallets. Redelivering the same event is a
    /// no-op for orders that are already settled.
    ///
    /// Fires the order-paid hook once per newly settled order.
    pub async fn settle_orders_by_reference(&self, reference: &str) -> Result<SettlementResult, PaymentGatewayError> {
        let result = self.db.settle_orders_for_reference(reference).await?;
        self.call_order_paid_hook(&result.settled).await;
        debug!(
            "🔄️💰️ Settlement for reference {reference} complete. {} orders settled, {} skipped, {} credited.",
            result.settled.len(),
            result.skipped,
            result.total_credited(),
        );
        Ok(result)
    }

    /// Handles a verified `charge.failed` event. The order records are left untouched; the buyer
    /// can retry the checkout with a fresh transaction.
    pub async fn record_failed_charge(&self, reference: &str) {
        warn!("🔄️❌️ Charge failed for payment reference {reference}. No orders were modified.");
    }

    /// Applies a buyer/seller lifecycle action to a single order.
    ///
    /// | action  | precondition                              | effect                                    |
    /// |---------|-------------------------------------------|-------------------------------------------|
    /// | accept  | status=Pending                            | status=Confirmed, delivery=Pending        |
    /// | reject  | status=Pending                            | status+delivery=Cancelled, cancelled_date |
    /// | ship    | status=Confirmed AND delivery=Pending     | delivery=Shipped, shipped_date            |
    /// | deliver | delivery=Shipped                          | delivery=Delivered, delivered_date        |
    /// | receive | delivery=Delivered                        | delivery=Accepted, received_date          |
    ///
    /// The acting user must be the order's buyer or seller; this is re-verified here even though
    /// the HTTP layer has already authenticated the caller. A failed precondition is an explicit
    /// error, never a silent no-op.
    pub async fn mark_order_status(
        &self,
        user_id: &str,
        order_id: i64,
        action: OrderAction,
    ) -> Result<Order, PaymentGatewayError> {
        let order = self.db.transition_order(user_id, order_id, action).await?;
        info!("🔄️📦️ Order [{}]: '{action}' applied by {user_id}", order.order_number);
        if action == OrderAction::Reject {
            self.call_order_annulled_hook(&order).await;
        }
        Ok(order)
    }

    async fn call_order_paid_hook(&self, paid_orders: &[Order]) {
        for emitter in &self.producers.order_paid_producer {
            trace!("🔄️📦️ Notifying order paid hook subscribers");
            for order in paid_orders {
                let event = OrderPaidEvent::new(order.clone());
                emitter.publish_event(event).await;
            }
        }
    }

    async fn call_order_annulled_hook(&self, order: &Order) {
        for emitter in &self.producers.order_annulled_producer {
            trace!("🔄️📦️ Notifying order annulled hook subscribers");
            let event = OrderAnnulledEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }
}
