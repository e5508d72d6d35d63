//! Order status state-machine checks: the accept/reject/ship/deliver/receive chain, the date
//! stamps, and rejection of out-of-sequence actions.
use marketplace_engine::{
    db_types::{CartLine, CartProduct, DeliveryStatus, NewCheckout, OrderAction, OrderStatusType},
    events::EventProducers,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    OrderFlowApi,
    PaymentGatewayError,
    SqliteDatabase,
};
use mps_common::Naira;

const BUYER: &str = "buyer-1";
const SELLER: &str = "seller-1";

async fn api_with_order() -> (OrderFlowApi<SqliteDatabase>, i64) {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    let api = OrderFlowApi::new(db, EventProducers::default());
    let checkout = NewCheckout {
        buyer_id: BUYER.into(),
        email: "buyer@example.com".into(),
        customer_name: "Ada Obi".into(),
        address: "14 Allen Avenue, Ikeja".into(),
        phone: None,
        note: None,
        cart: vec![CartLine {
            product: CartProduct { id: "p1".into(), price: Naira::from(2_000), seller_id: SELLER.into() },
            quantity: 1,
        }],
    };
    let orders = api.create_checkout_orders(checkout).await.expect("checkout failed");
    let id = orders[0].id;
    (api, id)
}

#[tokio::test]
async fn the_happy_path_walks_the_full_delivery_chain() {
    let (api, id) = api_with_order().await;

    let order = api.mark_order_status(SELLER, id, OrderAction::Accept).await.expect("accept failed");
    assert_eq!(order.status, OrderStatusType::Confirmed);
    assert_eq!(order.delivery_status, DeliveryStatus::Pending);

    let order = api.mark_order_status(SELLER, id, OrderAction::Ship).await.expect("ship failed");
    assert_eq!(order.delivery_status, DeliveryStatus::Shipped);
    assert!(order.shipped_date.is_some());
    assert!(order.delivered_date.is_none());

    let order = api.mark_order_status(SELLER, id, OrderAction::Deliver).await.expect("deliver failed");
    assert_eq!(order.delivery_status, DeliveryStatus::Delivered);
    assert!(order.delivered_date.is_some());

    let order = api.mark_order_status(BUYER, id, OrderAction::Receive).await.expect("receive failed");
    assert_eq!(order.delivery_status, DeliveryStatus::Accepted);
    assert!(order.received_date.is_some());
    assert!(order.cancelled_date.is_none());
}

#[tokio::test]
async fn rejection_cancels_the_order_and_blocks_further_actions() {
    let (api, id) = api_with_order().await;

    let order = api.mark_order_status(SELLER, id, OrderAction::Reject).await.expect("reject failed");
    assert_eq!(order.status, OrderStatusType::Cancelled);
    assert_eq!(order.delivery_status, DeliveryStatus::Cancelled);
    assert!(order.cancelled_date.is_some());

    let err = api.mark_order_status(SELLER, id, OrderAction::Ship).await.expect_err("ship must fail");
    assert!(matches!(err, PaymentGatewayError::CannotTransition(_)));
    let err = api.mark_order_status(SELLER, id, OrderAction::Accept).await.expect_err("accept must fail");
    assert!(matches!(err, PaymentGatewayError::CannotTransition(_)));
}

#[tokio::test]
async fn actions_out_of_sequence_are_rejected_without_mutation() {
    let (api, id) = api_with_order().await;

    // ship before accept
    let err = api.mark_order_status(SELLER, id, OrderAction::Ship).await.expect_err("ship must fail");
    assert!(matches!(err, PaymentGatewayError::CannotTransition(_)));
    // deliver before ship
    api.mark_order_status(SELLER, id, OrderAction::Accept).await.expect("accept failed");
    let err = api.mark_order_status(SELLER, id, OrderAction::Deliver).await.expect_err("deliver must fail");
    assert!(matches!(err, PaymentGatewayError::CannotTransition(_)));
    // receive before deliver
    api.mark_order_status(SELLER, id, OrderAction::Ship).await.expect("ship failed");
    let err = api.mark_order_status(BUYER, id, OrderAction::Receive).await.expect_err("receive must fail");
    assert!(matches!(err, PaymentGatewayError::CannotTransition(_)));
    // double-accept is also a conflict, not a silent no-op
    let err = api.mark_order_status(SELLER, id, OrderAction::Accept).await.expect_err("accept must fail");
    assert!(matches!(err, PaymentGatewayError::CannotTransition(_)));
}

#[tokio::test]
async fn only_the_orders_buyer_or_seller_may_act_on_it() {
    let (api, id) = api_with_order().await;
    let err = api.mark_order_status("some-other-user", id, OrderAction::Accept).await.expect_err("must be rejected");
    assert!(matches!(err, PaymentGatewayError::NotOrderParty { .. }));

    let err = api.mark_order_status(SELLER, 999_999, OrderAction::Accept).await.expect_err("must be not-found");
    assert!(matches!(err, PaymentGatewayError::OrderIdNotFound(999_999)));
}
