//! End-to-end checks for the checkout → order-creation flow against a real SQLite database.
use marketplace_engine::{
    db_types::{CartLine, CartProduct, CheckoutValidationError, DeliveryStatus, NewCheckout, OrderStatusType, PaymentStatus},
    events::EventProducers,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    OrderFlowApi,
    PaymentGatewayError,
    SqliteDatabase,
};
use mps_common::Naira;

fn line(product_id: &str, seller_id: &str, price: i64, quantity: i64) -> CartLine {
    CartLine {
        product: CartProduct { id: product_id.into(), price: Naira::from(price), seller_id: seller_id.into() },
        quantity,
    }
}

fn checkout(buyer: &str, cart: Vec<CartLine>) -> NewCheckout {
    NewCheckout {
        buyer_id: buyer.into(),
        email: format!("{buyer}@example.com"),
        customer_name: "Ada Obi".into(),
        address: "14 Allen Avenue, Ikeja".into(),
        phone: Some("+2348000000001".into()),
        note: None,
        cart,
    }
}

async fn new_api() -> OrderFlowApi<SqliteDatabase> {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    OrderFlowApi::new(db, EventProducers::default())
}

#[tokio::test]
async fn checkout_creates_one_order_per_line_grouped_by_seller() {
    let api = new_api().await;
    let cart = vec![line("p1", "seller-a", 5_000, 2), line("p2", "seller-b", 3_000, 1)];
    let orders = api.create_checkout_orders(checkout("buyer-1", cart)).await.expect("checkout failed");

    assert_eq!(orders.len(), 2);
    let by_seller_a = orders.iter().find(|o| o.seller_id == "seller-a").unwrap();
    let by_seller_b = orders.iter().find(|o| o.seller_id == "seller-b").unwrap();
    assert_eq!(by_seller_a.total_price, Naira::from(10_000));
    assert_eq!(by_seller_b.total_price, Naira::from(3_000));
    for order in &orders {
        assert_eq!(order.status, OrderStatusType::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        assert_eq!(order.delivery_status, DeliveryStatus::Pending);
        assert!(order.payment_reference.is_none());
        assert!(order.order_number.as_str().starts_with("ORD-"));
        assert_eq!(order.buyer_id, "buyer-1");
    }
    let numbers: std::collections::HashSet<_> = orders.iter().map(|o| o.order_number.as_str()).collect();
    assert_eq!(numbers.len(), orders.len(), "order numbers must be unique");
}

#[tokio::test]
async fn all_orders_of_a_checkout_share_one_payment_reference() {
    let api = new_api().await;
    let cart = vec![
        line("p1", "seller-a", 2_500, 1),
        line("p2", "seller-b", 1_000, 3),
        line("p3", "seller-a", 400, 5),
    ];
    let orders = api.create_checkout_orders(checkout("buyer-2", cart)).await.expect("checkout failed");
    assert_eq!(orders.len(), 3);

    let ids = orders.iter().map(|o| o.id).collect::<Vec<_>>();
    let stamped = api.attach_payment_reference(&ids, "ref-abc123").await.expect("stamping failed");
    assert_eq!(stamped.len(), 3);
    for order in &stamped {
        assert_eq!(order.payment_reference.as_deref(), Some("ref-abc123"));
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    }
}

#[tokio::test]
async fn invalid_checkouts_are_rejected_before_anything_is_persisted() {
    let api = new_api().await;
    let bad_quantity = checkout("buyer-3", vec![line("p1", "seller-a", 100, 0)]);
    let err = api.create_checkout_orders(bad_quantity).await.expect_err("expected validation error");
    assert!(matches!(
        err,
        PaymentGatewayError::CheckoutValidation(CheckoutValidationError::InvalidQuantity { .. })
    ));

    let no_seller = checkout("buyer-3", vec![line("p1", "", 100, 1)]);
    let err = api.create_checkout_orders(no_seller).await.expect_err("expected validation error");
    assert!(matches!(err, PaymentGatewayError::CheckoutValidation(CheckoutValidationError::MissingSeller(_))));

    let empty = checkout("buyer-3", vec![]);
    let err = api.create_checkout_orders(empty).await.expect_err("expected validation error");
    assert!(matches!(err, PaymentGatewayError::CheckoutValidation(CheckoutValidationError::EmptyCart)));
}
