//! Settlement (webhook reconciliation) checks: idempotency, the 80/20 split, wallet ledger
//! state and the buyer's purchased-products set.
use marketplace_engine::{
    db_types::{CartLine, CartProduct, EntryType, NewCheckout, PaymentStatus},
    events::EventProducers,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    OrderFlowApi,
    OrderManagement,
    PaymentGatewayError,
    SqliteDatabase,
    WalletApi,
    WalletManagement,
};
use mps_common::Naira;

fn line(product_id: &str, seller_id: &str, price: i64, quantity: i64) -> CartLine {
    CartLine {
        product: CartProduct { id: product_id.into(), price: Naira::from(price), seller_id: seller_id.into() },
        quantity,
    }
}

async fn new_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

/// Creates a checkout for `buyer`, stamps it with `reference` and returns the order ids.
async fn prepare_checkout(
    api: &OrderFlowApi<SqliteDatabase>,
    buyer: &str,
    reference: &str,
    cart: Vec<CartLine>,
) -> Vec<i64> {
    let checkout = NewCheckout {
        buyer_id: buyer.into(),
        email: format!("{buyer}@example.com"),
        customer_name: "Ada Obi".into(),
        address: "14 Allen Avenue, Ikeja".into(),
        phone: None,
        note: None,
        cart,
    };
    let orders = api.create_checkout_orders(checkout).await.expect("checkout failed");
    let ids = orders.iter().map(|o| o.id).collect::<Vec<_>>();
    api.attach_payment_reference(&ids, reference).await.expect("stamping failed");
    ids
}

#[tokio::test]
async fn settlement_pays_all_matched_orders_and_credits_each_seller() {
    let db = new_db().await;
    let api = OrderFlowApi::new(db.clone(), EventProducers::default());
    let cart = vec![
        line("p1", "seller-a", 10_000, 1), // 10,000 gross → 8,000 share
        line("p2", "seller-b", 2_000, 3),  //  6,000 gross → 4,800 share
        line("p3", "seller-a", 500, 2),    //  1,000 gross →   800 share
    ];
    prepare_checkout(&api, "buyer-1", "ref-settle-1", cart).await;

    let result = api.settle_orders_by_reference("ref-settle-1").await.expect("settlement failed");
    assert_eq!(result.settled.len(), 3);
    assert_eq!(result.skipped, 0);
    assert!(result.settled.iter().all(|o| o.payment_status == PaymentStatus::Paid && o.paid_at.is_some()));

    let wallets = WalletApi::new(db.clone());
    assert_eq!(wallets.balance("seller-a").await.unwrap(), Naira::from(8_800));
    assert_eq!(wallets.balance("seller-b").await.unwrap(), Naira::from(4_800));

    // One Credit ledger row per settled order, recording the gross amount
    let entries = wallets.transactions("seller-a").await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.entry_type == EntryType::Credit));
    let gross: Naira = entries.iter().map(|e| e.amount).sum();
    assert_eq!(gross, Naira::from(11_000));

    let summary = wallets.earnings_summary("seller-a").await.unwrap();
    assert_eq!(summary.total_sales, Naira::from(11_000));
    assert_eq!(summary.payout, Naira::from(8_800));
    assert_eq!(summary.platform_share, Naira::from(2_200));

    // The buyer now owns the purchased products, deduplicated
    let products = db.purchased_products("buyer-1").await.unwrap();
    assert_eq!(products.len(), 3);
    assert!(products.contains(&"p1".to_string()));
}

#[tokio::test]
async fn redelivering_the_same_webhook_is_a_no_op() {
    let db = new_db().await;
    let api = OrderFlowApi::new(db.clone(), EventProducers::default());
    prepare_checkout(&api, "buyer-2", "ref-settle-2", vec![line("p1", "seller-a", 5_000, 1)]).await;

    let first = api.settle_orders_by_reference("ref-settle-2").await.expect("settlement failed");
    assert_eq!(first.settled.len(), 1);
    let paid_at = first.settled[0].paid_at.expect("paid_at must be set");

    let second = api.settle_orders_by_reference("ref-settle-2").await.expect("redelivery failed");
    assert!(second.settled.is_empty());
    assert_eq!(second.skipped, 1);
    assert!(second.credits.is_empty());

    // Balance unchanged, paid_at not re-stamped, still exactly one ledger row
    let wallets = WalletApi::new(db.clone());
    assert_eq!(wallets.balance("seller-a").await.unwrap(), Naira::from(4_000));
    assert_eq!(wallets.transactions("seller-a").await.unwrap().len(), 1);
    let order = db.fetch_orders_by_reference("ref-settle-2").await.unwrap().remove(0);
    assert_eq!(order.paid_at, Some(paid_at));
}

#[tokio::test]
async fn unknown_references_are_reported_not_fabricated() {
    let db = new_db().await;
    let api = OrderFlowApi::new(db, EventProducers::default());
    let err = api.settle_orders_by_reference("ref-never-seen").await.expect_err("expected not-found");
    assert!(matches!(err, PaymentGatewayError::NoOrdersForReference(r) if r == "ref-never-seen"));
}

#[tokio::test]
async fn repeat_purchases_do_not_duplicate_the_product_set() {
    let db = new_db().await;
    let api = OrderFlowApi::new(db.clone(), EventProducers::default());
    prepare_checkout(&api, "buyer-3", "ref-settle-3", vec![line("p9", "seller-a", 1_000, 1)]).await;
    prepare_checkout(&api, "buyer-3", "ref-settle-4", vec![line("p9", "seller-a", 1_000, 1)]).await;
    api.settle_orders_by_reference("ref-settle-3").await.expect("settlement failed");
    api.settle_orders_by_reference("ref-settle-4").await.expect("settlement failed");

    let products = db.purchased_products("buyer-3").await.unwrap();
    assert_eq!(products, vec!["p9".to_string()]);
    // Both orders were still credited: purchase dedup does not affect the ledger
    let wallet = db.fetch_wallet("seller-a").await.unwrap().expect("wallet should exist");
    assert_eq!(wallet.balance, Naira::from(1_600));
}
