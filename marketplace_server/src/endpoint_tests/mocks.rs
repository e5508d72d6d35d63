use chrono::{TimeZone, Utc};
use marketplace_engine::{
    db_types::{
        DeliveryStatus,
        NewOrder,
        Order,
        OrderAction,
        OrderNumber,
        OrderStatusType,
        PaymentStatus,
        Wallet,
        WalletEntry,
    },
    order_objects::OrderQueryFilter,
    traits::{OrderManagement, PaymentGatewayDatabase, PaymentGatewayError, SettlementResult, WalletApiError, WalletManagement},
};
use mockall::mock;
use mps_common::Naira;

mock! {
    pub PaymentBackend {}

    impl Clone for PaymentBackend {
        fn clone(&self) -> Self;
    }

    impl OrderManagement for PaymentBackend {
        async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, PaymentGatewayError>;
        async fn fetch_order_for_party(&self, order_id: i64, user_id: &str) -> Result<Option<Order>, PaymentGatewayError>;
        async fn fetch_orders_by_reference(&self, reference: &str) -> Result<Vec<Order>, PaymentGatewayError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, PaymentGatewayError>;
        async fn purchased_products(&self, buyer_id: &str) -> Result<Vec<String>, PaymentGatewayError>;
    }

    impl WalletManagement for PaymentBackend {
        async fn fetch_wallet(&self, owner_id: &str) -> Result<Option<Wallet>, WalletApiError>;
        async fn fetch_wallet_entries(&self, owner_id: &str) -> Result<Vec<WalletEntry>, WalletApiError>;
    }

    impl PaymentGatewayDatabase for PaymentBackend {
        fn url(&self) -> &str;
        async fn insert_checkout_orders(&self, orders: Vec<NewOrder>) -> Result<Vec<Order>, PaymentGatewayError>;
        async fn attach_payment_reference(&self, order_ids: &[i64], reference: &str) -> Result<Vec<Order>, PaymentGatewayError>;
        async fn settle_orders_for_reference(&self, reference: &str) -> Result<SettlementResult, PaymentGatewayError>;
        async fn transition_order(&self, user_id: &str, order_id: i64, action: OrderAction) -> Result<Order, PaymentGatewayError>;
    }
}

/// A representative order for mock responses.
pub fn sample_order(id: i64) -> Order {
    Order {
        id,
        order_number: OrderNumber::from(format!("ORD-SAMPLE{id:04}")),
        buyer_id: "buyer-1".to_string(),
        seller_id: "seller-1".to_string(),
        product_id: "product-1".to_string(),
        quantity: 2,
        total_price: Naira::from(10_000),
        customer_name: "Ada Obi".to_string(),
        email: "ada@example.com".to_string(),
        address: "14 Allen Avenue, Ikeja".to_string(),
        phone: None,
        note: None,
        payment_reference: Some("ref-sample".to_string()),
        payment_status: PaymentStatus::Unpaid,
        status: OrderStatusType::Pending,
        delivery_status: DeliveryStatus::Pending,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        paid_at: None,
        shipped_date: None,
        delivered_date: None,
        received_date: None,
        cancelled_date: None,
    }
}

pub fn sample_wallet(owner: &str, balance: i64) -> Wallet {
    Wallet {
        id: 1,
        owner_id: owner.to_string(),
        balance: Naira::from(balance),
        total_sales: Naira::from(balance * 100 / 80),
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    }
}
