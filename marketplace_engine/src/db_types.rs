use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use mps_common::Naira;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(pub String);

//--------------------------------------   OrderNumber   -------------------------------------------------------------
/// The human-readable order identifier that buyers and sellers see (`ORD-XXXXXXXXXX`).
/// Unique across the orders table; the integer row id stays internal.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderNumber(pub String);

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for OrderNumber {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------  OrderStatusType  -----------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// Newly created; the seller has not reacted to the order yet.
    Pending,
    /// The seller accepted the order and fulfilment may begin.
    Confirmed,
    /// The order was rejected. Terminal.
    Cancelled,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Confirmed => write!(f, "Confirmed"),
            OrderStatusType::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Confirmed" => Ok(Self::Confirmed),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------   PaymentStatus   -----------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatus {
    Unpaid,
    /// Set exactly once, by webhook settlement, after signature verification.
    Paid,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Unpaid => write!(f, "Unpaid"),
            PaymentStatus::Paid => write!(f, "Paid"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unpaid" => Ok(Self::Unpaid),
            "Paid" => Ok(Self::Paid),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------  DeliveryStatus   -----------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum DeliveryStatus {
    Pending,
    Shipped,
    Delivered,
    /// The buyer confirmed receipt of the goods. Terminal.
    Accepted,
    /// Only reachable from `Pending`, in lockstep with the order being cancelled. Terminal.
    Cancelled,
}

impl Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Pending => write!(f, "Pending"),
            DeliveryStatus::Shipped => write!(f, "Shipped"),
            DeliveryStatus::Delivered => write!(f, "Delivered"),
            DeliveryStatus::Accepted => write!(f, "Accepted"),
            DeliveryStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Accepted" => Ok(Self::Accepted),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid delivery status: {s}"))),
        }
    }
}

//--------------------------------------    OrderAction    -----------------------------------------------------------
/// The buyer/seller-initiated actions that drive the order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderAction {
    Accept,
    Reject,
    Ship,
    Deliver,
    Receive,
}

impl Display for OrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderAction::Accept => write!(f, "accept"),
            OrderAction::Reject => write!(f, "reject"),
            OrderAction::Ship => write!(f, "ship"),
            OrderAction::Deliver => write!(f, "deliver"),
            OrderAction::Receive => write!(f, "receive"),
        }
    }
}

impl FromStr for OrderAction {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            "ship" => Ok(Self::Ship),
            "deliver" => Ok(Self::Deliver),
            "receive" => Ok(Self::Receive),
            s => Err(ConversionError(format!("Invalid order action: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Cannot {action} order while status is {status} and delivery status is {delivery_status}")]
pub struct TransitionError {
    pub action: OrderAction,
    pub status: OrderStatusType,
    pub delivery_status: DeliveryStatus,
}

//--------------------------------------       Order       -----------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: OrderNumber,
    pub buyer_id: String,
    pub seller_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// quantity × unit price at creation time. A snapshot, not a live join.
    pub total_price: Naira,
    pub customer_name: String,
    pub email: String,
    pub address: String,
    pub phone: Option<String>,
    pub note: Option<String>,
    /// Shared by every order of one checkout. NULL until gateway initialization succeeds.
    pub payment_reference: Option<String>,
    pub payment_status: PaymentStatus,
    pub status: OrderStatusType,
    pub delivery_status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub shipped_date: Option<DateTime<Utc>>,
    pub delivered_date: Option<DateTime<Utc>>,
    pub received_date: Option<DateTime<Utc>>,
    pub cancelled_date: Option<DateTime<Utc>>,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Checks the state-machine precondition for `action` without mutating anything.
    ///
    /// | action  | precondition                               |
    /// |---------|--------------------------------------------|
    /// | accept  | status = Pending                           |
    /// | reject  | status = Pending                           |
    /// | ship    | status = Confirmed AND delivery = Pending  |
    /// | deliver | delivery = Shipped                         |
    /// | receive | delivery = Delivered                       |
    pub fn check_action(&self, action: OrderAction) -> Result<(), TransitionError> {
        use OrderAction::*;
        let allowed = match action {
            Accept | Reject => self.status == OrderStatusType::Pending,
            Ship => self.status == OrderStatusType::Confirmed && self.delivery_status == DeliveryStatus::Pending,
            Deliver => self.delivery_status == DeliveryStatus::Shipped,
            Receive => self.delivery_status == DeliveryStatus::Delivered,
        };
        if allowed {
            Ok(())
        } else {
            Err(TransitionError { action, status: self.status, delivery_status: self.delivery_status })
        }
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order {} ({} x {} for {}, buyer {}, seller {}, {}/{}/{})",
            self.order_number,
            self.quantity,
            self.product_id,
            self.total_price,
            self.buyer_id,
            self.seller_id,
            self.status,
            self.payment_status,
            self.delivery_status,
        )
    }
}

//--------------------------------------     NewOrder      -----------------------------------------------------------
/// A single line of a checkout, ready for insertion. Built by the order-grouping step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub order_number: OrderNumber,
    pub buyer_id: String,
    pub seller_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub total_price: Naira,
    pub customer_name: String,
    pub email: String,
    pub address: String,
    pub phone: Option<String>,
    pub note: Option<String>,
}

//--------------------------------------    Cart types     -----------------------------------------------------------
/// The product snapshot that the cart service attaches to every line at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: String,
    /// Unit price in kobo at the time the line was added to the cart.
    pub price: Naira,
    pub seller_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: CartProduct,
    pub quantity: i64,
}

impl CartLine {
    pub fn line_total(&self) -> Naira {
        self.product.price * self.quantity
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutValidationError {
    #[error("Checkout cart is empty")]
    EmptyCart,
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: String, quantity: i64 },
    #[error("Product {0} does not have a seller attached")]
    MissingSeller(String),
    #[error("Product {product_id} has a negative price of {price}")]
    NegativePrice { product_id: String, price: Naira },
}

/// A validated checkout command. Built at the HTTP boundary; the engine never sees untyped data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCheckout {
    pub buyer_id: String,
    pub email: String,
    pub customer_name: String,
    pub address: String,
    pub phone: Option<String>,
    pub note: Option<String>,
    pub cart: Vec<CartLine>,
}

impl NewCheckout {
    /// Rejects the whole checkout before anything is persisted.
    pub fn validate(&self) -> Result<(), CheckoutValidationError> {
        if self.cart.is_empty() {
            return Err(CheckoutValidationError::EmptyCart);
        }
        for line in &self.cart {
            if line.quantity <= 0 {
                return Err(CheckoutValidationError::InvalidQuantity {
                    product_id: line.product.id.clone(),
                    quantity: line.quantity,
                });
            }
            if line.product.seller_id.trim().is_empty() {
                return Err(CheckoutValidationError::MissingSeller(line.product.id.clone()));
            }
            if line.product.price.value() < 0 {
                return Err(CheckoutValidationError::NegativePrice {
                    product_id: line.product.id.clone(),
                    price: line.product.price,
                });
            }
        }
        Ok(())
    }

    /// The amount the gateway charges for the whole checkout.
    pub fn total_amount(&self) -> Naira {
        self.cart.iter().map(CartLine::line_total).sum()
    }
}

//--------------------------------------      Wallet       -----------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub owner_id: String,
    /// The seller's spendable share, in kobo.
    pub balance: Naira,
    /// Gross value of all credited orders, before the platform fee.
    pub total_sales: Naira,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum EntryType {
    Credit,
    Debit,
    Refund,
}

impl Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryType::Credit => write!(f, "Credit"),
            EntryType::Debit => write!(f, "Debit"),
            EntryType::Refund => write!(f, "Refund"),
        }
    }
}

impl FromStr for EntryType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Credit" => Ok(Self::Credit),
            "Debit" => Ok(Self::Debit),
            "Refund" => Ok(Self::Refund),
            s => Err(ConversionError(format!("Invalid wallet entry type: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum EntryStatus {
    Pending,
    Completed,
    Failed,
}

impl Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Pending => write!(f, "Pending"),
            EntryStatus::Completed => write!(f, "Completed"),
            EntryStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// One row of the append-only wallet ledger. For credits, `amount` records the gross order
/// amount; the seller's share is what lands on the balance.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct WalletEntry {
    pub id: i64,
    pub wallet_id: i64,
    pub amount: Naira,
    pub entry_type: EntryType,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------       Role        -----------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Buyer => write!(f, "buyer"),
            Role::Seller => write!(f, "seller"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            "admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn order(status: OrderStatusType, delivery: DeliveryStatus) -> Order {
        Order {
            id: 1,
            order_number: OrderNumber::from("ORD-TEST000001".to_string()),
            buyer_id: "buyer-1".into(),
            seller_id: "seller-1".into(),
            product_id: "product-1".into(),
            quantity: 2,
            total_price: Naira::from(10_000),
            customer_name: "Ada".into(),
            email: "ada@example.com".into(),
            address: "1 Marina Rd".into(),
            phone: None,
            note: None,
            payment_reference: None,
            payment_status: PaymentStatus::Unpaid,
            status,
            delivery_status: delivery,
            created_at: Default::default(),
            updated_at: Default::default(),
            paid_at: None,
            shipped_date: None,
            delivered_date: None,
            received_date: None,
            cancelled_date: None,
        }
    }

    #[test]
    fn accept_and_reject_require_a_pending_order() {
        let pending = order(OrderStatusType::Pending, DeliveryStatus::Pending);
        assert!(pending.check_action(OrderAction::Accept).is_ok());
        assert!(pending.check_action(OrderAction::Reject).is_ok());
        let confirmed = order(OrderStatusType::Confirmed, DeliveryStatus::Pending);
        assert!(confirmed.check_action(OrderAction::Accept).is_err());
        assert!(confirmed.check_action(OrderAction::Reject).is_err());
        let cancelled = order(OrderStatusType::Cancelled, DeliveryStatus::Cancelled);
        assert!(cancelled.check_action(OrderAction::Accept).is_err());
    }

    #[test]
    fn ship_requires_confirmed_and_delivery_pending() {
        assert!(order(OrderStatusType::Confirmed, DeliveryStatus::Pending).check_action(OrderAction::Ship).is_ok());
        assert!(order(OrderStatusType::Pending, DeliveryStatus::Pending).check_action(OrderAction::Ship).is_err());
        assert!(order(OrderStatusType::Confirmed, DeliveryStatus::Shipped).check_action(OrderAction::Ship).is_err());
        assert!(order(OrderStatusType::Cancelled, DeliveryStatus::Cancelled).check_action(OrderAction::Ship).is_err());
    }

    #[test]
    fn deliver_and_receive_follow_the_chain() {
        assert!(order(OrderStatusType::Confirmed, DeliveryStatus::Shipped).check_action(OrderAction::Deliver).is_ok());
        assert!(order(OrderStatusType::Confirmed, DeliveryStatus::Pending).check_action(OrderAction::Deliver).is_err());
        assert!(order(OrderStatusType::Confirmed, DeliveryStatus::Delivered).check_action(OrderAction::Receive).is_ok());
        assert!(order(OrderStatusType::Confirmed, DeliveryStatus::Shipped).check_action(OrderAction::Receive).is_err());
        assert!(order(OrderStatusType::Confirmed, DeliveryStatus::Accepted).check_action(OrderAction::Receive).is_err());
    }

    #[test]
    fn transition_errors_spell_out_the_blocked_action() {
        let err = order(OrderStatusType::Pending, DeliveryStatus::Pending).check_action(OrderAction::Ship).unwrap_err();
        assert_eq!(err.to_string(), "Cannot ship order while status is Pending and delivery status is Pending");
    }

    #[test]
    fn checkout_validation_rejects_bad_lines() {
        let mut checkout = NewCheckout {
            buyer_id: "buyer-1".into(),
            email: "ada@example.com".into(),
            customer_name: "Ada".into(),
            address: "1 Marina Rd".into(),
            phone: None,
            note: None,
            cart: vec![],
        };
        assert_eq!(checkout.validate(), Err(CheckoutValidationError::EmptyCart));
        checkout.cart.push(CartLine {
            product: CartProduct { id: "p1".into(), price: Naira::from(500), seller_id: "s1".into() },
            quantity: 0,
        });
        assert!(matches!(checkout.validate(), Err(CheckoutValidationError::InvalidQuantity { .. })));
        checkout.cart[0].quantity = 2;
        checkout.cart[0].product.seller_id = " ".into();
        assert!(matches!(checkout.validate(), Err(CheckoutValidationError::MissingSeller(_))));
        checkout.cart[0].product.seller_id = "s1".into();
        assert!(checkout.validate().is_ok());
        assert_eq!(checkout.total_amount(), Naira::from(1000));
    }

    #[test]
    fn actions_parse_from_their_wire_names() {
        assert_eq!("ship".parse::<OrderAction>().unwrap(), OrderAction::Ship);
        assert!("refund".parse::<OrderAction>().is_err());
    }
}
