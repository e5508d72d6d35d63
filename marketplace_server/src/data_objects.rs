use std::fmt::Display;

use marketplace_engine::db_types::{CartLine, NewCheckout, Order, OrderAction};
use paystack_tools::TransactionAuthorization;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The checkout request as the storefront sends it. The buyer id comes from the access token,
/// never from the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub email: String,
    pub customer_name: String,
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    pub cart: Vec<CartLine>,
}

impl CheckoutRequest {
    pub fn into_new_checkout(self, buyer_id: String) -> NewCheckout {
        NewCheckout {
            buyer_id,
            email: self.email,
            customer_name: self.customer_name,
            address: self.address,
            phone: self.phone,
            note: self.note,
            cart: self.cart,
        }
    }
}

/// What the buyer needs to complete payment: the redirect target plus the created order ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub message: String,
    pub order_ids: Vec<i64>,
    pub data: TransactionAuthorization,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MarkOrderStatusRequest {
    pub action: OrderAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdatedResponse {
    pub message: String,
    pub order: Order,
}
