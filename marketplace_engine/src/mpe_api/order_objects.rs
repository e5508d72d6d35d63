use std::fmt::Display;

use chrono::{DateTime, Utc};
use mps_common::Naira;
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderNumber, OrderStatusType, PaymentStatus};

/// The response payload for order listings: the matching orders plus their combined value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResult {
    pub total_value: Naira,
    pub orders: Vec<Order>,
}

impl From<Vec<Order>> for OrderResult {
    fn from(orders: Vec<Order>) -> Self {
        let total_value = orders.iter().map(|o| o.total_price).sum();
        Self { total_value, orders }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub buyer_id: Option<String>,
    pub seller_id: Option<String>,
    pub payment_reference: Option<String>,
    pub order_number: Option<OrderNumber>,
    pub payment_status: Option<PaymentStatus>,
    pub status: Option<Vec<OrderStatusType>>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl OrderQueryFilter {
    pub fn for_buyer<S: Into<String>>(buyer_id: S) -> Self {
        Self { buyer_id: Some(buyer_id.into()), ..Default::default() }
    }

    pub fn for_seller<S: Into<String>>(seller_id: S) -> Self {
        Self { seller_id: Some(seller_id.into()), ..Default::default() }
    }

    pub fn with_reference<S: Into<String>>(mut self, reference: S) -> Self {
        self.payment_reference = Some(reference.into());
        self
    }

    pub fn with_order_number(mut self, order_number: OrderNumber) -> Self {
        self.order_number = Some(order_number);
        self
    }

    pub fn with_payment_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = Some(status);
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.buyer_id.is_none()
            && self.seller_id.is_none()
            && self.payment_reference.is_none()
            && self.order_number.is_none()
            && self.payment_status.is_none()
            && self.status.is_none()
            && self.since.is_none()
            && self.until.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "No filters.");
        }
        if let Some(buyer_id) = &self.buyer_id {
            write!(f, "buyer: {buyer_id}. ")?;
        }
        if let Some(seller_id) = &self.seller_id {
            write!(f, "seller: {seller_id}. ")?;
        }
        if let Some(reference) = &self.payment_reference {
            write!(f, "reference: {reference}. ")?;
        }
        if let Some(order_number) = &self.order_number {
            write!(f, "order number: {order_number}. ")?;
        }
        if let Some(payment_status) = &self.payment_status {
            write!(f, "payment status: {payment_status}. ")?;
        }
        if let Some(statuses) = &self.status {
            let statuses = statuses.iter().map(|s| s.to_string()).collect::<Vec<String>>().join(",");
            write!(f, "statuses: [{statuses}]. ")?;
        }
        if let Some(since) = &self.since {
            write!(f, "since {since}. ")?;
        }
        if let Some(until) = &self.until {
            write!(f, "until {until}. ")?;
        }
        Ok(())
    }
}
