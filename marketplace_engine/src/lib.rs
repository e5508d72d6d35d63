//! Marketplace Payment Engine
//!
//! The engine holds the core logic of the marketplace payment server: splitting checkouts into
//! per-seller orders, reconciling payment-gateway webhook events, driving the order lifecycle
//! state machine, and keeping the per-seller wallet ledger. It is HTTP- and provider-agnostic.
//!
//! The crate is divided into three main sections:
//! 1. Database management ([`mod@sqlite`]). SQLite is the supported backend. Access goes through
//!    the public API rather than the tables directly; the exception is the data types, which are
//!    defined in [`mod@db_types`] and are public.
//! 2. The engine public API ([`OrderFlowApi`] and [`WalletApi`]). Backends implement the traits
//!    in [`mod@traits`] to power these APIs.
//! 3. Events ([`mod@events`]): a small actor-style hook system. When settlement marks an order
//!    as paid, an `OrderPaidEvent` is emitted; rejecting an order emits `OrderAnnulledEvent`.
pub mod db_types;
pub mod events;
pub mod helpers;
mod mpe_api;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use mpe_api::{order_objects, EarningsSummary, OrderFlowApi, OrderQueryApi, WalletApi};
pub use traits::{
    OrderManagement,
    PaymentGatewayDatabase,
    PaymentGatewayError,
    SellerCredit,
    SettlementResult,
    WalletApiError,
    WalletManagement,
};
