//! The traits that a storage backend must implement to power the marketplace payment engine.
//!
//! [`PaymentGatewayDatabase`] carries the write-side flows (checkout creation, webhook
//! settlement, lifecycle transitions); [`OrderManagement`] and [`WalletManagement`] carry the
//! read paths. Concrete backends (currently SQLite) implement all three.
mod data_objects;
mod order_management;
mod payment_gateway_database;
mod wallet_management;

pub use data_objects::{SellerCredit, SettlementResult};
pub use order_management::OrderManagement;
pub use payment_gateway_database::{PaymentGatewayDatabase, PaymentGatewayError};
pub use wallet_management::{WalletApiError, WalletManagement};
