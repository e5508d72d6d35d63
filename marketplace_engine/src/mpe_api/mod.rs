pub mod order_flow_api;
pub mod order_objects;
pub mod order_query_api;
pub mod wallet_api;

pub use order_flow_api::OrderFlowApi;
pub use order_query_api::OrderQueryApi;
pub use wallet_api::{EarningsSummary, WalletApi};
