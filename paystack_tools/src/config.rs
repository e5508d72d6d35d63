use log::*;
use mps_common::Secret;

pub const DEFAULT_PAYSTACK_API_URL: &str = "https://api.paystack.co";

#[derive(Debug, Clone)]
pub struct PaystackConfig {
    /// Base URL of the Paystack REST API. Only overridden in tests.
    pub api_url: String,
    /// The secret key for the Paystack integration. Also the key that webhook payloads are
    /// signed with, per Paystack convention.
    pub secret_key: Secret<String>,
    /// Where Paystack redirects the buyer after payment.
    pub callback_url: Option<String>,
}

impl Default for PaystackConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_PAYSTACK_API_URL.to_string(), secret_key: Secret::default(), callback_url: None }
    }
}

impl PaystackConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("MPS_PAYSTACK_API_URL").unwrap_or_else(|_| DEFAULT_PAYSTACK_API_URL.to_string());
        let secret_key = Secret::new(std::env::var("MPS_PAYSTACK_SECRET_KEY").unwrap_or_else(|_| {
            error!("MPS_PAYSTACK_SECRET_KEY is not set. Payment initialization and webhook verification will fail.");
            String::default()
        }));
        let callback_url = std::env::var("MPS_PAYSTACK_CALLBACK_URL").ok();
        if callback_url.is_none() {
            info!("MPS_PAYSTACK_CALLBACK_URL is not set. Paystack will use the dashboard default after payment.");
        }
        Self { api_url, secret_key, callback_url }
    }
}
