//! A minimal Paystack REST client and the data objects for its webhook events.
//!
//! Covers the slice of the Paystack API that the payment server needs: initializing a checkout
//! transaction, verifying one after the fact, and authenticating inbound webhook deliveries via
//! their HMAC-SHA512 payload signature.
mod api;
mod config;
mod data_objects;
mod error;
mod signature;

pub use api::PaystackApi;
pub use config::PaystackConfig;
pub use data_objects::{
    ChargeEvent,
    ChargeEventData,
    CheckoutMetadata,
    EventKind,
    InitializeTransaction,
    TransactionAuthorization,
    TransactionStatus,
};
pub use error::PaystackApiError;
pub use signature::{sign_payload, verify_signature, PAYSTACK_SIGNATURE_HEADER};
