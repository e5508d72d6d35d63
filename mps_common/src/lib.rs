//! Shared primitives for the marketplace payment server.
//!
//! Everything in this crate is deliberately dependency-light so that it can be used from the engine,
//! the Paystack client and the HTTP server alike.
mod naira;

pub mod op;
mod secret;

pub use naira::{Naira, NairaConversionError, KOBO_PER_NAIRA, NAIRA_CURRENCY_CODE};
pub use secret::Secret;
