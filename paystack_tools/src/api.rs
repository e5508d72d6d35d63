use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::PaystackConfig,
    data_objects::{InitializeTransaction, PaystackResponse, TransactionAuthorization, TransactionStatus},
    PaystackApiError,
};

/// A request to Paystack that hangs should stall one checkout, not the worker forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct PaystackApi {
    config: PaystackConfig,
    client: Arc<Client>,
}

impl PaystackApi {
    pub fn new(config: PaystackConfig) -> Result<Self, PaystackApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let val = HeaderValue::from_str(&bearer).map_err(|e| PaystackApiError::Initialization(e.to_string()))?;
        headers.insert(AUTHORIZATION, val);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PaystackApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, PaystackApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| PaystackApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| PaystackApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| PaystackApiError::RestResponseError(e.to_string()))?;
            Err(PaystackApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Initializes a checkout transaction for the aggregate cart amount.
    ///
    /// The returned reference is what ties the eventual webhook back to the orders, so callers
    /// must stamp it onto every order of the checkout as soon as this returns.
    pub async fn initialize_transaction(
        &self,
        mut transaction: InitializeTransaction,
    ) -> Result<TransactionAuthorization, PaystackApiError> {
        if transaction.callback_url.is_none() {
            transaction.callback_url = self.config.callback_url.clone();
        }
        debug!("Initializing Paystack transaction of {} for {}", transaction.amount, transaction.email);
        let response: PaystackResponse<TransactionAuthorization> =
            self.rest_query(Method::POST, "/transaction/initialize", Some(transaction)).await?;
        if !response.status {
            return Err(PaystackApiError::DeclinedRequest(response.message));
        }
        let auth = response.data.ok_or(PaystackApiError::EmptyResponse)?;
        info!("Paystack transaction initialized with reference {}", auth.reference);
        Ok(auth)
    }

    /// Fetches the settled state of a transaction directly from Paystack. Used for support
    /// tooling and for reconciling references whose webhook was missed.
    pub async fn verify_transaction(&self, reference: &str) -> Result<TransactionStatus, PaystackApiError> {
        debug!("Verifying Paystack transaction {reference}");
        let path = format!("/transaction/verify/{reference}");
        let response: PaystackResponse<TransactionStatus> = self.rest_query(Method::GET, &path, None::<()>).await?;
        if !response.status {
            return Err(PaystackApiError::DeclinedRequest(response.message));
        }
        response.data.ok_or(PaystackApiError::EmptyResponse)
    }
}
