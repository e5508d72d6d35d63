use std::{env, net::IpAddr};

use log::*;
use mps_common::Secret;
use paystack_tools::PaystackConfig as PaystackApiConfig;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

const DEFAULT_MPS_HOST: &str = "127.0.0.1";
const DEFAULT_MPS_PORT: u16 = 8370;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address,
    /// rather than the connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather
    /// than the connection's remote address.
    pub use_forwarded: bool,
    /// Paystack gateway configuration
    pub paystack_config: PaystackConfig,
}

#[derive(Clone, Debug)]
pub struct PaystackConfig {
    /// Credentials and endpoint for the outbound Paystack API client.
    pub api: PaystackApiConfig,
    /// When false, webhook signature verification is skipped. Local development only.
    pub signature_checks: bool,
    /// If supplied, webhook requests are checked against this whitelist of Paystack IP
    /// addresses. To explicitly disable the whitelist, set it to "false", "none", or "0".
    pub whitelist: Option<Vec<IpAddr>>,
}

impl Default for PaystackConfig {
    fn default() -> Self {
        // Signature checks stay on unless explicitly disabled via configuration.
        Self { api: PaystackApiConfig::default(), signature_checks: true, whitelist: None }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MPS_HOST.to_string(),
            port: DEFAULT_MPS_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            paystack_config: PaystackConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MPS_HOST").ok().unwrap_or_else(|| DEFAULT_MPS_HOST.into());
        let port = env::var("MPS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for MPS_PORT. {e} Using the default, {DEFAULT_MPS_PORT}, instead."
                    );
                    DEFAULT_MPS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_MPS_PORT);
        let database_url = env::var("MPS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ MPS_DATABASE_URL is not set. Please set it to the URL for the marketplace database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to \
                 the default configuration."
            );
            AuthConfig::default()
        });
        let paystack_config = PaystackConfig::from_env_or_defaults();
        let use_x_forwarded_for =
            env::var("MPS_USE_X_FORWARDED_FOR").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        let use_forwarded = env::var("MPS_USE_FORWARDED").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        Self { host, port, database_url, auth, use_x_forwarded_for, use_forwarded, paystack_config }
    }
}

impl PaystackConfig {
    pub fn from_env_or_defaults() -> Self {
        let api = PaystackApiConfig::new_from_env_or_default();
        let signature_checks =
            env::var("MPS_PAYSTACK_SIGNATURE_CHECKS").map(|s| &s != "0" && &s != "false").unwrap_or(true);
        if !signature_checks {
            warn!(
                "🚨️ Webhook signature checks are DISABLED. Anyone can mark orders as paid. Never run production \
                 like this."
            );
        }
        let whitelist = env::var("MPS_PAYSTACK_IP_WHITELIST").ok().and_then(|s| {
            if ["none", "false", "0"].contains(&s.to_lowercase().as_str()) {
                info!(
                    "🪛️ The Paystack IP whitelist is disabled. If this is not what you want, set \
                     MPS_PAYSTACK_IP_WHITELIST to a comma-separated list of IP addresses to enable it."
                );
                return None;
            }
            let ip_addrs = s
                .split(',')
                .filter_map(|s| {
                    s.trim()
                        .parse()
                        .map_err(|e| {
                            warn!("🪛️ Ignoring invalid IP address ({s}) in MPS_PAYSTACK_IP_WHITELIST: {e}");
                            None::<IpAddr>
                        })
                        .ok()
                })
                .collect::<Vec<IpAddr>>();
            Some(ip_addrs)
        });
        match &whitelist {
            Some(whitelist) if whitelist.is_empty() => {
                warn!(
                    "🚨️ The Paystack IP whitelist was configured, but is empty. The server will run, but won't \
                     accept any webhook deliveries."
                );
            },
            None => {
                info!("🪛️ No Paystack IP whitelist is set. Only the payload signature will be verified.");
            },
            Some(v) => {
                let addrs = v.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
                info!("🪛️ Paystack IP whitelist: {addrs}");
            },
        }
        Self { api, signature_checks, whitelist }
    }
}

//-------------------------------------------------  AuthConfig  ------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HS256 secret used to sign and verify access tokens. The identity service that issues
    /// the tokens must share this secret.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session, so every token \
             dies with the process. Set MPS_JWT_SECRET on production instances. 🚨️🚨️🚨️"
        );
        let secret: String = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect();
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, crate::errors::ServerError> {
        let secret = env::var("MPS_JWT_SECRET")
            .map_err(|e| crate::errors::ServerError::ConfigurationError(format!("{e} [MPS_JWT_SECRET]")))?;
        if secret.len() < 32 {
            warn!("🪛️ MPS_JWT_SECRET is shorter than 32 characters. Consider using a longer secret.");
        }
        Ok(Self { jwt_secret: Secret::new(secret) })
    }
}
