//! Client for the Bitbutter financial data API.
//!
//! Bitbutter aggregates balances, ledgers, trades and transfers from
//! connected exchange accounts and blockchain addresses. This crate wraps the
//! REST API: every endpoint is a method on [`Client`], and every request is
//! signed with the partner or user credentials in [`Config`].
//!
//! ## Example
//!
//! ```no_run
//! use bitbutter::{Client, Config, PaginationOptions};
//!
//! # async fn example() -> bitbutter::Result<()> {
//! let ctx = bitbutter::default_context();
//! let config = Config::new()
//!     .with_api_key("api-key")
//!     .with_secret("c2VjcmV0")
//!     .with_partner_id("partner-id")
//!     .with_partnership_id("partnership-id");
//! let client = Client::from_config(ctx, &config)?;
//!
//! let users = client
//!     .get_all_users(Some(PaginationOptions::new().with_limit(10)))
//!     .await?;
//! println!("{users}");
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub use bitbutter_core::*;

mod constants;

mod config;
pub use config::Config;

mod types;
pub use types::{ConnectedAddressRequestBody, ConnectedExchangeRequestBody, ExchangeCredential};

mod client;
pub use client::Client;

/// Context sending requests with reqwest and reading the process environment.
#[cfg(feature = "default-context")]
pub fn default_context() -> Context {
    Context::new()
        .with_http_send(bitbutter_http_send_reqwest::ReqwestHttpSend::new(
            reqwest::Client::new(),
        ))
        .with_env(OsEnv)
}

/// Client configured from `BB_*` environment variables.
///
/// See [`Config::from_env`] for the variables that are read.
#[cfg(feature = "default-context")]
pub fn default_client() -> Result<Client> {
    let ctx = default_context();
    let config = Config::new().from_env(&ctx);
    Client::from_config(ctx, &config)
}
