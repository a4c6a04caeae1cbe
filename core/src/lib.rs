//! Core components for signing Bitbutter API requests.
//!
//! This crate holds the request-signing and dispatch engine used by the
//! `bitbutter` client. Every authenticated request carries an HMAC-SHA256
//! signature computed over a canonical prehash string:
//!
//! ```text
//! timestamp_millis + METHOD + /v{version}/{resource}?{query} + body
//! ```
//!
//! ## Overview
//!
//! - [`sign`]: turns a base64 secret and a prehash into a base64 signature.
//! - [`build_headers`]: selects the `BB-*` header set for a [`ClientIdentity`].
//! - [`build_path`]: builds versioned request paths and pagination queries.
//! - [`Dispatcher`]: ties the above together and sends the request through the
//!   [`HttpSend`] configured in a [`Context`].
//!
//! ## Example
//!
//! ```no_run
//! use bitbutter_core::{ClientIdentity, Context, Dispatcher, RequestSpec};
//!
//! # async fn example() -> bitbutter_core::Result<()> {
//! let identity = ClientIdentity::partner("api-key", "c2VjcmV0", "partner-id", "partnership-id");
//! // Configure a real transport with `Context::with_http_send`.
//! let ctx = Context::new();
//! let dispatcher = Dispatcher::new(ctx, "https://api.example.com", "1", identity);
//!
//! let exchanges = dispatcher.dispatch(RequestSpec::get("exchanges")).await?;
//! println!("{exchanges}");
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};

mod error;
pub use error::{Error, ErrorKind, Result};

mod identity;
pub use identity::ClientIdentity;

mod signer;
pub use signer::sign;

mod request;
pub use request::{Method, SigningRequest};

mod sign_request;
pub use sign_request::{
    build_headers, sign_headers, AuthHeaders, BB_ACCESS_KEY, BB_ACCESS_SIGN, BB_PARTNER_ID,
    BB_TIMESTAMP, BB_USER_ID,
};

mod path;
pub use path::{build_path, Order, PaginationOptions, DEFAULT_LIMIT};

mod dispatch;
pub use dispatch::{Dispatcher, RequestSpec};
