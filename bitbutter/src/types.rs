use std::fmt::{Debug, Formatter};

use bitbutter_core::utils::Redact;
use serde::{Deserialize, Serialize};

/// Body of `POST /v1/connected-exchanges`.
///
/// Fields are serialized in declaration order, which is also the order they
/// are signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedExchangeRequestBody {
    /// API credentials of the exchange account.
    pub credentials: ExchangeCredential,
    /// Exchange to connect, as listed by `get_all_exchanges`.
    pub exchange_id: String,
    /// User owning the connection.
    pub user_id: String,
}

/// Credentials of an account on an external exchange.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeCredential {
    /// Exchange api key.
    pub api_key: String,
    /// Exchange api secret.
    pub secret: String,
    /// Passphrase, only required by some exchanges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Debug for ExchangeCredential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeCredential")
            .field("api_key", &Redact::from(&self.api_key))
            .field("secret", &Redact::from(&self.secret))
            .field("password", &self.password.as_ref().map(Redact::from))
            .finish()
    }
}

/// Body of `POST /v1/connected-addresses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedAddressRequestBody {
    /// Asset held at the address, as listed by `get_all_assets`.
    pub asset_id: String,
    /// Blockchain address.
    pub address: String,
    /// User owning the connection.
    pub user_id: String,
}
