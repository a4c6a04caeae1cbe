use bitbutter_core::time::DateTime;
use bitbutter_core::{
    ClientIdentity, Context, Dispatcher, Error, PaginationOptions, RequestSpec, Result,
};
use log::debug;
use percent_encoding::{utf8_percent_encode, PercentEncode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::constants::{DEFAULT_VERSION, PATH_SEGMENT_ENCODE_SET};
use crate::{Config, ConnectedAddressRequestBody, ConnectedExchangeRequestBody};

/// Client for the Bitbutter API.
///
/// Every method fills in a method, path, body and pagination and hands them to
/// the [`Dispatcher`]. Responses are returned as parsed JSON.
///
/// The client is cheap to clone and safe to share between tasks.
#[derive(Debug, Clone)]
pub struct Client {
    dispatcher: Dispatcher,
}

impl Client {
    /// Create a client for `endpoint` using API version `1`.
    ///
    /// Fails if the identity can't be used for signing.
    pub fn new(ctx: Context, endpoint: &str, identity: ClientIdentity) -> Result<Self> {
        identity.validate()?;
        Ok(Self {
            dispatcher: Dispatcher::new(ctx, endpoint, DEFAULT_VERSION, identity),
        })
    }

    /// Create a client from config.
    pub fn from_config(ctx: Context, config: &Config) -> Result<Self> {
        let identity = config.identity()?;
        debug!(
            "bitbutter client for {} v{} with {identity:?}",
            config.endpoint(),
            config.version()
        );

        Ok(Self {
            dispatcher: Dispatcher::new(ctx, config.endpoint(), config.version(), identity),
        })
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.dispatcher = self.dispatcher.with_time(time);
        self
    }

    /// The identity requests are signed with.
    pub fn identity(&self) -> &ClientIdentity {
        self.dispatcher.identity()
    }

    /// Send an arbitrary request.
    pub async fn send(&self, spec: RequestSpec) -> Result<Value> {
        self.dispatcher.dispatch(spec).await
    }

    /// Send an arbitrary request and decode the response into `T`.
    pub async fn send_as<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T> {
        let value = self.send(spec).await?;
        serde_json::from_value(value).map_err(|e| {
            Error::decode_failed("response does not match the expected type").with_source(e)
        })
    }

    fn partnership_id(&self) -> Result<&str> {
        self.identity().partnership_id().ok_or_else(|| {
            Error::config_invalid("this endpoint requires a partner identity with a partnership id")
        })
    }

    async fn get(&self, path: String, pagination: Option<PaginationOptions>) -> Result<Value> {
        let mut spec = RequestSpec::get(path);
        spec.pagination = pagination;
        self.send(spec).await
    }

    async fn post(&self, path: String, body: Option<&impl Serialize>) -> Result<Value> {
        let mut spec = RequestSpec::post(path);
        if let Some(body) = body {
            spec.body = serde_json::to_value(body).map_err(|e| {
                Error::unexpected("failed to serialize request body").with_source(e)
            })?;
        }
        self.send(spec).await
    }

    async fn delete(&self, path: String) -> Result<Value> {
        self.send(RequestSpec::delete(path)).await
    }
}

/// Escape an id so it stays inside one path segment.
fn segment(id: &str) -> PercentEncode<'_> {
    utf8_percent_encode(id, &PATH_SEGMENT_ENCODE_SET)
}

/// Users.
impl Client {
    /// List all users of the partnership.
    ///
    /// Requires a partner identity.
    pub async fn get_all_users(&self, pagination: Option<PaginationOptions>) -> Result<Value> {
        let partnership_id = self.partnership_id()?;
        self.get(format!("partnerships/{}/users", segment(partnership_id)), pagination)
            .await
    }

    /// Create a user.
    ///
    /// Partners create users inside their partnership; other identities use
    /// the public `users` endpoint.
    pub async fn create_user(&self) -> Result<Value> {
        let path = match self.identity().partnership_id() {
            Some(partnership_id) => format!("partnerships/{}/users", segment(partnership_id)),
            None => "users".to_string(),
        };
        self.post(path, None::<&Value>).await
    }

    /// Get a user.
    pub async fn get_user(&self, user_id: &str) -> Result<Value> {
        self.get(format!("users/{}", segment(user_id)), None).await
    }

    /// Delete a user.
    pub async fn delete_user(&self, user_id: &str) -> Result<Value> {
        self.delete(format!("users/{}", segment(user_id))).await
    }

    /// List the exchanges connected by a user.
    pub async fn get_user_connected_exchanges(&self, user_id: &str) -> Result<Value> {
        self.get(format!("users/{}/connected-exchanges", segment(user_id)), None)
            .await
    }

    /// List the addresses connected by a user.
    pub async fn get_user_connected_addresses(&self, user_id: &str) -> Result<Value> {
        self.get(format!("users/{}/connected-addresses", segment(user_id)), None)
            .await
    }

    /// Get the ledger of a user across all connections.
    pub async fn get_user_ledger(
        &self,
        user_id: &str,
        pagination: Option<PaginationOptions>,
    ) -> Result<Value> {
        self.get(format!("users/{}/ledger", segment(user_id)), pagination).await
    }

    /// Get the balances of a user across all connections.
    pub async fn get_user_balances(&self, user_id: &str) -> Result<Value> {
        self.get(format!("users/{}/balances", segment(user_id)), None).await
    }
}

/// Catalogue.
impl Client {
    /// List supported exchanges.
    pub async fn get_all_exchanges(&self) -> Result<Value> {
        self.get("exchanges".to_string(), None).await
    }

    /// List supported assets.
    pub async fn get_all_assets(&self) -> Result<Value> {
        self.get("assets".to_string(), None).await
    }
}

/// Connected exchanges.
impl Client {
    /// Connect an exchange account to a user.
    pub async fn connect_exchange(&self, body: &ConnectedExchangeRequestBody) -> Result<Value> {
        self.post("connected-exchanges".to_string(), Some(body))
            .await
    }

    /// Disconnect an exchange account.
    pub async fn disconnect_exchange(&self, connected_exchange_id: &str) -> Result<Value> {
        self.delete(format!("connected-exchanges/{}", segment(connected_exchange_id)))
            .await
    }

    /// Get the ledger of a connected exchange.
    pub async fn get_connected_exchange_ledger(
        &self,
        connected_exchange_id: &str,
        pagination: Option<PaginationOptions>,
    ) -> Result<Value> {
        self.get(
            format!("connected-exchanges/{}/ledger", segment(connected_exchange_id)),
            pagination,
        )
        .await
    }

    /// Get the trades of a connected exchange.
    pub async fn get_connected_exchange_trades(
        &self,
        connected_exchange_id: &str,
        pagination: Option<PaginationOptions>,
    ) -> Result<Value> {
        self.get(
            format!("connected-exchanges/{}/trades", segment(connected_exchange_id)),
            pagination,
        )
        .await
    }

    /// Get the deposits and withdrawals of a connected exchange.
    pub async fn get_connected_exchange_transfers(
        &self,
        connected_exchange_id: &str,
        pagination: Option<PaginationOptions>,
    ) -> Result<Value> {
        self.get(
            format!("connected-exchanges/{}/transfers", segment(connected_exchange_id)),
            pagination,
        )
        .await
    }

    /// Get the balances of a connected exchange.
    pub async fn get_connected_exchange_balances(
        &self,
        connected_exchange_id: &str,
    ) -> Result<Value> {
        self.get(
            format!("connected-exchanges/{}/balances", segment(connected_exchange_id)),
            None,
        )
        .await
    }

    /// Ask the server to pull new data from the exchange.
    pub async fn sync_connected_exchange(&self, connected_exchange_id: &str) -> Result<Value> {
        self.post(
            format!("connected-exchanges/{}/sync", segment(connected_exchange_id)),
            None::<&Value>,
        )
        .await
    }
}

/// Connected addresses.
impl Client {
    /// Connect a blockchain address to a user.
    pub async fn connect_address(&self, body: &ConnectedAddressRequestBody) -> Result<Value> {
        self.post("connected-addresses".to_string(), Some(body))
            .await
    }

    /// Disconnect a blockchain address.
    pub async fn disconnect_address(&self, connected_address_id: &str) -> Result<Value> {
        self.delete(format!("connected-addresses/{}", segment(connected_address_id)))
            .await
    }

    /// Get the ledger of a connected address.
    pub async fn get_connected_address_ledger(
        &self,
        connected_address_id: &str,
        pagination: Option<PaginationOptions>,
    ) -> Result<Value> {
        self.get(
            format!("connected-addresses/{}/ledger", segment(connected_address_id)),
            pagination,
        )
        .await
    }

    /// Get the transfers of a connected address.
    pub async fn get_connected_address_transfers(
        &self,
        connected_address_id: &str,
        pagination: Option<PaginationOptions>,
    ) -> Result<Value> {
        self.get(
            format!("connected-addresses/{}/transfers", segment(connected_address_id)),
            pagination,
        )
        .await
    }

    /// Get the balances of a connected address.
    pub async fn get_connected_address_balances(
        &self,
        connected_address_id: &str,
    ) -> Result<Value> {
        self.get(
            format!("connected-addresses/{}/balances", segment(connected_address_id)),
            None,
        )
        .await
    }

    /// Ask the server to rescan the address.
    pub async fn sync_connected_address(&self, connected_address_id: &str) -> Result<Value> {
        self.post(
            format!("connected-addresses/{}/sync", segment(connected_address_id)),
            None::<&Value>,
        )
        .await
    }
}
