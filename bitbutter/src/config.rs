use std::fmt::{Debug, Formatter};

use bitbutter_core::utils::Redact;
use bitbutter_core::{ClientIdentity, Context, Error, Result};

use crate::constants::*;

/// Config carries all the configuration for a bitbutter client.
#[derive(Clone, Default)]
pub struct Config {
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`BB_ENDPOINT`]
    /// - default to `http://localhost:3000`
    pub endpoint: Option<String>,
    /// `version` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`BB_API_VERSION`]
    /// - default to `1`
    pub version: Option<String>,
    /// `api_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`BB_API_KEY`]
    pub api_key: Option<String>,
    /// Base64 encoded `secret` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`BB_SECRET`]
    pub secret: Option<String>,
    /// `partner_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`BB_PARTNER_ID`]
    pub partner_id: Option<String>,
    /// `partnership_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`BB_PARTNERSHIP_ID`]
    pub partnership_id: Option<String>,
    /// `user_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`BB_USER_ID`]
    pub user_id: Option<String>,
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set api_key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set secret
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Set partner_id
    pub fn with_partner_id(mut self, partner_id: impl Into<String>) -> Self {
        self.partner_id = Some(partner_id.into());
        self
    }

    /// Set partnership_id
    pub fn with_partnership_id(mut self, partnership_id: impl Into<String>) -> Self {
        self.partnership_id = Some(partnership_id.into());
        self
    }

    /// Set user_id
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Load config from env.
    ///
    /// Fields that are already set are kept. Empty env values are ignored.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let load = |key: &str| ctx.env_var(key).filter(|v| !v.is_empty());

        if let Some(v) = load(BB_ENDPOINT) {
            self.endpoint.get_or_insert(v);
        }
        if let Some(v) = load(BB_API_VERSION) {
            self.version.get_or_insert(v);
        }
        if let Some(v) = load(BB_API_KEY) {
            self.api_key.get_or_insert(v);
        }
        if let Some(v) = load(BB_SECRET) {
            self.secret.get_or_insert(v);
        }
        if let Some(v) = load(BB_PARTNER_ID) {
            self.partner_id.get_or_insert(v);
        }
        if let Some(v) = load(BB_PARTNERSHIP_ID) {
            self.partnership_id.get_or_insert(v);
        }
        if let Some(v) = load(BB_USER_ID) {
            self.user_id.get_or_insert(v);
        }

        self
    }

    /// The configured endpoint or the default one.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    /// The configured api version or the default one.
    ///
    /// A leading `v` is dropped: `v1` and `1` are the same version.
    pub fn version(&self) -> &str {
        self.version
            .as_deref()
            .unwrap_or(DEFAULT_VERSION)
            .trim_start_matches(['v', 'V'])
    }

    /// Resolve the identity described by this config.
    ///
    /// - `partner_id` set: partner identity, needs `api_key`, `secret` and `partnership_id`.
    /// - else `user_id` set: user identity, needs `api_key` and `secret`.
    /// - else credentials without an id are rejected.
    /// - else anonymous.
    ///
    /// Setting both `partner_id` and `user_id` is rejected as ambiguous.
    pub fn identity(&self) -> Result<ClientIdentity> {
        let identity = match (&self.partner_id, &self.user_id) {
            (Some(_), Some(_)) => {
                return Err(Error::config_invalid(
                    "partner_id and user_id are mutually exclusive",
                ))
            }
            (Some(partner_id), None) => ClientIdentity::partner(
                require(&self.api_key, "api_key")?,
                require(&self.secret, "secret")?,
                partner_id.as_str(),
                require(&self.partnership_id, "partnership_id")?,
            ),
            (None, Some(user_id)) => ClientIdentity::user(
                require(&self.api_key, "api_key")?,
                require(&self.secret, "secret")?,
                user_id.as_str(),
            ),
            (None, None) => {
                if self.api_key.is_some() || self.secret.is_some() {
                    return Err(Error::config_invalid(
                        "api_key and secret need either partner_id or user_id",
                    ));
                }
                ClientIdentity::Anonymous
            }
        };

        identity.validate()?;
        Ok(identity)
    }
}

fn require<'a>(field: &'a Option<String>, name: &str) -> Result<&'a str> {
    field
        .as_deref()
        .ok_or_else(|| Error::config_invalid(format!("{name} is required")))
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("version", &self.version)
            .field("api_key", &self.api_key.as_ref().map(Redact::from))
            .field("secret", &self.secret.as_ref().map(Redact::from))
            .field("partner_id", &self.partner_id)
            .field("partnership_id", &self.partnership_id)
            .field("user_id", &self.user_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bitbutter_core::{ErrorKind, StaticEnv};
    use pretty_assertions::assert_eq;

    use super::*;

    fn ctx(envs: &[(&str, &str)]) -> Context {
        Context::new().with_env(StaticEnv {
            envs: envs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        })
    }

    #[test]
    fn test_from_env_partner() {
        let ctx = ctx(&[
            (BB_API_KEY, "key"),
            (BB_SECRET, "czNjcjN0"),
            (BB_PARTNER_ID, "partner-1"),
            (BB_PARTNERSHIP_ID, "partnership-1"),
        ]);

        let config = Config::new().from_env(&ctx);
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.version(), "1");
        assert_eq!(
            config.identity().unwrap(),
            ClientIdentity::partner("key", "czNjcjN0", "partner-1", "partnership-1")
        );
    }

    #[test]
    fn test_explicit_fields_win_over_env() {
        let ctx = ctx(&[
            (BB_ENDPOINT, "https://env.example.com"),
            (BB_API_KEY, "env-key"),
        ]);

        let config = Config::new()
            .with_endpoint("https://api.example.com")
            .from_env(&ctx);
        assert_eq!(config.endpoint(), "https://api.example.com");
        assert_eq!(config.api_key.as_deref(), Some("env-key"));
    }

    #[test]
    fn test_version_prefix() {
        assert_eq!(Config::new().with_version("v2").version(), "2");
        assert_eq!(Config::new().with_version("3").version(), "3");
        assert_eq!(
            Config::new()
                .from_env(&ctx(&[(BB_API_VERSION, "v1")]))
                .version(),
            "1"
        );
    }

    #[test]
    fn test_user_identity() {
        let config = Config::new()
            .with_api_key("key")
            .with_secret("czNjcjN0")
            .with_user_id("user-1");
        assert_eq!(
            config.identity().unwrap(),
            ClientIdentity::user("key", "czNjcjN0", "user-1")
        );
    }

    #[test]
    fn test_anonymous_identity() {
        let config = Config::new().from_env(&ctx(&[(BB_PARTNER_ID, "")]));
        assert_eq!(config.identity().unwrap(), ClientIdentity::Anonymous);
    }

    #[test]
    fn test_invalid_identities() {
        let cases = vec![
            (
                Config::new().with_api_key("key").with_secret("czNjcjN0"),
                ErrorKind::ConfigInvalid,
            ),
            (
                Config::new()
                    .with_api_key("key")
                    .with_secret("czNjcjN0")
                    .with_partner_id("p"),
                ErrorKind::ConfigInvalid,
            ),
            (
                Config::new()
                    .with_api_key("key")
                    .with_secret("czNjcjN0")
                    .with_partner_id("p")
                    .with_partnership_id("ps")
                    .with_user_id("u"),
                ErrorKind::ConfigInvalid,
            ),
            (
                Config::new().with_secret("czNjcjN0").with_user_id("u"),
                ErrorKind::ConfigInvalid,
            ),
            (
                Config::new()
                    .with_api_key("key")
                    .with_secret("not base64!")
                    .with_user_id("u"),
                ErrorKind::SecretInvalid,
            ),
        ];

        for (config, kind) in cases {
            let err = config.identity().unwrap_err();
            assert_eq!(err.kind(), kind, "{config:?}");
        }
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = Config::new()
            .with_api_key("my-very-long-api-key")
            .with_secret("czNjcjN0czNjcjN0czNjcjN0");
        let s = format!("{config:?}");
        assert!(!s.contains("my-very-long-api-key"), "{s}");
        assert!(!s.contains("czNjcjN0czNjcjN0czNjcjN0"), "{s}");
    }
}
