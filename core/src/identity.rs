use std::fmt::{Debug, Formatter};

use base64::prelude::BASE64_STANDARD;
use base64::Engine;

use crate::utils::Redact;
use crate::{Error, Result};

/// ClientIdentity decides how requests are authenticated.
///
/// Exactly one identity is chosen when a client is built and it never changes
/// afterwards.
#[derive(Clone, PartialEq, Eq)]
pub enum ClientIdentity {
    /// No credentials. Requests are sent without any auth headers.
    Anonymous,
    /// A platform partner acting on behalf of its users.
    Partner {
        /// API key sent as `BB-ACCESS-KEY`.
        api_key: String,
        /// Base64 encoded signing secret.
        secret: String,
        /// Partner id sent as `BB-PARTNER-ID`.
        partner_id: String,
        /// Partnership the partner's users belong to.
        partnership_id: String,
    },
    /// A single end user.
    User {
        /// API key sent as `BB-ACCESS-KEY`.
        api_key: String,
        /// Base64 encoded signing secret.
        secret: String,
        /// User id sent as `BB-USER-ID`.
        user_id: String,
    },
}

impl ClientIdentity {
    /// Create a partner identity.
    pub fn partner(
        api_key: impl Into<String>,
        secret: impl Into<String>,
        partner_id: impl Into<String>,
        partnership_id: impl Into<String>,
    ) -> Self {
        Self::Partner {
            api_key: api_key.into(),
            secret: secret.into(),
            partner_id: partner_id.into(),
            partnership_id: partnership_id.into(),
        }
    }

    /// Create a user identity.
    pub fn user(
        api_key: impl Into<String>,
        secret: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self::User {
            api_key: api_key.into(),
            secret: secret.into(),
            user_id: user_id.into(),
        }
    }

    /// Returns the api key and secret, or `None` for anonymous identities.
    pub fn credential(&self) -> Option<(&str, &str)> {
        match self {
            Self::Anonymous => None,
            Self::Partner {
                api_key, secret, ..
            }
            | Self::User {
                api_key, secret, ..
            } => Some((api_key.as_str(), secret.as_str())),
        }
    }

    /// Returns the partnership id if this is a partner identity.
    pub fn partnership_id(&self) -> Option<&str> {
        match self {
            Self::Partner { partnership_id, .. } => Some(partnership_id.as_str()),
            _ => None,
        }
    }

    /// Check that the identity is usable for signing.
    ///
    /// The secret must be valid base64 and the ids must not be empty.
    pub fn validate(&self) -> Result<()> {
        let (api_key, secret, ids) = match self {
            Self::Anonymous => return Ok(()),
            Self::Partner {
                api_key,
                secret,
                partner_id,
                partnership_id,
            } => (
                api_key.as_str(),
                secret.as_str(),
                vec![
                    ("partner_id", partner_id.as_str()),
                    ("partnership_id", partnership_id.as_str()),
                ],
            ),
            Self::User {
                api_key,
                secret,
                user_id,
            } => (
                api_key.as_str(),
                secret.as_str(),
                vec![("user_id", user_id.as_str())],
            ),
        };

        if api_key.is_empty() {
            return Err(Error::config_invalid("api_key must not be empty"));
        }
        for (name, value) in ids {
            if value.is_empty() {
                return Err(Error::config_invalid(format!("{name} must not be empty")));
            }
        }
        BASE64_STANDARD
            .decode(secret)
            .map_err(|e| Error::secret_invalid("secret is not valid base64").with_source(e))?;

        Ok(())
    }
}

impl Debug for ClientIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Partner {
                api_key,
                secret,
                partner_id,
                partnership_id,
            } => f
                .debug_struct("Partner")
                .field("api_key", &Redact::from(api_key))
                .field("secret", &Redact::from(secret))
                .field("partner_id", partner_id)
                .field("partnership_id", partnership_id)
                .finish(),
            Self::User {
                api_key,
                secret,
                user_id,
            } => f
                .debug_struct("User")
                .field("api_key", &Redact::from(api_key))
                .field("secret", &Redact::from(secret))
                .field("user_id", user_id)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_debug_redacts_secret() {
        let identity = ClientIdentity::user("api-key", "czNjcjN0czNjcjN0czNjcjN0", "user-1");
        let s = format!("{identity:?}");
        assert!(s.contains("czN***jN0"), "{s}");
        assert!(!s.contains("czNjcjN0czNjcjN0czNjcjN0"), "{s}");
        assert!(s.contains("user-1"), "{s}");
    }

    #[test]
    fn test_validate() {
        assert!(ClientIdentity::Anonymous.validate().is_ok());
        assert!(ClientIdentity::partner("k", "czNjcjN0", "p", "ps")
            .validate()
            .is_ok());

        let err = ClientIdentity::user("k", "not base64!", "u")
            .validate()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SecretInvalid);

        let err = ClientIdentity::user("k", "czNjcjN0", "").validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        let err = ClientIdentity::partner("", "czNjcjN0", "p", "ps")
            .validate()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_accessors() {
        let partner = ClientIdentity::partner("k", "czNjcjN0", "p", "ps");
        assert_eq!(partner.credential(), Some(("k", "czNjcjN0")));
        assert_eq!(partner.partnership_id(), Some("ps"));

        let user = ClientIdentity::user("k", "czNjcjN0", "u");
        assert_eq!(user.partnership_id(), None);
        assert_eq!(ClientIdentity::Anonymous.credential(), None);
    }
}
