use http::header::HeaderName;
use http::{HeaderMap, HeaderValue};
use log::debug;
use serde_json::Value;

use crate::{sign, ClientIdentity, Method, Result, SigningRequest};

/// Header carrying the api key.
pub const BB_ACCESS_KEY: &str = "BB-ACCESS-KEY";
/// Header carrying the base64 signature.
pub const BB_ACCESS_SIGN: &str = "BB-ACCESS-SIGN";
/// Header carrying the signing time in epoch milliseconds.
pub const BB_TIMESTAMP: &str = "BB-TIMESTAMP";
/// Header carrying the partner id for partner identities.
pub const BB_PARTNER_ID: &str = "BB-PARTNER-ID";
/// Header carrying the user id for user identities.
pub const BB_USER_ID: &str = "BB-USER-ID";

/// The authentication headers of a single request.
///
/// For signed identities it always holds `BB-ACCESS-KEY`, `BB-TIMESTAMP`,
/// `BB-ACCESS-SIGN` and exactly one of `BB-PARTNER-ID` or `BB-USER-ID`.
/// For anonymous identities it is empty.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthHeaders {
    headers: Vec<(&'static str, String)>,
}

impl AuthHeaders {
    /// Get a header value by its name, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Check whether a header is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns true if no auth header will be sent.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.headers.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Write all headers into a header map.
    ///
    /// The signature is marked sensitive so it never shows up in debug output.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        for (name, value) in self.iter() {
            let mut value = HeaderValue::from_str(value)?;
            if name == BB_ACCESS_SIGN || name == BB_ACCESS_KEY {
                value.set_sensitive(true);
            }
            headers.insert(HeaderName::from_bytes(name.as_bytes())?, value);
        }

        Ok(())
    }
}

impl std::fmt::Debug for AuthHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut m = f.debug_map();
        for (k, v) in self.iter() {
            if k == BB_ACCESS_SIGN || k == BB_ACCESS_KEY {
                m.entry(&k, &crate::utils::Redact::from(v));
            } else {
                m.entry(&k, &v);
            }
        }
        m.finish()
    }
}

/// Build the authentication headers for a request.
///
/// The body is canonicalized with [`SigningRequest::canonical_body`], so the
/// caller must send exactly that string. Anonymous identities are never
/// signed and get an empty header set.
pub fn build_headers(
    identity: &ClientIdentity,
    method: Method,
    request_path: &str,
    body: &Value,
    timestamp_millis: i64,
) -> Result<AuthHeaders> {
    let req = SigningRequest::new(timestamp_millis, method, request_path, body)?;
    sign_headers(identity, &req)
}

/// Build the authentication headers for an already canonicalized request.
pub fn sign_headers(identity: &ClientIdentity, req: &SigningRequest) -> Result<AuthHeaders> {
    let (api_key, secret, identity_header) = match identity {
        ClientIdentity::Anonymous => {
            debug!(
                "anonymous identity, skip signing {} {}",
                req.method, req.request_path
            );
            return Ok(AuthHeaders::default());
        }
        ClientIdentity::Partner {
            api_key,
            secret,
            partner_id,
            ..
        } => (api_key, secret, (BB_PARTNER_ID, partner_id)),
        ClientIdentity::User {
            api_key,
            secret,
            user_id,
        } => (api_key, secret, (BB_USER_ID, user_id)),
    };

    let signature = sign(secret, &req.prehash())?;
    debug!(
        "signed {} {} at {} with {}",
        req.method, req.request_path, req.timestamp_millis, identity_header.0
    );

    Ok(AuthHeaders {
        headers: vec![
            (BB_ACCESS_KEY, api_key.clone()),
            (BB_ACCESS_SIGN, signature),
            (BB_TIMESTAMP, req.timestamp_millis.to_string()),
            (identity_header.0, identity_header.1.clone()),
        ],
    })
}
