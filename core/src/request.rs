use std::fmt;
use std::fmt::Write;
use std::str::FromStr;

use serde_json::Value;

use crate::{Error, Result};

/// HTTP methods accepted by the Bitbutter API.
///
/// Anything else is rejected before a request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST, the only method that carries a body.
    Post,
    /// DELETE
    Delete,
}

impl Method {
    /// Uppercase name as used in the prehash.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }

    /// Whether requests with this method send a body on the wire.
    pub fn has_body(&self) -> bool {
        matches!(self, Method::Post)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "DELETE" => Ok(Method::Delete),
            _ => Err(Error::method_unsupported(format!(
                "method {s} is not supported, expected one of GET, POST, DELETE"
            ))),
        }
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = Error;

    fn try_from(value: &http::Method) -> Result<Self> {
        value.as_str().parse()
    }
}

impl From<Method> for http::Method {
    fn from(value: Method) -> Self {
        match value {
            Method::Get => http::Method::GET,
            Method::Post => http::Method::POST,
            Method::Delete => http::Method::DELETE,
        }
    }
}

/// The exact fields covered by a request signature.
///
/// `body` is the string that goes on the wire, so anything that changes the
/// body after signing breaks the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningRequest {
    /// Milliseconds since the unix epoch.
    pub timestamp_millis: i64,
    /// HTTP method.
    pub method: Method,
    /// Versioned path including the query string, e.g. `/v1/exchanges?limit=100`.
    pub request_path: String,
    /// Canonical body, empty for bodiless requests.
    pub body: String,
}

impl SigningRequest {
    /// Build a signing request, canonicalizing the body.
    pub fn new(
        timestamp_millis: i64,
        method: Method,
        request_path: impl Into<String>,
        body: &Value,
    ) -> Result<Self> {
        Ok(Self {
            timestamp_millis,
            method,
            request_path: request_path.into(),
            body: Self::canonical_body(body)?,
        })
    }

    /// Serialize a body the way it is signed and sent.
    ///
    /// - `null` and `{}` become the empty string.
    /// - Anything else is compact JSON with keys in insertion order.
    pub fn canonical_body(body: &Value) -> Result<String> {
        match body {
            Value::Null => Ok(String::new()),
            Value::Object(map) if map.is_empty() => Ok(String::new()),
            v => Ok(serde_json::to_string(v)?),
        }
    }

    /// Build the prehash string.
    ///
    /// ## Format
    ///
    /// ```text
    /// timestamp_millis + METHOD + request_path + body
    /// ```
    pub fn prehash(&self) -> String {
        let mut s = String::with_capacity(
            20 + self.method.as_str().len() + self.request_path.len() + self.body.len(),
        );
        // Writing into a String never fails.
        let _ = write!(s, "{}", self.timestamp_millis);
        s.push_str(self.method.as_str());
        s.push_str(&self.request_path);
        s.push_str(&self.body);

        s
    }
}
