use std::fmt::{Debug, Formatter};

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::HeaderValue;
use log::{debug, warn};
use serde_json::Value;

use crate::path::build_path;
use crate::sign_request::sign_headers;
use crate::time::{now, timestamp_millis, DateTime};
use crate::{ClientIdentity, Context, Error, Method, PaginationOptions, Result, SigningRequest};

/// One API call before it is signed.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    /// HTTP method, only GET, POST and DELETE are accepted.
    pub method: http::Method,
    /// Resource path without the version prefix, e.g. `users/42/ledger`.
    pub path: String,
    /// JSON body. Only sent for POST; `null` and `{}` mean no body.
    pub body: Value,
    /// Optional pagination appended to the query string.
    pub pagination: Option<PaginationOptions>,
}

impl RequestSpec {
    /// Create a request without body and pagination.
    pub fn new(method: http::Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: Value::Null,
            pagination: None,
        }
    }

    /// Create a GET request spec.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(http::Method::GET, path)
    }

    /// Create a POST request spec.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(http::Method::POST, path)
    }

    /// Create a DELETE request spec.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(http::Method::DELETE, path)
    }

    /// Set the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Set the pagination options.
    pub fn with_pagination(mut self, pagination: PaginationOptions) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

/// Dispatcher signs requests and sends them through the context's [`crate::HttpSend`].
///
/// It holds no mutable state: concurrent calls on a shared dispatcher are
/// independent and each one reads the clock once.
#[derive(Clone)]
pub struct Dispatcher {
    ctx: Context,
    endpoint: String,
    version: String,
    identity: ClientIdentity,

    time: Option<DateTime>,
}

impl Debug for Dispatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("endpoint", &self.endpoint)
            .field("version", &self.version)
            .field("identity", &self.identity)
            .finish()
    }
}

impl Dispatcher {
    /// Create a new dispatcher.
    ///
    /// A trailing `/` on `endpoint` and a leading `v` on `version` are ignored,
    /// so both `1` and `v1` produce `/v1/...` paths.
    pub fn new(
        ctx: Context,
        endpoint: impl Into<String>,
        version: impl Into<String>,
        identity: ClientIdentity,
    ) -> Self {
        let endpoint: String = endpoint.into();
        let version: String = version.into();
        Self {
            ctx,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            version: version.trim_start_matches(['v', 'V']).to_string(),
            identity,

            time: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// The identity requests are signed with.
    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    /// The base url without trailing `/`.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The API version used in request paths.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Build the signed http request without sending it.
    pub fn build_request(&self, spec: &RequestSpec) -> Result<http::Request<Bytes>> {
        self.prepare(spec).map(|(_, req)| req)
    }

    /// Sign and send a request, then decode the JSON response.
    ///
    /// - Methods other than GET, POST and DELETE fail with
    ///   [`crate::ErrorKind::MethodUnsupported`] before anything is sent.
    /// - Transport errors and non-2xx statuses fail with
    ///   [`crate::ErrorKind::RequestFailed`].
    /// - A body that is not JSON fails with [`crate::ErrorKind::DecodeFailed`].
    ///
    /// An empty response body decodes to `Value::Null`. Nothing is retried.
    pub async fn dispatch(&self, spec: RequestSpec) -> Result<Value> {
        let (signing, req) = self.prepare(&spec)?;
        let method = signing.method;
        let path = signing.request_path;

        debug!("dispatching {method} {}{path}", self.endpoint);
        let resp = self.ctx.http_send(req).await.map_err(|err| {
            Error::request_failed(format!("{method} {path}: transport failed")).with_source(err)
        })?;

        let (parts, body) = resp.into_parts();
        debug!("{method} {path} responded {}", parts.status);

        if !parts.status.is_success() {
            return Err(Error::request_failed(format!(
                "{method} {path}: server responded {}: {}",
                parts.status,
                String::from_utf8_lossy(&body)
            ))
            .with_status(parts.status));
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&body).map_err(|err| {
            Error::decode_failed(format!("{method} {path}: response is not valid json"))
                .with_source(err)
        })
    }

    fn prepare(&self, spec: &RequestSpec) -> Result<(SigningRequest, http::Request<Bytes>)> {
        let method = Method::try_from(&spec.method)?;
        let request_path = build_path(&self.version, &spec.path, spec.pagination.as_ref());

        let body = if method.has_body() {
            SigningRequest::canonical_body(&spec.body)?
        } else {
            if !SigningRequest::canonical_body(&spec.body)?.is_empty() {
                warn!("{method} {request_path} does not send a body, dropping it");
            }
            String::new()
        };

        let now = self.time.unwrap_or_else(now);
        let signing = SigningRequest {
            timestamp_millis: timestamp_millis(now),
            method,
            request_path,
            body,
        };
        let auth = sign_headers(&self.identity, &signing)?;

        let mut req = http::Request::builder()
            .method(http::Method::from(method))
            .uri(format!("{}{}", self.endpoint, signing.request_path))
            .body(Bytes::from(signing.body.clone()))?;

        let headers = req.headers_mut();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if !signing.body.is_empty() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        auth.apply(headers)?;

        Ok((signing, req))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use http::StatusCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::time::from_timestamp_millis;
    use crate::{sign, ErrorKind, HttpSend, Order};

    const SECRET: &str = "czNjcjN0";

    /// Records every request and answers with a canned response.
    #[derive(Debug, Clone)]
    struct SpyHttpSend {
        requests: Arc<Mutex<Vec<http::Request<Bytes>>>>,
        status: StatusCode,
        body: &'static str,
    }

    impl SpyHttpSend {
        fn new(status: StatusCode, body: &'static str) -> Self {
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                status,
                body,
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpSend for SpyHttpSend {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            self.requests.lock().unwrap().push(req);
            Ok(http::Response::builder()
                .status(self.status)
                .body(Bytes::from_static(self.body.as_bytes()))?)
        }
    }

    fn dispatcher(spy: &SpyHttpSend, identity: ClientIdentity) -> Dispatcher {
        let _ = env_logger::builder().is_test(true).try_init();

        let ctx = Context::new().with_http_send(spy.clone());
        Dispatcher::new(ctx, "http://localhost:3000/", "1", identity)
            .with_time(from_timestamp_millis(1000).unwrap())
    }

    fn partner() -> ClientIdentity {
        ClientIdentity::partner("api-key", SECRET, "partner-1", "partnership-1")
    }

    #[test_case::test_case("1", "http://localhost:3000/v1/exchanges"; "bare")]
    #[test_case::test_case("v1", "http://localhost:3000/v1/exchanges"; "prefixed")]
    #[test_case::test_case("V2", "http://localhost:3000/v2/exchanges"; "upper prefixed")]
    fn test_version_prefix_is_normalized(version: &str, expected: &str) {
        let ctx = Context::new();
        let d = Dispatcher::new(ctx, "http://localhost:3000", version, partner())
            .with_time(from_timestamp_millis(1000).unwrap());

        let req = d.build_request(&RequestSpec::get("exchanges")).unwrap();
        assert_eq!(req.uri().to_string(), expected);
    }

    #[tokio::test]
    async fn test_unsupported_method_sends_nothing() {
        let spy = SpyHttpSend::new(StatusCode::OK, "{}");
        let d = dispatcher(&spy, partner());

        let err = d
            .dispatch(RequestSpec::new(http::Method::PATCH, "users/1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MethodUnsupported);
        assert_eq!(spy.calls(), 0);
    }

    #[tokio::test]
    async fn test_get_with_pagination() -> anyhow::Result<()> {
        let spy = SpyHttpSend::new(StatusCode::OK, r#"{"ledger": []}"#);
        let d = dispatcher(&spy, partner());

        let spec = RequestSpec::get("connected-exchanges/42/ledger").with_pagination(
            PaginationOptions::new()
                .with_limit(3)
                .with_order(Order::Asc)
                .with_page(1),
        );
        let value = d.dispatch(spec).await?;
        assert_eq!(value, json!({"ledger": []}));

        let requests = spy.requests.lock().unwrap();
        let req = &requests[0];
        assert_eq!(req.method(), http::Method::GET);
        assert_eq!(
            req.uri().to_string(),
            "http://localhost:3000/v1/connected-exchanges/42/ledger?limit=3&order=asc&page=1"
        );
        assert!(req.body().is_empty());
        assert!(req.headers().get(CONTENT_TYPE).is_none());

        let expected = sign(
            SECRET,
            "1000GET/v1/connected-exchanges/42/ledger?limit=3&order=asc&page=1",
        )?;
        assert_eq!(req.headers().get("BB-ACCESS-SIGN").unwrap(), &expected);
        assert_eq!(req.headers().get("BB-TIMESTAMP").unwrap(), "1000");
        assert_eq!(req.headers().get("BB-PARTNER-ID").unwrap(), "partner-1");
        Ok(())
    }

    #[tokio::test]
    async fn test_post_sends_signed_bytes() -> anyhow::Result<()> {
        let spy = SpyHttpSend::new(StatusCode::CREATED, r#"{"id": "ca-1"}"#);
        let d = dispatcher(&spy, partner());

        let body = json!({"asset_id": "btc", "address": "1abc", "user_id": "u1"});
        d.dispatch(RequestSpec::post("connected-addresses").with_body(body))
            .await?;

        let requests = spy.requests.lock().unwrap();
        let req = &requests[0];
        let sent = std::str::from_utf8(req.body())?;
        assert_eq!(sent, r#"{"asset_id":"btc","address":"1abc","user_id":"u1"}"#);
        assert_eq!(
            req.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let expected = sign(SECRET, &format!("1000POST/v1/connected-addresses{sent}"))?;
        assert_eq!(req.headers().get("BB-ACCESS-SIGN").unwrap(), &expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_post_sends_no_body() -> anyhow::Result<()> {
        let spy = SpyHttpSend::new(StatusCode::OK, r#"{"user": {"id": "u1"}}"#);
        let d = dispatcher(&spy, partner());

        d.dispatch(RequestSpec::post("partnerships/partnership-1/users").with_body(json!({})))
            .await?;

        let requests = spy.requests.lock().unwrap();
        let req = &requests[0];
        assert!(req.body().is_empty());
        let expected = sign(SECRET, "1000POST/v1/partnerships/partnership-1/users")?;
        assert_eq!(req.headers().get("BB-ACCESS-SIGN").unwrap(), &expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_anonymous_sends_no_auth_headers() -> anyhow::Result<()> {
        let spy = SpyHttpSend::new(StatusCode::OK, "{}");
        let d = dispatcher(&spy, ClientIdentity::Anonymous);

        d.dispatch(RequestSpec::post("users")).await?;

        let requests = spy.requests.lock().unwrap();
        let headers = requests[0].headers();
        for name in ["BB-ACCESS-KEY", "BB-ACCESS-SIGN", "BB-TIMESTAMP", "BB-PARTNER-ID", "BB-USER-ID"] {
            assert!(headers.get(name).is_none(), "{name} must not be sent");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let spy = SpyHttpSend::new(StatusCode::UNAUTHORIZED, r#"{"error": "bad signature"}"#);
        let d = dispatcher(&spy, partner());

        let err = d.dispatch(RequestSpec::get("exchanges")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestFailed);
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.to_string().contains("GET /v1/exchanges"), "{err}");
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let d = Dispatcher::new(Context::new(), "http://localhost:3000", "1", partner());

        let err = d.dispatch(RequestSpec::get("exchanges")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestFailed);
        assert!(err.status().is_none());
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let spy = SpyHttpSend::new(StatusCode::OK, "<html>oops</html>");
        let d = dispatcher(&spy, partner());

        let err = d.dispatch(RequestSpec::get("exchanges")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeFailed);
    }

    #[tokio::test]
    async fn test_empty_response_is_null() -> anyhow::Result<()> {
        let spy = SpyHttpSend::new(StatusCode::NO_CONTENT, "");
        let d = dispatcher(&spy, partner());

        let value = d.dispatch(RequestSpec::delete("users/u1")).await?;
        assert_eq!(value, Value::Null);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_secret_sends_nothing() {
        let spy = SpyHttpSend::new(StatusCode::OK, "{}");
        let d = dispatcher(&spy, ClientIdentity::user("api-key", "***", "user-1"));

        let err = d.dispatch(RequestSpec::get("exchanges")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SecretInvalid);
        assert_eq!(spy.calls(), 0);
    }

    #[test]
    fn test_get_drops_body() -> anyhow::Result<()> {
        let spy = SpyHttpSend::new(StatusCode::OK, "{}");
        let d = dispatcher(&spy, partner());

        let req = d.build_request(&RequestSpec::get("exchanges").with_body(json!({"a": 1})))?;
        assert!(req.body().is_empty());
        let expected = sign(SECRET, "1000GET/v1/exchanges")?;
        assert_eq!(req.headers().get("BB-ACCESS-SIGN").unwrap(), &expected);
        Ok(())
    }
}
