use http::Method;
use once_cell::sync::OnceCell;
use std::sync::Arc;

use super::client::ClientInfo;
use super::context::RequestContext;
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::response::HeaderVec;

/// Inbound HTTP-style request.
///
/// Holds the raw pieces the dispatcher needs: verb, path, query string,
/// headers, body and peer address. The decoded variable view
/// ([`RequestContext`]) is built on first use and cached for the lifetime of
/// the request.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: String,
    headers: HeaderVec,
    cgi_content_type: Option<String>,
    body: Vec<u8>,
    remote_addr: Option<String>,
    request_id: RequestId,
    context: OnceCell<RequestContext>,
}

impl Request {
    /// Start building a request (defaults: `GET /`, no headers, empty body).
    #[must_use]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Build a request from CGI meta-variables.
    ///
    /// Reads `REQUEST_METHOD`, `REQUEST_URI` (falling back to `PATH_INFO`),
    /// `QUERY_STRING`, `CONTENT_TYPE`, `REMOTE_ADDR` and every `HTTP_*`
    /// variable as a header (`HTTP_USER_AGENT` becomes `user-agent`).
    pub fn from_cgi<I, K, V>(vars: I, body: impl Into<Vec<u8>>) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut builder = Request::builder().body(body);
        let mut request_uri: Option<String> = None;
        let mut path_info: Option<String> = None;
        let mut query: Option<String> = None;

        for (key, value) in vars {
            let key = key.as_ref();
            let value: String = value.into();
            match key {
                "REQUEST_METHOD" => {
                    let method = Method::from_bytes(value.as_bytes())
                        .map_err(|e| anyhow::anyhow!("invalid REQUEST_METHOD '{value}': {e}"))?;
                    builder = builder.method(method);
                }
                "REQUEST_URI" => request_uri = Some(value),
                "PATH_INFO" => path_info = Some(value),
                "QUERY_STRING" => query = Some(value),
                "CONTENT_TYPE" => builder.cgi_content_type = Some(value),
                "REMOTE_ADDR" => builder = builder.remote_addr(&value),
                _ => {
                    if let Some(name) = key.strip_prefix("HTTP_") {
                        let name = name.to_ascii_lowercase().replace('_', "-");
                        builder = builder.header(&name, value);
                    }
                }
            }
        }

        let uri = request_uri.or(path_info).unwrap_or_else(|| "/".to_string());
        builder = builder.uri(&uri);
        if let Some(q) = query {
            builder.query = q;
        }
        Ok(builder.build())
    }

    /// Request verb.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string (without `?`), possibly empty.
    #[must_use]
    pub fn query_string(&self) -> &str {
        &self.query
    }

    /// First header with the given name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All headers in arrival order.
    #[must_use]
    pub fn headers(&self) -> &HeaderVec {
        &self.headers
    }

    /// Declared content type.
    ///
    /// The CGI `CONTENT_TYPE` meta-variable is authoritative; the
    /// `Content-Type` header is consulted when it is absent.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.cgi_content_type
            .as_deref()
            .or_else(|| self.header("content-type"))
    }

    /// Raw body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Peer address as given by the transport.
    #[must_use]
    pub fn remote_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    /// Correlation id used in log events.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Peer address and user agent.
    #[must_use]
    pub fn client(&self) -> ClientInfo<'_> {
        ClientInfo::new(self.remote_addr(), self.header("user-agent"))
    }

    /// Decoded variables, built on the first call and reused afterwards.
    pub fn context(&self) -> &RequestContext {
        self.context
            .get_or_init(|| RequestContext::from_request(self))
    }
}

impl<B: Into<Vec<u8>>> From<http::Request<B>> for Request {
    fn from(req: http::Request<B>) -> Self {
        let (parts, body) = req.into_parts();
        let mut builder = Request::builder()
            .method(parts.method)
            .body(body);
        builder.path = parts.uri.path().to_string();
        builder.query = parts.uri.query().unwrap_or("").to_string();
        for (name, value) in &parts.headers {
            builder = builder.header(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }
        builder.build()
    }
}

/// Builder for [`Request`].
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    path: String,
    query: String,
    headers: HeaderVec,
    cgi_content_type: Option<String>,
    body: Vec<u8>,
    remote_addr: Option<String>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query: String::new(),
            headers: HeaderVec::new(),
            cgi_content_type: None,
            body: Vec::new(),
            remote_addr: None,
        }
    }
}

impl RequestBuilder {
    /// Set the verb.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set path and query from a request target such as `/users/7?full=1`.
    #[must_use]
    pub fn uri(mut self, uri: &str) -> Self {
        let (path, query) = uri.split_once('?').unwrap_or((uri, ""));
        self.path = if path.is_empty() { "/".to_string() } else { path.to_string() };
        self.query = query.to_string();
        self
    }

    /// Append a header.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    /// Set the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize `value` as the body and declare `application/json`.
    #[must_use]
    pub fn json(self, value: &serde_json::Value) -> Self {
        self.header("Content-Type", "application/json")
            .body(value.to_string())
    }

    /// Set the peer address.
    #[must_use]
    pub fn remote_addr(mut self, addr: &str) -> Self {
        self.remote_addr = Some(addr.to_string());
        self
    }

    /// Finish the request. A valid ULID in `X-Request-Id` becomes the
    /// request id.
    #[must_use]
    pub fn build(self) -> Request {
        let request_id = RequestId::from_header_or_new(
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(REQUEST_ID_HEADER))
                .map(|(_, v)| v.as_str()),
        );
        Request {
            method: self.method,
            path: self.path,
            query: self.query,
            headers: self.headers,
            cgi_content_type: self.cgi_content_type,
            body: self.body,
            remote_addr: self.remote_addr,
            request_id,
            context: OnceCell::new(),
        }
    }
}
