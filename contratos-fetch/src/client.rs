//! HTTP client adapter.
//!
//! [`ApiClient`] turns an [`ApiRequest`] into a `reqwest::Request`, attaches
//! the bearer token read from its [`TokenStore`] at call time, sends it once
//! through a [`Transport`] and normalizes the response:
//!
//! - 2xx: the body is decoded as JSON into the caller's type
//! - anything else: the body is parsed into an [`ApiError`], or one is
//!   synthesized from the status code and reason phrase
//!
//! There is no retry; each call is a single attempt.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use contratos_core::{ApiError, FilterSet};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Request};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::FetchError;
use crate::host::http::{DEFAULT_TIMEOUT_SECS, ReqwestTransport, Transport, TransportResponse, USER_AGENT};
use crate::token::{MemoryTokenStore, TokenStore};

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Environment variable selecting the API base URL.
pub const API_URL_ENV: &str = "CONTRATOS_API_URL";

// ============================================================================
// Query Parameters
// ============================================================================

/// Ordered query parameters.
///
/// Absent and empty values are dropped when pushed, so they are never
/// serialized as `key=`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter unless the value is absent or empty.
    pub fn push<V: ToString>(&mut self, key: impl Into<String>, value: Option<V>) {
        let Some(value) = value.map(|v| v.to_string()) else {
            return;
        };
        if !value.is_empty() {
            self.0.push((key.into(), value));
        }
    }

    /// Builder-style [`QueryParams::push`].
    #[must_use]
    pub fn with<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.push(key, value);
        self
    }

    /// Returns the parameters in insertion order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// Returns true if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends the parameters to `url`. Leaves the URL untouched when empty.
    pub fn apply(&self, url: &mut Url) {
        if self.0.is_empty() {
            return;
        }
        url.query_pairs_mut().extend_pairs(self.0.iter());
    }
}

impl From<&FilterSet> for QueryParams {
    fn from(filters: &FilterSet) -> Self {
        let mut params = Self::new();
        for (key, value) in filters.params() {
            params.push(key, Some(value));
        }
        params
    }
}

// ============================================================================
// Request
// ============================================================================

/// A file to send as a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name reported to the server.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
    /// Declared MIME type, if known.
    pub mime: Option<String>,
}

impl UploadFile {
    /// Creates an upload file from memory.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            mime: None,
        }
    }

    /// Sets the declared MIME type.
    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Reads a file from disk.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(file_name, bytes))
    }

    /// File size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Request body modes.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// JSON body, sent with `Content-Type: application/json`.
    Json(serde_json::Value),
    /// Single-part multipart form. The content type and boundary are written
    /// by the transport.
    Multipart {
        /// Form field name.
        field: String,
        /// File placed in the field.
        file: UploadFile,
    },
}

/// A request against an API endpoint.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path appended to the base URL (e.g. `/contratos`).
    pub endpoint: String,
    /// Query parameters, in order.
    pub query: QueryParams,
    /// Extra headers; these win over the defaults.
    pub headers: HeaderMap,
    /// Request body.
    pub body: RequestBody,
}

impl ApiRequest {
    /// Creates a request.
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            query: QueryParams::new(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    /// Creates a GET request.
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    /// Creates a POST request.
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    /// Sets the query parameters.
    #[must_use]
    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, FetchError> {
        let value =
            serde_json::to_value(body).map_err(|e| FetchError::InvalidRequest(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Sets a single-file multipart body.
    #[must_use]
    pub fn multipart(mut self, field: impl Into<String>, file: UploadFile) -> Self {
        self.body = RequestBody::Multipart {
            field: field.into(),
            file,
        };
        self
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Resolves the API base URL.
///
/// Precedence: explicit flag, then [`API_URL_ENV`], then the configured
/// value, then [`DEFAULT_API_URL`]. Empty strings are skipped.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if the winning value does not parse.
pub fn resolve_base_url(flag: Option<&str>, configured: Option<&str>) -> Result<Url, FetchError> {
    let env = std::env::var(API_URL_ENV).ok();
    resolve_base_url_with(flag, env.as_deref(), configured)
}

/// [`resolve_base_url`] with the environment value passed in.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if the winning value does not parse.
pub fn resolve_base_url_with(
    flag: Option<&str>,
    env: Option<&str>,
    configured: Option<&str>,
) -> Result<Url, FetchError> {
    let raw = [flag, env, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_API_URL);

    Url::parse(raw).map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))
}

// ============================================================================
// API Client
// ============================================================================

/// HTTP client adapter for the contracts API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    builder: Client,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Creates a builder.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the token store used for requests.
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Builds the full URL for an endpoint and parameters.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if the result does not parse.
    pub fn url_for(&self, endpoint: &str, query: &QueryParams) -> Result<Url, FetchError> {
        let raw = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), endpoint);
        let mut url = Url::parse(&raw).map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))?;
        query.apply(&mut url);
        Ok(url)
    }

    /// Builds the `reqwest::Request` for `request` with the given token.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid URL or header value.
    pub fn build_request(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<Request, FetchError> {
        let url = self.url_for(&request.endpoint, &request.query)?;
        let mut builder = self.builder.request(request.method.clone(), url);

        match &request.body {
            RequestBody::Empty => {}
            RequestBody::Json(value) => {
                let body = serde_json::to_vec(value)
                    .map_err(|e| FetchError::InvalidRequest(e.to_string()))?;
                builder = builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(body);
            }
            RequestBody::Multipart { field, file } => {
                let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
                if let Some(mime) = &file.mime {
                    part = part.mime_str(mime)?;
                }
                builder = builder.multipart(Form::new().part(field.clone(), part));
            }
        }

        if let Some(token) = token.filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| FetchError::InvalidRequest(e.to_string()))?;
            builder = builder.header(header::AUTHORIZATION, value);
        }

        let mut built = builder.build()?;
        for (name, value) in &request.headers {
            built.headers_mut().insert(name.clone(), value.clone());
        }
        Ok(built)
    }

    /// Sends a request and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Api`] for a non-success status
    /// - [`FetchError::Network`] / [`FetchError::Timeout`] when no response arrives
    /// - [`FetchError::InvalidResponse`] when a success body is not the expected JSON
    #[instrument(skip(self, request), fields(method = %request.method, endpoint = %request.endpoint))]
    pub async fn request<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, FetchError> {
        let token = self.tokens.get_token().await?;
        debug!(authenticated = token.is_some(), "Building request");

        let built = self.build_request(&request, token.as_deref())?;
        let response = self.transport.execute(built).await.inspect_err(|e| {
            warn!(error = %e, "Request failed without a response");
        })?;

        decode_response(response)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Normalizes a received response.
///
/// # Errors
///
/// Returns [`FetchError::Api`] for a non-success status and
/// [`FetchError::InvalidResponse`] for an undecodable success body.
pub fn decode_response<T: DeserializeOwned>(response: TransportResponse) -> Result<T, FetchError> {
    let status = response.status;

    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("Unknown Status");
        let error = ApiError::from_response(status.as_u16(), reason, &response.body);
        debug!(status = %status, message = %error.message, "API error response");
        return Err(error.into());
    }

    serde_json::from_slice(&response.body).map_err(|e| {
        warn!(status = %status, error = %e, "Failed to decode response body");
        FetchError::InvalidResponse(e.to_string())
    })
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    base_url: Option<Url>,
    timeout: Duration,
    transport: Option<Arc<dyn Transport>>,
    tokens: Option<Arc<dyn TokenStore>>,
}

impl ApiClientBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            transport: None,
            tokens: None,
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the request timeout (ignored with a custom transport).
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the transport.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the token store.
    #[must_use]
    pub fn tokens(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the default base URL or HTTP client cannot be created.
    pub fn build(self) -> Result<ApiClient, FetchError> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => resolve_base_url_with(None, None, None)?,
        };

        let (builder, transport): (Client, Arc<dyn Transport>) = match self.transport {
            Some(transport) => (Client::builder().user_agent(USER_AGENT).build()?, transport),
            None => {
                let reqwest = ReqwestTransport::with_timeout(self.timeout)?;
                (reqwest.inner().clone(), Arc::new(reqwest))
            }
        };

        Ok(ApiClient {
            base_url,
            builder,
            transport,
            tokens: self
                .tokens
                .unwrap_or_else(|| Arc::new(MemoryTokenStore::new())),
        })
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use contratos_core::{FilterField, LoginRequest, LoginResponse};
    use reqwest::StatusCode;
    use serde_json::json;

    use super::*;

    /// What the fake transport saw.
    #[derive(Debug, Clone)]
    struct Recorded {
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    }

    /// Returns a canned response and records every request.
    struct RecordingTransport {
        response: TransportResponse,
        seen: Mutex<Vec<Recorded>>,
    }

    impl RecordingTransport {
        fn new(status: StatusCode, body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: TransportResponse::new(status, body.as_bytes().to_vec()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn last(&self) -> Recorded {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn execute(&self, request: Request) -> Result<TransportResponse, FetchError> {
            self.seen.lock().unwrap().push(Recorded {
                method: request.method().clone(),
                url: request.url().clone(),
                headers: request.headers().clone(),
                body: request.body().and_then(|b| b.as_bytes()).map(<[u8]>::to_vec),
            });
            Ok(self.response.clone())
        }
    }

    struct OfflineTransport;

    #[async_trait]
    impl Transport for OfflineTransport {
        async fn execute(&self, _request: Request) -> Result<TransportResponse, FetchError> {
            Err(FetchError::Network("connection refused".to_string()))
        }
    }

    fn client(transport: Arc<dyn Transport>, tokens: Arc<dyn TokenStore>) -> ApiClient {
        ApiClient::builder()
            .base_url(Url::parse("http://api.test/").unwrap())
            .transport(transport)
            .tokens(tokens)
            .build()
            .unwrap()
    }

    #[test]
    fn test_query_params_skip_empty() {
        let params = QueryParams::new()
            .with("a", Some("1"))
            .with("b", None::<&str>)
            .with("c", Some(""))
            .with("page", Some(2));

        assert_eq!(
            params.pairs(),
            &[
                ("a".to_string(), "1".to_string()),
                ("page".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_query_params_from_filters() {
        let filters = FilterSet::with_defaults()
            .with(FilterField::Status, "ATIVO")
            .unwrap();
        let params = QueryParams::from(&filters);

        let keys: Vec<&str> = params.pairs().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["status", "page", "limit"]);
    }

    #[test]
    fn test_url_for_joins_without_double_slash() {
        let client = client(
            RecordingTransport::new(StatusCode::OK, "{}"),
            Arc::new(MemoryTokenStore::new()),
        );

        let url = client.url_for("/contratos", &QueryParams::new()).unwrap();
        assert_eq!(url.as_str(), "http://api.test/contratos");
        assert!(url.query().is_none());

        let url = client
            .url_for("/contratos", &QueryParams::new().with("page", Some(1)))
            .unwrap();
        assert_eq!(url.as_str(), "http://api.test/contratos?page=1");
    }

    #[test]
    fn test_build_request_bearer_only_with_token() {
        let client = client(
            RecordingTransport::new(StatusCode::OK, "{}"),
            Arc::new(MemoryTokenStore::new()),
        );
        let req = ApiRequest::get("/contratos");

        let without = client.build_request(&req, None).unwrap();
        assert!(without.headers().get(header::AUTHORIZATION).is_none());

        let empty = client.build_request(&req, Some("")).unwrap();
        assert!(empty.headers().get(header::AUTHORIZATION).is_none());

        let with = client.build_request(&req, Some("abc")).unwrap();
        assert_eq!(with.headers()[header::AUTHORIZATION], "Bearer abc");
    }

    #[test]
    fn test_build_request_caller_headers_win() {
        let client = client(
            RecordingTransport::new(StatusCode::OK, "{}"),
            Arc::new(MemoryTokenStore::new()),
        );
        let req = ApiRequest::post("/login")
            .json(&json!({"a": 1}))
            .unwrap()
            .header(header::CONTENT_TYPE, HeaderValue::from_static("application/vnd.test+json"));

        let built = client.build_request(&req, None).unwrap();
        assert_eq!(built.headers()[header::CONTENT_TYPE], "application/vnd.test+json");
    }

    #[test]
    fn test_build_request_multipart_sets_boundary() {
        let client = client(
            RecordingTransport::new(StatusCode::OK, "{}"),
            Arc::new(MemoryTokenStore::new()),
        );
        let req = ApiRequest::post("/contratos/upload")
            .multipart("file", UploadFile::new("contratos.csv", b"a,b\n1,2\n".to_vec()));

        let built = client.build_request(&req, Some("tok")).unwrap();
        let content_type = built.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        assert_eq!(built.headers()[header::AUTHORIZATION], "Bearer tok");
    }

    #[tokio::test]
    async fn test_request_json_body_and_decode() {
        let transport = RecordingTransport::new(StatusCode::CREATED, r#"{"access_token":"t1"}"#);
        let client = client(transport.clone(), Arc::new(MemoryTokenStore::new()));

        let req = ApiRequest::post("/login")
            .json(&LoginRequest::new("admin", "secret"))
            .unwrap();
        let response: LoginResponse = client.request(req).await.unwrap();
        assert_eq!(response.access_token, "t1");

        let seen = transport.last();
        assert_eq!(seen.method, Method::POST);
        assert_eq!(seen.url.path(), "/login");
        assert_eq!(seen.headers[header::CONTENT_TYPE], "application/json");
        assert!(seen.headers.get(header::AUTHORIZATION).is_none());

        let body: serde_json::Value = serde_json::from_slice(&seen.body.unwrap()).unwrap();
        assert_eq!(body, json!({"usuario": "admin", "senha": "secret"}));
    }

    #[tokio::test]
    async fn test_request_reads_token_per_call() {
        let transport = RecordingTransport::new(StatusCode::OK, "{}");
        let tokens = Arc::new(MemoryTokenStore::with_token("first"));
        let client = client(transport.clone(), tokens.clone());

        let _: serde_json::Value = client.request(ApiRequest::get("/contratos")).await.unwrap();
        assert_eq!(transport.last().headers[header::AUTHORIZATION], "Bearer first");

        tokens.remove_token().await.unwrap();
        let _: serde_json::Value = client.request(ApiRequest::get("/contratos")).await.unwrap();
        assert!(transport.last().headers.get(header::AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_error_body_is_passed_through() {
        let transport = RecordingTransport::new(
            StatusCode::BAD_REQUEST,
            r#"{"statusCode":400,"message":"CSV inválido","errors":["linha 2: email"]}"#,
        );
        let client = client(transport, Arc::new(MemoryTokenStore::new()));

        let err = client
            .request::<serde_json::Value>(ApiRequest::get("/contratos"))
            .await
            .unwrap_err();
        let api = err.api_error().unwrap();
        assert_eq!(api.status_code, 400);
        assert_eq!(api.message, "CSV inválido");
        assert_eq!(api.field_errors(), &["linha 2: email".to_string()]);
    }

    #[tokio::test]
    async fn test_non_json_error_is_synthesized() {
        let transport = RecordingTransport::new(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        let client = client(transport, Arc::new(MemoryTokenStore::new()));

        let err = client
            .request::<serde_json::Value>(ApiRequest::get("/contratos"))
            .await
            .unwrap_err();
        let api = err.api_error().unwrap();
        assert_eq!(api.status_code, 502);
        assert_eq!(api.message, "Bad Gateway");
        assert!(api.errors.is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_is_flagged() {
        let transport = RecordingTransport::new(
            StatusCode::UNAUTHORIZED,
            r#"{"statusCode":401,"message":"Unauthorized"}"#,
        );
        let client = client(transport, Arc::new(MemoryTokenStore::with_token("old")));

        let err = client
            .request::<serde_json::Value>(ApiRequest::get("/contratos"))
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_invalid_success_body() {
        let transport = RecordingTransport::new(StatusCode::OK, "not json");
        let client = client(transport, Arc::new(MemoryTokenStore::new()));

        let err = client
            .request::<LoginResponse>(ApiRequest::get("/contratos"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let client = client(Arc::new(OfflineTransport), Arc::new(MemoryTokenStore::new()));

        let err = client
            .request::<serde_json::Value>(ApiRequest::get("/contratos"))
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert!(err.api_error().is_none());
    }

    #[test]
    fn test_resolve_base_url_precedence() {
        let url = resolve_base_url_with(Some("http://flag:1"), Some("http://env:2"), Some("http://cfg:3"));
        assert_eq!(url.unwrap().as_str(), "http://flag:1/");

        let url = resolve_base_url_with(None, Some("http://env:2"), Some("http://cfg:3"));
        assert_eq!(url.unwrap().as_str(), "http://env:2/");

        let url = resolve_base_url_with(Some(""), None, Some("http://cfg:3"));
        assert_eq!(url.unwrap().as_str(), "http://cfg:3/");

        let url = resolve_base_url_with(None, None, None);
        assert_eq!(url.unwrap().as_str(), "http://localhost:3000/");
    }

    #[test]
    fn test_resolve_base_url_rejects_garbage() {
        let err = resolve_base_url_with(Some("not a url"), None, None).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
