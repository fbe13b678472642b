//! HTTP request pipeline
//!
//! Every request goes through the same two hooks: the outgoing hook attaches
//! the bearer token when the session has one, and the incoming hook turns
//! failures into [`ApiError`] and treats a 401 from anything other than the
//! login endpoint as an expired session.

use super::auth::AuthContext;
use super::constants::LOGIN_PATH;
use super::error::ApiError;
use crate::navigation::{Navigator, Route};
use log::{debug, warn};
use reqwest::{Method, RequestBuilder, Response, StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Error payload the backend returns alongside non-2xx statuses
#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    code: Option<i64>,
    message: Option<String>,
}

/// Authenticated HTTP client for the procurement backend
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<AuthContext>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        auth: Arc<AuthContext>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url, auth, navigator)
    }

    /// Client whose requests give up after `timeout`
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
        auth: Arc<AuthContext>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.into();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Network {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self::with_http_client(http, base_url, auth, navigator))
    }

    pub fn with_http_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        auth: Arc<AuthContext>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
            navigator,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    /// Absolute URL for a path (with or without query string)
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Outgoing hook
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.auth.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Incoming hook for a failed response. Returns whether the session was
    /// expired as a result.
    fn on_error_status(&self, path: &str, status: StatusCode) -> bool {
        if status != StatusCode::UNAUTHORIZED || is_login_request(path) {
            return false;
        }

        warn!("Received 401 from {}; clearing session", path);
        if let Err(e) = self.auth.logout() {
            warn!("Failed to clear persisted session: {:#}", e);
        }
        self.navigator.redirect(Route::Login);
        true
    }

    /// Send a request through both hooks
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        let url = self.url(path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }
        let request = self.authorize(request);

        debug!("{} {}", method, url);
        let response = request.send().await.map_err(|source| {
            debug!("{} {} failed before a response: {}", method, url, source);
            ApiError::Network {
                url: url.clone(),
                source,
            }
        })?;

        let status = response.status();
        debug!("{} {} -> {}", method, url, status);
        if status.is_success() {
            return Ok(response);
        }

        self.on_error_status(path, status);

        let body = response.text().await.unwrap_or_default();
        let payload: ErrorPayload = serde_json::from_str(&body).unwrap_or_default();
        Err(ApiError::Http {
            method: method.to_string(),
            path: path.to_string(),
            status,
            code: payload.code,
            message: payload.message,
            body,
        })
    }

    async fn read_json(path: &str, response: Response) -> Result<Value, ApiError> {
        let url = response.url().to_string();
        let text = response
            .text()
            .await
            .map_err(|source| ApiError::Network { url, source })?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|source| ApiError::InvalidBody {
            path: path.to_string(),
            source,
        })
    }

    pub async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let response = self.send(Method::GET, path, None).await?;
        Self::read_json(path, response).await
    }

    /// GET returning the body verbatim (e.g. EDMX metadata)
    pub async fn get_text(&self, path: &str) -> Result<String, ApiError> {
        let response = self.send(Method::GET, path, None).await?;
        let url = response.url().to_string();
        response
            .text()
            .await
            .map_err(|source| ApiError::Network { url, source })
    }

    pub async fn post_json(&self, path: &str, body: &impl Serialize) -> Result<Value, ApiError> {
        let body = to_body(path, body)?;
        let response = self.send(Method::POST, path, Some(&body)).await?;
        Self::read_json(path, response).await
    }

    pub async fn put_json(&self, path: &str, body: &impl Serialize) -> Result<Value, ApiError> {
        let body = to_body(path, body)?;
        let response = self.send(Method::PUT, path, Some(&body)).await?;
        Self::read_json(path, response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, None).await?;
        Ok(())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .finish()
    }
}

fn to_body(path: &str, body: &impl Serialize) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|source| ApiError::InvalidBody {
        path: path.to_string(),
        source,
    })
}

/// Whether `path` targets the credential exchange endpoint
pub fn is_login_request(path: &str) -> bool {
    path.contains(LOGIN_PATH)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::auth::encode_unsigned_token;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every redirect instead of acting on it
    #[derive(Default)]
    pub(crate) struct RecordingNavigator {
        pub redirects: Mutex<Vec<Route>>,
    }

    impl RecordingNavigator {
        pub(crate) fn redirects(&self) -> Vec<Route> {
            self.redirects.lock().unwrap().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn redirect(&self, to: Route) {
            self.redirects.lock().unwrap().push(to);
        }
    }

    pub(crate) fn employee_token() -> String {
        encode_unsigned_token(&json!({ "sub": "emp", "roles": ["ROLE_EMPLOYEE"] }))
    }

    pub(crate) fn client_for(
        server: &MockServer,
    ) -> (ApiClient, Arc<AuthContext>, Arc<RecordingNavigator>) {
        let auth = Arc::new(AuthContext::in_memory());
        let navigator = Arc::new(RecordingNavigator::default());
        let client = ApiClient::new(server.base_url(), auth.clone(), navigator.clone());
        (client, auth, navigator)
    }

    #[test]
    fn test_login_path_detection() {
        assert!(is_login_request("/auth/login"));
        assert!(is_login_request("/api/v1/auth/login?next=/"));
        assert!(!is_login_request("/odata/PurchaseOrders"));
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new(
            "http://localhost:8080/",
            Arc::new(AuthContext::in_memory()),
            Arc::new(RecordingNavigator::default()),
        );
        assert_eq!(client.url("/odata/Vendors"), "http://localhost:8080/odata/Vendors");
        assert_eq!(client.url("odata/Vendors"), "http://localhost:8080/odata/Vendors");
    }

    #[tokio::test]
    async fn test_bearer_token_attached_when_logged_in() {
        let server = MockServer::start_async().await;
        let token = employee_token();
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/profile")
                    .header("authorization", format!("Bearer {}", token));
                then.status(200).json_body(json!({ "result": { "username": "emp" } }));
            })
            .await;

        let (client, auth, _) = client_for(&server);
        auth.login(&token).unwrap();

        let body = client.get_json("/api/profile").await.unwrap();
        assert_eq!(body["result"]["username"], "emp");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_authorization_header_when_anonymous() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/ping").header_missing("authorization");
                then.status(200).body("");
            })
            .await;

        let (client, _, _) = client_for(&server);
        assert_eq!(client.get_json("/ping").await.unwrap(), Value::Null);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_401_on_regular_request_expires_session_once() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/odata/PurchaseOrders");
                then.status(401).json_body(json!({ "code": 1006, "message": "Unauthenticated" }));
            })
            .await;

        let (client, auth, navigator) = client_for(&server);
        auth.login(&employee_token()).unwrap();

        let err = client.get_json("/odata/PurchaseOrders").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.code(), Some(1006));
        assert!(!auth.is_authenticated());
        assert_eq!(navigator.redirects(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn test_401_on_login_request_is_left_to_caller() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/login");
                then.status(401)
                    .json_body(json!({ "code": 1008, "message": "Bad credentials" }));
            })
            .await;

        let (client, auth, navigator) = client_for(&server);
        auth.login(&employee_token()).unwrap();

        let err = client
            .post_json("/auth/login", &json!({ "username": "emp", "password": "nope" }))
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.server_message(), Some("Bad credentials"));
        assert!(auth.is_authenticated());
        assert!(navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_other_errors_pass_through_untouched() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/vendors/7");
                then.status(400).json_body(json!({ "code": 2002, "message": "Vendor code exists" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/analytics/dashboard");
                then.status(403).body("Forbidden");
            })
            .await;

        let (client, auth, navigator) = client_for(&server);
        auth.login(&employee_token()).unwrap();

        let err = client
            .put_json("/api/vendors/7", &json!({ "vendorCode": "VEN-001" }))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.code(), Some(2002));

        let err = client.get_json("/api/analytics/dashboard").await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(err.code(), None);

        assert!(auth.is_authenticated());
        assert!(navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_network_failure() {
        let auth = Arc::new(AuthContext::in_memory());
        let navigator = Arc::new(RecordingNavigator::default());
        // Port 9 (discard) on localhost is not expected to accept HTTP
        let client = ApiClient::with_timeout(
            "http://127.0.0.1:9",
            Duration::from_secs(2),
            auth,
            navigator.clone(),
        )
        .unwrap();

        let err = client.get_json("/odata/Vendors").await.unwrap_err();
        assert!(err.is_network());
        assert!(navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_non_json_success_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/odata/Vendors");
                then.status(200).body("<html>proxy error</html>");
            })
            .await;

        let (client, _, _) = client_for(&server);
        let err = client.get_json("/odata/Vendors").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidBody { .. }));
    }
}
