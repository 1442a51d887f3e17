//! Typed bindings for the Meraki Dashboard v1 REST API.
//!
//! Only the endpoints the provider's resources and data sources need are
//! bound. Every call performs exactly one HTTP request and returns
//! `Result<ApiResponse<T>, ApiError>`; retrying is the caller's business
//! (see [`crate::retry`]).

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::ClientSettings;
use crate::error::ApiError;
use crate::retry::RetryPolicy;

pub mod devices;
pub mod networks;
pub mod organizations;
pub mod wireless;

pub use devices::{Device, DeviceUpdate, SwitchPort, SwitchPortUpdate};
pub use networks::{ClaimDevices, Network, NetworkCreate, NetworkUpdate, RemoveDevice};
pub use organizations::{
    ManagementDetail, Organization, OrganizationApi, OrganizationCreate, OrganizationManagement,
    OrganizationUpdate, Saml, SamlUpdate, Snmp, SnmpUpdate,
};
pub use wireless::{Ssid, SsidUpdate};

/// A decoded Dashboard response together with its status.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    /// The decoded body.
    pub value: T,
    /// The HTTP status the Dashboard answered with.
    pub status: StatusCode,
}

impl<T> ApiResponse<T> {
    /// Pair a value with its status.
    pub fn new(value: T, status: StatusCode) -> Self {
        Self { value, status }
    }

    /// Transform the body, keeping the status.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            value: f(self.value),
            status: self.status,
        }
    }
}

/// Result of a single Dashboard call.
pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// Client for one Dashboard account.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl DashboardClient {
    /// Build a client from resolved settings.
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", settings.api_key))
            .map_err(|_| ApiError::InvalidHeader("API key contains invalid characters".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let user_agent = HeaderValue::from_str(&settings.user_agent)
            .map_err(|_| ApiError::InvalidHeader("User-Agent contains invalid characters".into()))?;
        headers.insert(USER_AGENT, user_agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            retry: settings.retry,
        })
    }

    /// The retry policy every resource applies around calls on this client.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// The base URL calls are made against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<reqwest::Url, ApiError> {
        let raw = format!("{}{}", self.base_url, path);
        reqwest::Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<(StatusCode, String), ApiError> {
        let url = self.url(path)?;
        debug!(method = %method, path, "Dashboard request");

        let mut request = self.http.request(method.clone(), url);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        trace!(method = %method, path, status = status.as_u16(), body = %text, "Dashboard response");

        if !status.is_success() {
            debug!(method = %method, path, status = status.as_u16(), "Dashboard call failed");
            return Err(ApiError::Status { status, body: text });
        }
        Ok((status, text))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> ApiResult<T> {
        let (status, text) = self.send(method, path, body).await?;
        Ok(ApiResponse::new(decode_body(&text)?, status))
    }

    /// `GET` a JSON document.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.call(Method::GET, path, None).await
    }

    /// `POST` a JSON body and decode the JSON answer.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.call(Method::POST, path, Some(serde_json::to_vec(body)?))
            .await
    }

    /// `POST` a JSON body to an endpoint that answers with no content.
    pub async fn post_empty<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<()> {
        let (status, _) = self
            .send(Method::POST, path, Some(serde_json::to_vec(body)?))
            .await?;
        Ok(ApiResponse::new((), status))
    }

    /// `PUT` a JSON body and decode the JSON answer.
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.call(Method::PUT, path, Some(serde_json::to_vec(body)?))
            .await
    }

    /// `DELETE` a resource.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        let (status, _) = self.send(Method::DELETE, path, None).await?;
        Ok(ApiResponse::new((), status))
    }
}

/// Characters escaped inside one path segment, `/` and `%` included.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode one path segment (identifiers such as serials and port ids).
pub(crate) fn segment(raw: &str) -> String {
    utf8_percent_encode(raw, SEGMENT).to_string()
}

fn decode_body<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    // Some endpoints answer 204 with no body; treat that as JSON null.
    if text.trim().is_empty() {
        serde_json::from_str("null")
    } else {
        serde_json::from_str(text)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::client_for;
    use super::*;
    use crate::retry::custom_http_request_retry;
    use httpmock::prelude::*;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_get_sends_bearer_and_decodes() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/organizations")
                    .header("authorization", "Bearer test-key")
                    .header("user-agent", "meraki-provider-tests");
                then.status(200).json_body(json!([{"id": "1", "name": "Acme"}]));
            })
            .await;

        let client = client_for(&server, 0);
        let resp: ApiResponse<Value> = client.get("/organizations").await.unwrap();

        mock.assert_async().await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.value[0]["name"], "Acme");
    }

    #[tokio::test]
    async fn test_error_body_is_kept() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/v1/networks/N1");
                then.status(400)
                    .json_body(json!({"errors": ["Name has already been taken"]}));
            })
            .await;

        let client = client_for(&server, 0);
        let err = client
            .put::<_, Value>("/networks/N1", &json!({"name": "HQ"}))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(
            err.dashboard_errors(),
            vec!["Name has already been taken".to_string()]
        );
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/networks/N1/devices/claim")
                    .header("content-type", "application/json")
                    .json_body(json!({"serials": ["Q2XX-AAAA-BBBB"]}));
                then.status(200).json_body(json!({"serials": ["Q2XX-AAAA-BBBB"]}));
            })
            .await;

        let client = client_for(&server, 0);
        let resp: ApiResponse<Value> = client
            .post(
                "/networks/N1/devices/claim",
                &json!({"serials": ["Q2XX-AAAA-BBBB"]}),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(resp.value["serials"][0], "Q2XX-AAAA-BBBB");
    }

    #[tokio::test]
    async fn test_delete_accepts_no_content() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/v1/networks/N1");
                then.status(204);
            })
            .await;

        let client = client_for(&server, 0);
        let resp = client.delete("/networks/N1").await.unwrap();
        assert_eq!(resp.status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/organizations/1");
                then.status(200).body("{not json");
            })
            .await;

        let client = client_for(&server, 0);
        let err = client.get::<Value>("/organizations/1").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_retry_against_server_always_429() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/organizations");
                then.status(429).json_body(json!({"errors": ["Rate limit exceeded"]}));
            })
            .await;

        let client = client_for(&server, 2);
        let policy = client.retry_policy();
        let outcome =
            custom_http_request_retry(&policy, || client.get::<Value>("/organizations")).await;

        assert_eq!(mock.hits_async().await, 3);
        assert_eq!(
            outcome.unwrap_err().status(),
            Some(StatusCode::TOO_MANY_REQUESTS)
        );
    }

    #[tokio::test]
    async fn test_retry_against_server_503_single_hit() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/organizations");
                then.status(503);
            })
            .await;

        let client = client_for(&server, 2);
        let policy = client.retry_policy();
        let outcome =
            custom_http_request_retry(&policy, || client.get::<Value>("/organizations")).await;

        assert_eq!(mock.hits_async().await, 1);
        assert_eq!(
            outcome.unwrap_err().status(),
            Some(StatusCode::SERVICE_UNAVAILABLE)
        );
    }

    #[test]
    fn test_invalid_user_agent_is_rejected() {
        let settings = ClientSettings {
            api_key: "test-key".to_string(),
            base_url: "http://127.0.0.1:9/api/v1".to_string(),
            retry: RetryPolicy::no_retry(),
            timeout: std::time::Duration::from_secs(5),
            user_agent: "bad\nagent".to_string(),
        };
        let err = DashboardClient::new(&settings).unwrap_err();
        assert!(matches!(err, ApiError::InvalidHeader(_)));
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("Q2XX-AAAA-BBBB"), "Q2XX-AAAA-BBBB");
        assert_eq!(segment("1_2"), "1_2");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
        assert_eq!(segment("N é/1"), "N%20%C3%A9%2F1");
        assert_eq!(segment("100%"), "100%25");
    }
}
